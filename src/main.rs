//! physio-cms - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    if let Err(e) = physio_cms::run().await {
        eprintln!("physio-cms: {}", e);
        std::process::exit(1);
    }
}
