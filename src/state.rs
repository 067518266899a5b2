//! Shared application state handed to every handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::render::{PublicMediaResolver, Renderer};
use crate::store::{ContentStore, DocumentStore, MemoryContentStore};

#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentStore,
    pub renderer: Arc<Renderer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn ContentStore>, config: AppConfig) -> Self {
        let media = PublicMediaResolver::new(config.media_base_url.clone());
        Self {
            documents: DocumentStore::new(store),
            renderer: Arc::new(Renderer::new(Arc::new(media))),
            config: Arc::new(config),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: AppConfig) -> Self {
        Self::new(Arc::new(MemoryContentStore::new()), config)
    }
}
