//! Resolution of stored media references to public URLs.

/// Maps a stored object reference to a publicly fetchable URL.
pub trait MediaResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Option<String>;
}

/// Resolves upload keys against the public media base URL. Absolute
/// http(s) URLs pass through unchanged.
#[derive(Debug, Clone)]
pub struct PublicMediaResolver {
    base_url: String,
}

impl PublicMediaResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

fn is_url_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&*+,=%".contains(c)
}

impl MediaResolver for PublicMediaResolver {
    fn resolve(&self, reference: &str) -> Option<String> {
        let reference = reference.trim();
        if reference.is_empty() || !reference.chars().all(is_url_safe) {
            return None;
        }

        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("https://") || lower.starts_with("http://") {
            return Some(reference.to_string());
        }

        if reference.contains("..") || reference.contains(':') {
            return None;
        }

        let key = reference
            .trim_start_matches('/')
            .trim_start_matches("uploads/");
        if key.is_empty() {
            return None;
        }
        Some(format!("{}/uploads/{}", self.base_url, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_keys_resolve_against_base() {
        let media = PublicMediaResolver::new("https://cdn.example.de/");
        assert_eq!(
            media.resolve("team.webp").as_deref(),
            Some("https://cdn.example.de/uploads/team.webp")
        );
        assert_eq!(
            media.resolve("/uploads/team.webp").as_deref(),
            Some("https://cdn.example.de/uploads/team.webp")
        );
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        let media = PublicMediaResolver::new("");
        assert_eq!(
            media.resolve("https://images.example.com/a.jpg").as_deref(),
            Some("https://images.example.com/a.jpg")
        );
    }

    #[test]
    fn test_unsafe_references_are_rejected() {
        let media = PublicMediaResolver::new("");
        assert!(media.resolve("../etc/passwd").is_none());
        assert!(media.resolve("javascript:alert(1)").is_none());
        assert!(media.resolve("a.jpg') ; x").is_none());
        assert!(media.resolve("").is_none());
    }
}
