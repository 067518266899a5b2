//! Escaping and sanitizing helpers for generated markup.

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Rich text coming from the editor is cleaned, never trusted.
pub fn sanitize_rich_text(html: &str) -> String {
    ammonia::clean(html)
}

/// Escaped href for a stored link; anything that is not a relative path,
/// fragment, http(s), mailto or tel link becomes `#`.
pub fn safe_href(href: &str) -> String {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    let allowed = (href.starts_with('/') && !href.starts_with("//"))
        || href.starts_with('#')
        || lower.starts_with("https://")
        || lower.starts_with("http://")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:");
    if allowed {
        escape_html(href)
    } else {
        "#".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("<h1>"), "&lt;h1&gt;");
        assert_eq!(escape_html("\"x\" 'y'"), "&quot;x&quot; &#39;y&#39;");
    }

    #[test]
    fn test_safe_href_blocks_script_urls() {
        assert_eq!(safe_href("javascript:alert(1)"), "#");
        assert_eq!(safe_href("//evil.example"), "#");
        assert_eq!(safe_href("/kontakt"), "/kontakt");
        assert_eq!(safe_href("tel:+4930123"), "tel:+4930123");
        assert_eq!(safe_href("https://a.de/?x=1&y=2"), "https://a.de/?x=1&amp;y=2");
    }

    #[test]
    fn test_rich_text_strips_scripts() {
        let cleaned = sanitize_rich_text("<p>Hallo</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>Hallo</p>");
    }
}
