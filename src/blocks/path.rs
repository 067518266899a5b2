//! Dot-paths into block props (`headline`, `items.2.title`).

use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A parsed, non-empty dot-path. Purely numeric segments address list items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropPath {
    raw: String,
    segments: Vec<PathSegment>,
}

/// Wildcard used in editable element patterns to match any list index.
pub const INDEX_WILDCARD: &str = "*";

impl PropPath {
    /// Parse a dot-path. Returns `None` for empty paths or empty segments.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() || part == INDEX_WILDCARD {
                return None;
            }
            let segment = if part.bytes().all(|b| b.is_ascii_digit()) {
                PathSegment::Index(part.parse().ok()?)
            } else {
                PathSegment::Key(part.to_string())
            };
            segments.push(segment);
        }
        Some(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True if this concrete path matches an editable element pattern such as
    /// `items.*.title`. `*` only matches list indices.
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        let parts: Vec<&str> = pattern.split('.').collect();
        if parts.len() != self.segments.len() {
            return false;
        }
        parts
            .iter()
            .zip(&self.segments)
            .all(|(part, segment)| match segment {
                PathSegment::Index(_) => *part == INDEX_WILDCARD,
                PathSegment::Key(key) => part == key,
            })
    }

    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match segment {
                PathSegment::Key(key) => current.as_object()?.get(key),
                PathSegment::Index(i) => current.as_array()?.get(*i),
            })
    }

    /// Replace the value at this path. Intermediate containers and list
    /// items must already exist; the final key of an object may be new.
    pub fn set(&self, target: &mut Value, new_value: Value) -> Result<(), PathError> {
        let (last, parents) = self
            .segments
            .split_last()
            .ok_or(PathError::Unresolved)?;

        let mut current = target;
        for segment in parents {
            current = match segment {
                PathSegment::Key(key) => current
                    .as_object_mut()
                    .and_then(|obj| obj.get_mut(key))
                    .ok_or(PathError::Unresolved)?,
                PathSegment::Index(i) => current
                    .as_array_mut()
                    .and_then(|arr| arr.get_mut(*i))
                    .ok_or(PathError::IndexOutOfRange(*i))?,
            };
        }

        match last {
            PathSegment::Key(key) => {
                let obj = current.as_object_mut().ok_or(PathError::Unresolved)?;
                obj.insert(key.clone(), new_value);
            }
            PathSegment::Index(i) => {
                let slot = current
                    .as_array_mut()
                    .and_then(|arr| arr.get_mut(*i))
                    .ok_or(PathError::IndexOutOfRange(*i))?;
                *slot = new_value;
            }
        }
        Ok(())
    }
}

impl fmt::Display for PropPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    Unresolved,
    IndexOutOfRange(usize),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rejects_empty_segments() {
        assert!(PropPath::parse("").is_none());
        assert!(PropPath::parse("items..title").is_none());
        assert!(PropPath::parse("items.*.title").is_none());
    }

    #[test]
    fn test_numeric_segments_become_indices() {
        let path = PropPath::parse("items.2.title").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Key("items".into()),
                PathSegment::Index(2),
                PathSegment::Key("title".into()),
            ]
        );
    }

    #[test]
    fn test_wildcard_matches_only_indices() {
        let path = PropPath::parse("items.0.title").unwrap();
        assert!(path.matches_pattern("items.*.title"));
        assert!(!path.matches_pattern("items.*"));
        let keyed = PropPath::parse("items.first.title").unwrap();
        assert!(!keyed.matches_pattern("items.*.title"));
    }

    #[test]
    fn test_set_preserves_siblings() {
        let mut value = json!({"content": "a", "alignment": "left"});
        PropPath::parse("content")
            .unwrap()
            .set(&mut value, json!("b"))
            .unwrap();
        assert_eq!(value, json!({"content": "b", "alignment": "left"}));
    }

    #[test]
    fn test_set_out_of_range_index_fails() {
        let mut value = json!({"items": [{"title": "a"}]});
        let err = PropPath::parse("items.3.title")
            .unwrap()
            .set(&mut value, json!("x"))
            .unwrap_err();
        assert_eq!(err, PathError::IndexOutOfRange(3));
    }

    #[test]
    fn test_get_nested() {
        let value = json!({"items": [{"title": "a"}, {"title": "b"}]});
        let path = PropPath::parse("items.1.title").unwrap();
        assert_eq!(path.get(&value), Some(&json!("b")));
    }
}
