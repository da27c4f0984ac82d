//! Unified Result Model
//!
//! Every command (search, context, docs, status) maps its output to this
//! model before rendering, so downstream tools can parse one shape.

use serde::{Deserialize, Serialize};

/// The kind of result item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// A loaded knowledge document (listing entry)
    Doc,
    /// A ranked search hit
    Hit,
    /// A rendered context block
    Context,
    /// A health-check line
    Status,
    Error,
}

/// Metadata for a result item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Modification time in milliseconds since epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime_ms: Option<i64>,

    /// Content size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Content fingerprint (XXH3)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,

    /// Whether the excerpt was truncated
    #[serde(default)]
    pub truncated: bool,
}

/// Error information attached to a result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbError {
    pub code: String,
    pub message: String,
}

impl KbError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The unified result item that all commands produce
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultItem {
    /// The kind of this result
    pub kind: Kind,

    /// Source label: the document's path relative to the knowledge root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    /// Relevance score (present on search hits)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,

    /// Excerpt or full content (may be truncated, see meta)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,

    /// Source labels backing a context block, in rank order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,

    /// Structured payload for status-style commands
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,

    /// Metadata
    pub meta: Meta,

    /// Errors (if any)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<KbError>,
}

impl ResultItem {
    /// Create a new document listing result
    pub fn doc(citation: impl Into<String>) -> Self {
        Self {
            kind: Kind::Doc,
            citation: Some(citation.into()),
            score: None,
            excerpt: None,
            sources: Vec::new(),
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new search hit result
    pub fn hit(citation: impl Into<String>, score: u32, excerpt: impl Into<String>) -> Self {
        Self {
            kind: Kind::Hit,
            citation: Some(citation.into()),
            score: Some(score),
            excerpt: Some(excerpt.into()),
            sources: Vec::new(),
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new rendered context result
    pub fn context(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            kind: Kind::Context,
            citation: None,
            score: None,
            excerpt: Some(content.into()),
            sources,
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new status line result
    pub fn status(excerpt: impl Into<String>) -> Self {
        Self {
            kind: Kind::Status,
            citation: None,
            score: None,
            excerpt: Some(excerpt.into()),
            sources: Vec::new(),
            data: None,
            meta: Meta::default(),
            errors: Vec::new(),
        }
    }

    /// Create a new error result
    pub fn error(error: KbError) -> Self {
        Self {
            kind: Kind::Error,
            citation: None,
            score: None,
            excerpt: None,
            sources: Vec::new(),
            data: None,
            meta: Meta::default(),
            errors: vec![error],
        }
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Set structured data payload
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Result set containing multiple result items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultSet {
    pub items: Vec<ResultItem>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, item: ResultItem) {
        self.items.push(item);
    }

    /// Sort items by citation for stable listings.
    ///
    /// Search hits must not pass through this: rank order is significant.
    pub fn sort_by_citation(&mut self) {
        self.items.sort_by(|a, b| a.citation.cmp(&b.citation));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultItem;
    type IntoIter = std::vec::IntoIter<ResultItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl FromIterator<ResultItem> for ResultSet {
    fn from_iter<T: IntoIterator<Item = ResultItem>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_item_doc() {
        let item = ResultItem::doc("users.md");
        assert_eq!(item.kind, Kind::Doc);
        assert_eq!(item.citation, Some("users.md".to_string()));
        assert!(item.score.is_none());
    }

    #[test]
    fn test_result_item_hit() {
        let item = ResultItem::hit("security.md", 180, "Enable MFA for all admins");
        assert_eq!(item.kind, Kind::Hit);
        assert_eq!(item.score, Some(180));
        assert_eq!(item.excerpt.as_deref(), Some("Enable MFA for all admins"));
    }

    #[test]
    fn test_result_item_context_carries_sources() {
        let item = ResultItem::context(
            "<context source=\"users.md\">...</context>",
            vec!["users.md".to_string()],
        );
        assert_eq!(item.kind, Kind::Context);
        assert_eq!(item.sources, vec!["users.md".to_string()]);
    }

    #[test]
    fn test_result_item_error() {
        let item = ResultItem::error(KbError::new("MISSING_DIR", "knowledge dir not found"));
        assert_eq!(item.kind, Kind::Error);
        assert_eq!(item.errors.len(), 1);
        assert_eq!(item.errors[0].code, "MISSING_DIR");
    }

    #[test]
    fn test_result_item_with_meta() {
        let meta = Meta {
            mtime_ms: Some(12345),
            size: Some(1024),
            hash: Some("abc123".to_string()),
            truncated: true,
        };
        let item = ResultItem::doc("guide.md").with_meta(meta);
        assert_eq!(item.meta.size, Some(1024));
        assert!(item.meta.truncated);
    }

    #[test]
    fn test_result_set_sort_by_citation() {
        let mut set = ResultSet::new();
        set.push(ResultItem::doc("sharepoint.md"));
        set.push(ResultItem::doc("exchange.md"));
        set.sort_by_citation();
        assert_eq!(set.items[0].citation, Some("exchange.md".to_string()));
        assert_eq!(set.items[1].citation, Some("sharepoint.md".to_string()));
    }

    #[test]
    fn test_kind_serialization() {
        let item = ResultItem::hit("users.md", 100, "x");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"kind\":\"hit\""));
        assert!(json.contains("\"score\":100"));
    }

    #[test]
    fn test_empty_fields_are_omitted() {
        let item = ResultItem::doc("users.md");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("\"score\""));
        assert!(!json.contains("\"sources\""));
        assert!(!json.contains("\"errors\""));
    }

    #[test]
    fn test_result_item_deserialization() {
        let json = r#"{"kind":"hit","citation":"users.md","score":115,"excerpt":"Create a user","meta":{"truncated":false}}"#;
        let item: ResultItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, Kind::Hit);
        assert_eq!(item.score, Some(115));
    }

    #[test]
    fn test_result_set_from_iter() {
        let set: ResultSet = vec![ResultItem::doc("a.md"), ResultItem::doc("b.md")]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
    }

    #[test]
    fn test_with_data_payload() {
        let data = serde_json::json!({ "documents": 4, "estimated_tokens": 321 });
        let item = ResultItem::status("knowledge base loaded").with_data(data.clone());
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"documents\":4"));
        assert_eq!(item.data.unwrap(), data);
    }
}
