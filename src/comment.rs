//! Comment records as yt-dlp reports them.
//!
//! yt-dlp returns a flat list; hierarchy lives only in the `parent` field, where
//! the literal `"root"` marks a top-level comment.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Parent value that marks a top-level comment.
pub const ROOT_PARENT: &str = "root";

/// Shown in place of a missing author.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A single comment or reply, immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    /// Opaque identifier, expected unique within one video
    #[serde(default, deserialize_with = "string_or_default")]
    pub id: String,

    /// Identifier of the parent comment, or [`ROOT_PARENT`]
    #[serde(
        rename = "parent",
        default = "default_parent",
        deserialize_with = "parent_or_root"
    )]
    pub parent_id: String,

    /// Display name of the commenter
    #[serde(default)]
    pub author: Option<String>,

    /// Comment body
    #[serde(default, deserialize_with = "string_or_default")]
    pub text: String,

    /// Like count; absent or non-numeric values read as 0
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
}

impl CommentRecord {
    /// Creates a record with every field given.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        like_count: u64,
    ) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.into(),
            author: Some(author.into()),
            text: text.into(),
            like_count,
        }
    }

    /// Returns true if the record has no parent comment.
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent_id == ROOT_PARENT
    }

    /// Author name, or [`UNKNOWN_AUTHOR`] when missing.
    #[must_use]
    pub fn author_or_placeholder(&self) -> &str {
        self.author.as_deref().unwrap_or(UNKNOWN_AUTHOR)
    }
}

fn default_parent() -> String {
    ROOT_PARENT.to_string()
}

fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn parent_or_root<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_parent))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(count_from_value(&value))
}

/// Interprets a loosely typed JSON count, falling back to 0.
pub(crate) fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_record() {
        let record: CommentRecord = serde_json::from_value(json!({
            "id": "Ugx1",
            "parent": "root",
            "author": "@alice",
            "text": "Great video",
            "like_count": 12,
            "timestamp": 1_700_000_000
        }))
        .unwrap();

        assert_eq!(record.id, "Ugx1");
        assert!(record.is_top_level());
        assert_eq!(record.author_or_placeholder(), "@alice");
        assert_eq!(record.like_count, 12);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let record: CommentRecord = serde_json::from_value(json!({ "id": "x" })).unwrap();

        assert_eq!(record.parent_id, ROOT_PARENT);
        assert_eq!(record.author, None);
        assert_eq!(record.author_or_placeholder(), UNKNOWN_AUTHOR);
        assert_eq!(record.text, "");
        assert_eq!(record.like_count, 0);
    }

    #[test]
    fn test_null_fields_use_defaults() {
        let record: CommentRecord = serde_json::from_value(json!({
            "id": null,
            "parent": null,
            "author": null,
            "text": null,
            "like_count": null
        }))
        .unwrap();

        assert_eq!(record.id, "");
        assert!(record.is_top_level());
        assert_eq!(record.text, "");
        assert_eq!(record.like_count, 0);
    }

    #[test]
    fn test_like_count_leniency() {
        let cases = vec![
            (json!(7), 7),
            (json!(7.9), 7),
            (json!("42"), 42),
            (json!("lots"), 0),
            (json!(-3), 0),
            (json!([1]), 0),
        ];

        for (raw, expected) in cases {
            let record: CommentRecord =
                serde_json::from_value(json!({ "id": "a", "like_count": raw })).unwrap();
            assert_eq!(record.like_count, expected);
        }
    }

    #[test]
    fn test_reply_is_not_top_level() {
        let record = CommentRecord::new("b", "a", "Bob", "Hey", 1);
        assert!(!record.is_top_level());
    }
}
