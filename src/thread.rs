//! Rebuilds reply hierarchy from a flat, parent-linked comment list.

use crate::comment::{CommentRecord, ROOT_PARENT};
use std::collections::HashMap;

/// Parent-identifier to ordered children multi-map.
///
/// Sibling order is input order. Built once per invocation and read-only
/// afterwards; it borrows the records it was built from.
#[derive(Debug, Default, Clone)]
pub struct Forest<'a> {
    children: HashMap<&'a str, Vec<&'a CommentRecord>>,
    record_count: usize,
}

impl<'a> Forest<'a> {
    /// Direct children of `parent_id`, empty if it has none or was never seen.
    #[must_use]
    pub fn children(&self, parent_id: &str) -> &[&'a CommentRecord] {
        self.children.get(parent_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Top-level comments in input order.
    #[must_use]
    pub fn top_level(&self) -> &[&'a CommentRecord] {
        self.children(ROOT_PARENT)
    }

    /// Returns true if no records were supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    /// Number of records the forest was built from.
    #[must_use]
    pub const fn record_count(&self) -> usize {
        self.record_count
    }

    /// Number of top-level comments.
    #[must_use]
    pub fn top_level_count(&self) -> usize {
        self.top_level().len()
    }

    /// Number of records that are not top-level, dangling ones included.
    #[must_use]
    pub fn reply_count(&self) -> usize {
        self.record_count - self.top_level_count()
    }
}

/// Builds a [`Forest`] in a single pass.
pub struct ThreadBuilder;

impl ThreadBuilder {
    /// Groups records under their parent identifier.
    ///
    /// Parents may appear after their children. Dangling parents and duplicate ids
    /// are accepted as-is: a child of an unknown parent is simply never reached.
    #[must_use]
    pub fn build(records: &[CommentRecord]) -> Forest<'_> {
        let mut children: HashMap<&str, Vec<&CommentRecord>> = HashMap::new();

        for record in records {
            children
                .entry(record.parent_id.as_str())
                .or_default()
                .push(record);
        }

        Forest {
            children,
            record_count: records.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, parent: &str) -> CommentRecord {
        CommentRecord::new(id, parent, id.to_uppercase(), format!("text {id}"), 0)
    }

    fn ids(records: &[&CommentRecord]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_empty_input() {
        let forest = ThreadBuilder::build(&[]);
        assert!(forest.is_empty());
        assert!(forest.top_level().is_empty());
        assert_eq!(forest.reply_count(), 0);
    }

    #[test]
    fn test_groups_by_parent_preserving_order() {
        let records = vec![
            rec("a", "root"),
            rec("a1", "a"),
            rec("b", "root"),
            rec("a2", "a"),
            rec("b1", "b"),
        ];
        let forest = ThreadBuilder::build(&records);

        assert_eq!(ids(forest.top_level()), vec!["a", "b"]);
        assert_eq!(ids(forest.children("a")), vec!["a1", "a2"]);
        assert_eq!(ids(forest.children("b")), vec!["b1"]);
        assert!(forest.children("a1").is_empty());
        assert_eq!(forest.top_level_count(), 2);
        assert_eq!(forest.reply_count(), 3);
    }

    #[test]
    fn test_children_before_parents() {
        let records = vec![rec("c", "b"), rec("b", "a"), rec("a", "root")];
        let forest = ThreadBuilder::build(&records);

        assert_eq!(ids(forest.top_level()), vec!["a"]);
        assert_eq!(ids(forest.children("a")), vec!["b"]);
        assert_eq!(ids(forest.children("b")), vec!["c"]);
    }

    #[test]
    fn test_dangling_parent_is_kept_but_unreachable() {
        let records = vec![rec("a", "root"), rec("orphan", "missing")];
        let forest = ThreadBuilder::build(&records);

        assert_eq!(ids(forest.children("missing")), vec!["orphan"]);
        assert_eq!(forest.top_level_count(), 1);
        assert_eq!(forest.reply_count(), 1);
    }

    #[test]
    fn test_duplicate_ids_are_accepted() {
        let records = vec![rec("a", "root"), rec("a", "root"), rec("x", "a")];
        let forest = ThreadBuilder::build(&records);

        assert_eq!(forest.top_level_count(), 2);
        assert_eq!(ids(forest.children("a")), vec!["x"]);
    }
}
