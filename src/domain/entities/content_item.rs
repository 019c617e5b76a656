//! Content item entity - One unit of generated prose plus its review status

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Review status of a content item
///
/// An item that has never been generated is absent from the store, which
/// reads as `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Pending,
    Generated,
    Approved,
}

/// Prose for a single subtopic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub content: String,
    pub status: ContentStatus,
}

impl ContentItem {
    /// Fresh output from the language model, awaiting review
    pub fn generated(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            status: ContentStatus::Generated,
        }
    }

    /// Text the author wrote or edited by hand; saving it approves it
    pub fn edited(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            status: ContentStatus::Approved,
        }
    }

    pub fn approve(&mut self) {
        self.status = ContentStatus::Approved;
    }

    pub fn is_approved(&self) -> bool {
        self.status == ContentStatus::Approved
    }
}

/// Content items keyed by subtopic name.
///
/// Writes are keyed: storing an item for one key never touches another, so
/// generation results may land in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentStore {
    items: BTreeMap<String, ContentItem>,
}

impl ContentStore {
    pub fn get(&self, key: &str) -> Option<&ContentItem> {
        self.items.get(key)
    }

    /// Status of a key, treating absence as `Pending`
    pub fn status_of(&self, key: &str) -> ContentStatus {
        self.items
            .get(key)
            .map(|item| item.status)
            .unwrap_or_default()
    }

    /// Content text for a key, or an empty string if nothing was generated yet
    pub fn content_of(&self, key: &str) -> &str {
        self.items.get(key).map(|item| item.content.as_str()).unwrap_or("")
    }

    /// Store an item, replacing whatever was there for the same key
    pub fn put(&mut self, key: impl Into<String>, item: ContentItem) -> Option<ContentItem> {
        self.items.insert(key.into(), item)
    }

    /// Approve an existing item. Returns false if the key has no content yet.
    pub fn approve(&mut self, key: &str) -> bool {
        match self.items.get_mut(key) {
            Some(item) => {
                item.approve();
                true
            }
            None => false,
        }
    }

    /// Approval gate: true iff every required key maps to an approved item
    pub fn approve_all(&self, required_keys: &[String]) -> bool {
        required_keys
            .iter()
            .all(|key| self.items.get(key).is_some_and(ContentItem::is_approved))
    }

    /// Required keys that are missing or not yet approved, in input order
    pub fn pending(&self, required_keys: &[String]) -> Vec<String> {
        required_keys
            .iter()
            .filter(|key| self.status_of(key) != ContentStatus::Approved)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_absent_key_reads_as_pending() {
        let store = ContentStore::default();
        assert_eq!(store.status_of("Osmosis"), ContentStatus::Pending);
        assert_eq!(store.content_of("Osmosis"), "");
    }

    #[test]
    fn test_approve_all_requires_every_key_approved() {
        let mut store = ContentStore::default();
        store.put("A", ContentItem::edited("alpha"));
        store.put("B", ContentItem::generated("beta"));

        assert!(store.approve_all(&keys(&["A"])));
        assert!(!store.approve_all(&keys(&["A", "B"])));
        assert!(!store.approve_all(&keys(&["A", "C"])));

        assert!(store.approve("B"));
        assert!(store.approve_all(&keys(&["A", "B"])));
    }

    #[test]
    fn test_approve_all_with_no_required_keys_is_true() {
        assert!(ContentStore::default().approve_all(&[]));
    }

    #[test]
    fn test_approve_missing_key_is_rejected() {
        let mut store = ContentStore::default();
        assert!(!store.approve("Ghost"));
        assert!(store.get("Ghost").is_none());
        assert_eq!(store, ContentStore::default());
    }

    #[test]
    fn test_pending_lists_blocking_keys() {
        let mut store = ContentStore::default();
        store.put("A", ContentItem::edited("alpha"));
        store.put("B", ContentItem::generated("beta"));

        assert_eq!(store.pending(&keys(&["A", "B", "C"])), keys(&["B", "C"]));
    }

    #[test]
    fn test_keyed_writes_do_not_interfere() {
        let mut store = ContentStore::default();
        store.put("Second", ContentItem::generated("second draft"));
        store.put("First", ContentItem::generated("first draft"));
        store.put("Second", ContentItem::generated("second redraft"));

        assert_eq!(store.content_of("First"), "first draft");
        assert_eq!(store.content_of("Second"), "second redraft");

        let mut expected = ContentStore::default();
        expected.put("First", ContentItem::generated("first draft"));
        expected.put("Second", ContentItem::generated("second redraft"));
        assert_eq!(store, expected);
    }
}
