use std::collections::HashMap;

use crate::model::{ArticleId, ArticleStatus};

// ============================================================================
// Status Cache
// ============================================================================

/// In-memory map of article statuses, authoritative for already-loaded ids.
///
/// Purely a memory structure: no I/O, not durable. Holds a possibly-partial
/// coherent view of the store and insulates callers from redundant store
/// reads. Only `StatusManager` mutates it, so entries never race; other
/// contexts read through the manager.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: HashMap<ArticleId, ArticleStatus>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) lookup of a cached status.
    pub fn lookup(&self, article_id: &ArticleId) -> Option<&ArticleStatus> {
        self.entries.get(article_id)
    }

    pub(crate) fn lookup_mut(&mut self, article_id: &ArticleId) -> Option<&mut ArticleStatus> {
        self.entries.get_mut(article_id)
    }

    pub fn contains(&self, article_id: &ArticleId) -> bool {
        self.entries.contains_key(article_id)
    }

    /// Unconditionally add or overwrite the entry for the status's id.
    pub fn insert(&mut self, status: ArticleStatus) {
        self.entries.insert(status.article_id.clone(), status);
    }

    /// Add each status whose id is not yet cached; already-cached ids are
    /// left untouched. A cached entry may be newer than a record loaded
    /// earlier from the store, so a later load must never clobber it.
    pub fn insert_missing(&mut self, statuses: impl IntoIterator<Item = ArticleStatus>) {
        for status in statuses {
            self.entries
                .entry(status.article_id.clone())
                .or_insert(status);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
