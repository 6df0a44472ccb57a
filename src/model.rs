use serde::{Deserialize, Serialize};

// ============================================================================
// Article Identity
// ============================================================================

/// Composite identifier for an article: the owning feed's URL and the item's
/// unique id, joined by a single space.
///
/// Every layer (ingestion, manager, storage) must derive ids through this
/// type so that "exactly one status row per article" holds across the whole
/// system. A divergent derivation anywhere would silently fork an article's
/// status into two rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    /// Separator between feed URL and item unique id. Feed URLs cannot
    /// contain an unescaped space, so the composite is unambiguous.
    const SEPARATOR: char = ' ';

    /// Derive the composite id from its two parts.
    pub fn from_parts(feed_url: &str, unique_id: &str) -> Self {
        Self(format!("{feed_url}{}{unique_id}", Self::SEPARATOR))
    }

    /// Wrap an already-derived id, e.g. one read back from storage.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Status Flags
// ============================================================================

/// The three user-visible boolean flags carried by an article status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFlag {
    Read,
    Starred,
    UserDeleted,
}

impl StatusFlag {
    /// Column name in the statuses table.
    ///
    /// Interpolated into SQL directly; safe because the value set is closed.
    pub(crate) fn column(self) -> &'static str {
        match self {
            StatusFlag::Read => "read",
            StatusFlag::Starred => "starred",
            StatusFlag::UserDeleted => "user_deleted",
        }
    }
}

// ============================================================================
// Article Status
// ============================================================================

/// Persisted status for one article: three boolean flags plus the arrival
/// timestamp.
///
/// A record is created exactly once, at first sight of its id, and mutated
/// only through flag updates. It is never deleted: `user_deleted` marks
/// logical deletion while the row persists for audit and sync purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleStatus {
    pub article_id: ArticleId,
    pub read: bool,
    pub starred: bool,
    pub user_deleted: bool,
    /// Unix timestamp of first sight. Set at creation, immutable thereafter.
    pub date_arrived: i64,
}

impl ArticleStatus {
    /// A freshly synthesized record for an article never seen before.
    pub fn new_default(article_id: ArticleId, date_arrived: i64) -> Self {
        Self {
            article_id,
            read: false,
            starred: false,
            user_deleted: false,
            date_arrived,
        }
    }

    /// Read a flag by key.
    pub fn flag(&self, flag: StatusFlag) -> bool {
        match flag {
            StatusFlag::Read => self.read,
            StatusFlag::Starred => self.starred,
            StatusFlag::UserDeleted => self.user_deleted,
        }
    }

    /// Set a flag by key. Crate-private: callers mutate flags through
    /// `StatusManager::mark_statuses` so cache and store stay in lockstep.
    pub(crate) fn set_flag(&mut self, flag: StatusFlag, value: bool) {
        match flag {
            StatusFlag::Read => self.read = value,
            StatusFlag::Starred => self.starred = value,
            StatusFlag::UserDeleted => self.user_deleted = value,
        }
    }
}

// ============================================================================
// Ingestion Descriptor
// ============================================================================

/// Minimal descriptor of a parsed feed item as handed over by ingestion.
///
/// Only the identity parts matter here; the full parsed entry stays with the
/// caller.
#[derive(Debug, Clone)]
pub struct ParsedItem {
    pub feed_url: String,
    pub unique_id: String,
}

impl ParsedItem {
    /// Composite id for this item. Must match the id scheme used by the
    /// owning article entity.
    pub fn article_id(&self) -> ArticleId {
        ArticleId::from_parts(&self.feed_url, &self.unique_id)
    }
}

// ============================================================================
// Caller-Side Association
// ============================================================================

/// Association between an article-like entity and its status record.
///
/// Callers resolve statuses via `StatusManager::attach_cached_statuses` or
/// `ensure_statuses` before attempting flag mutation; an entity whose
/// `status()` is still `None` at mark time is a bug upstream, handled per
/// the precondition policy in `StatusManager::mark_articles`.
pub trait HasStatus {
    fn article_id(&self) -> &ArticleId;
    fn status(&self) -> Option<&ArticleStatus>;
    fn set_status(&mut self, status: ArticleStatus);
}
