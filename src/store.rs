use anyhow::Result;
use async_trait::async_trait;

use crate::model::{ArticleId, ArticleStatus, StatusFlag};

// ============================================================================
// Store Seam
// ============================================================================

/// Durable backing store for article statuses.
///
/// Every operation is batched: one round trip covers the whole id/record
/// list, never one trip per id. Implementations own durability, retry and
/// locking behavior; this layer does not retry and treats each batch as
/// atomic. A store that can apply a batch partially is in breach of this
/// contract, not something callers compensate for.
///
/// The crate ships a SQLite implementation ([`crate::storage::Database`]);
/// the trait exists so tests and alternative backends can slot in.
#[async_trait]
pub trait StatusStore: Send + Sync + 'static {
    /// Bulk point-lookup: return the statuses that exist for `ids`. Ids with
    /// no row are simply absent from the result.
    async fn fetch_statuses(&self, ids: &[ArticleId]) -> Result<Vec<ArticleStatus>>;

    /// Insert rows for statuses that do not exist yet, with conflict-ignore
    /// semantics: an existing row for the same id wins and is left unchanged.
    async fn create_statuses(&self, statuses: &[ArticleStatus]) -> Result<()>;

    /// Set one flag to `value` for every id in `ids`, as a single logical
    /// transaction, with no partial application observable from outside.
    async fn update_statuses(&self, flag: StatusFlag, value: bool, ids: &[ArticleId])
        -> Result<()>;
}
