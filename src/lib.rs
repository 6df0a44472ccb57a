//! Write-through article status cache with batched SQLite persistence, for
//! feed readers.
//!
//! The crate tracks three boolean flags per article (`read`, `starred`,
//! `user_deleted`) plus an immutable arrival timestamp, keyed by a composite
//! id derived from the feed URL and the item's unique id. A
//! [`StatusManager`] fronts the durable [`StatusStore`] with an in-memory
//! [`StatusCache`]: ingestion hands it candidate ids and gets every one
//! resolved (fetched in one batch, or created as defaults in one
//! insert-or-ignore batch), while UI flag toggles mutate the cache
//! synchronously and queue a single batched update per call. Store writes
//! are applied by a background task in submission order.
//!
//! # Example
//!
//! ```no_run
//! use readmark::{Database, ParsedItem, StatusFlag, StatusManager};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let db = Database::open("statuses.db").await?;
//! let mut manager = StatusManager::new(db);
//!
//! // Ingestion: make sure every parsed item has a status record.
//! let items = vec![ParsedItem {
//!     feed_url: "https://blog.example/feed.xml".into(),
//!     unique_id: "post-1".into(),
//! }];
//! manager.ensure_statuses_for_items(&items).await?;
//!
//! // UI: mark as read. Cache updates now, the store write is queued.
//! let status = manager.status(&items[0].article_id()).cloned().unwrap();
//! manager.mark_statuses(&[status], StatusFlag::Read, true);
//!
//! manager.flush().await?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod manager;
mod model;
mod store;
pub mod storage;

pub use cache::StatusCache;
pub use manager::StatusManager;
pub use model::{ArticleId, ArticleStatus, HasStatus, ParsedItem, StatusFlag};
pub use storage::{Database, DatabaseError};
pub use store::StatusStore;
