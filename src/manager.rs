use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::cache::StatusCache;
use crate::model::{ArticleId, ArticleStatus, HasStatus, ParsedItem, StatusFlag};
use crate::store::StatusStore;

// ============================================================================
// Writer Queue
// ============================================================================

/// A store write queued by the manager. Executed strictly in submission
/// order by the writer task.
enum StoreWrite {
    Create(Vec<ArticleStatus>),
    Update {
        flag: StatusFlag,
        value: bool,
        ids: Vec<ArticleId>,
    },
    /// Ack once every previously queued write has been executed.
    Flush(oneshot::Sender<()>),
}

// ============================================================================
// Status Manager
// ============================================================================

/// Coordinates the in-memory [`StatusCache`] and a [`StatusStore`]: resolves
/// missing statuses in bulk, creates defaults for never-seen articles, and
/// applies flag mutations with no-op filtering and batched writes.
///
/// The manager owns the cache exclusively; all mutation goes through
/// `&mut self`, so cache reads and writes never race. Store writes from both
/// the create path and the mark path funnel through one channel into a
/// dedicated writer task, which applies them in submission order. Flag
/// mutations are visible in the cache before the corresponding store write
/// lands; [`flush`](Self::flush) waits for the queue to drain.
///
/// Concurrent creators in other processes are reconciled purely by the
/// store's insert-or-ignore semantics: the manager re-checks the cache once
/// after its bulk fetch and then creates defaults, relying on the store's
/// unique key to serialize racing creates for the same id. The cache already
/// holds the winning value either way.
pub struct StatusManager<S: StatusStore> {
    cache: StatusCache,
    store: Arc<S>,
    writer: mpsc::UnboundedSender<StoreWrite>,
    writer_task: JoinHandle<()>,
}

impl<S: StatusStore> StatusManager<S> {
    /// Create a manager over `store` and spawn its writer task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(store: S) -> Self {
        let store = Arc::new(store);
        let (writer, rx) = mpsc::unbounded_channel();
        let writer_task = tokio::spawn(Self::run_writer(Arc::clone(&store), rx));
        Self {
            cache: StatusCache::new(),
            store,
            writer,
            writer_task,
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Cached status for an article, if loaded. Reads from other contexts
    /// are routed through the manager rather than a shared cache handle.
    pub fn status(&self, article_id: &ArticleId) -> Option<&ArticleStatus> {
        self.cache.lookup(article_id)
    }

    // ========================================================================
    // Ensuring
    // ========================================================================

    /// Guarantee that every candidate id has a cached status record, loading
    /// existing rows from the store and creating defaults for ids the store
    /// has never seen.
    ///
    /// Cache hits cost nothing: if every id is already cached this returns
    /// immediately with no store access. Otherwise one batched fetch covers
    /// all missing ids, and one batched insert-or-ignore covers all ids that
    /// had no row at all. The returned future resolves exactly once, after
    /// the create write (if any) has been queued.
    pub async fn ensure_statuses(&mut self, candidate_ids: &[ArticleId]) -> Result<()> {
        let missing = self.ids_missing_from_cache(candidate_ids);
        if missing.is_empty() {
            return Ok(());
        }

        let fetched = self
            .store
            .fetch_statuses(&missing)
            .await
            .context("bulk status fetch failed")?;
        self.cache.insert_missing(fetched);

        // Ids still unresolved after the fetch have no store row at all.
        let still_missing = self.ids_missing_from_cache(&missing);
        if !still_missing.is_empty() {
            let now = Utc::now().timestamp();
            let created: Vec<ArticleStatus> = still_missing
                .into_iter()
                .map(|id| ArticleStatus::new_default(id, now))
                .collect();
            tracing::debug!(count = created.len(), "creating default statuses");
            self.cache.insert_missing(created.iter().cloned());
            self.enqueue(StoreWrite::Create(created));
        }
        Ok(())
    }

    /// [`ensure_statuses`](Self::ensure_statuses) for freshly parsed items,
    /// deriving each composite id from the item descriptor.
    pub async fn ensure_statuses_for_items(&mut self, items: &[ParsedItem]) -> Result<()> {
        let ids: Vec<ArticleId> = items.iter().map(ParsedItem::article_id).collect();
        self.ensure_statuses(&ids).await
    }

    // ========================================================================
    // Marking
    // ========================================================================

    /// Set one flag to `value` on the given records.
    ///
    /// Records whose flag already equals `value` (judged against the
    /// authoritative cached copy when one exists) are dropped without any
    /// I/O. For the remainder the cache is mutated synchronously and exactly
    /// one batched update is queued for the store. Fire-and-forget: the
    /// write is not durable when this returns, only ordered behind all
    /// previously queued writes.
    pub fn mark_statuses(&mut self, statuses: &[ArticleStatus], flag: StatusFlag, value: bool) {
        let mut seen: HashSet<&ArticleId> = HashSet::with_capacity(statuses.len());
        let mut changed: Vec<ArticleId> = Vec::new();
        for status in statuses {
            if !seen.insert(&status.article_id) {
                continue;
            }
            let current = self.cache.lookup(&status.article_id).unwrap_or(status);
            if current.flag(flag) != value {
                changed.push(status.article_id.clone());
            }
        }
        if changed.is_empty() {
            return;
        }

        for id in &changed {
            if let Some(cached) = self.cache.lookup_mut(id) {
                cached.set_flag(flag, value);
            } else if let Some(status) = statuses.iter().find(|s| &s.article_id == id) {
                // Record was resolved outside the cache; adopt it so a later
                // fetch cannot observe the store row ahead of the queued
                // update.
                let mut adopted = status.clone();
                adopted.set_flag(flag, value);
                self.cache.insert(adopted);
            }
        }

        tracing::debug!(
            count = changed.len(),
            flag = flag.column(),
            value,
            "queueing batched flag update"
        );
        self.enqueue(StoreWrite::Update {
            flag,
            value,
            ids: changed,
        });
    }

    /// Mark through caller-side entities carrying their status association.
    ///
    /// Every entity must have a resolved status at this point. An entity
    /// without one aborts in debug builds; release builds log the violation
    /// and skip that entity, marking the rest.
    pub fn mark_articles<A: HasStatus>(&mut self, articles: &[A], flag: StatusFlag, value: bool) {
        let missing = articles.iter().filter(|a| a.status().is_none()).count();
        debug_assert!(
            missing == 0,
            "every article must have a status before marking"
        );
        if missing > 0 {
            tracing::error!(missing, "skipping articles with no resolved status");
        }
        let statuses: Vec<ArticleStatus> =
            articles.iter().filter_map(|a| a.status().cloned()).collect();
        self.mark_statuses(&statuses, flag, value);
    }

    // ========================================================================
    // Attaching
    // ========================================================================

    /// Reconcile entity-carried statuses with the cache, in both directions:
    /// an entity whose id is cached gets the cached (authoritative) copy
    /// attached; an entity carrying a status the cache has not seen seeds
    /// the cache with it.
    pub fn attach_cached_statuses<A: HasStatus>(&mut self, articles: &mut [A]) {
        for article in articles.iter_mut() {
            if let Some(cached) = self.cache.lookup(article.article_id()) {
                article.set_status(cached.clone());
            } else if let Some(status) = article.status() {
                self.cache.insert(status.clone());
            }
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Wait until every store write queued before this call has executed.
    ///
    /// Failed writes are still counted as executed: they are logged and
    /// dropped by the writer task, per the fire-and-forget contract.
    pub async fn flush(&self) -> Result<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.writer
            .send(StoreWrite::Flush(ack_tx))
            .map_err(|_| anyhow::anyhow!("status writer task is gone"))?;
        ack_rx
            .await
            .context("status writer task dropped the flush ack")?;
        Ok(())
    }

    /// Drain the write queue and join the writer task.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            writer,
            writer_task,
            ..
        } = self;
        drop(writer);
        writer_task.await.context("status writer task panicked")?;
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Deduplicated candidate ids with no cache entry.
    fn ids_missing_from_cache(&self, candidate_ids: &[ArticleId]) -> Vec<ArticleId> {
        let mut seen: HashSet<&ArticleId> = HashSet::with_capacity(candidate_ids.len());
        candidate_ids
            .iter()
            .filter(|id| !self.cache.contains(id))
            .filter(|id| seen.insert(id))
            .cloned()
            .collect()
    }

    fn enqueue(&self, write: StoreWrite) {
        if self.writer.send(write).is_err() {
            tracing::error!("status writer task is gone; dropping store write");
        }
    }

    async fn run_writer(store: Arc<S>, mut rx: mpsc::UnboundedReceiver<StoreWrite>) {
        while let Some(write) = rx.recv().await {
            match write {
                StoreWrite::Create(statuses) => {
                    if let Err(error) = store.create_statuses(&statuses).await {
                        tracing::error!(
                            error = %error,
                            count = statuses.len(),
                            "dropping failed status create batch"
                        );
                    }
                }
                StoreWrite::Update { flag, value, ids } => {
                    if let Err(error) = store.update_statuses(flag, value, &ids).await {
                        tracing::error!(
                            error = %error,
                            count = ids.len(),
                            flag = flag.column(),
                            "dropping failed status update batch"
                        );
                    }
                }
                StoreWrite::Flush(ack) => {
                    // Receiver may have given up waiting; nothing to do then.
                    let _ = ack.send(());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Call-recording in-memory store. Cheap-clone handle so tests keep a
    /// view into the rows and recorded batches after handing it to the
    /// manager.
    #[derive(Clone, Default)]
    struct MockStore {
        inner: Arc<MockInner>,
    }

    #[derive(Default)]
    struct MockInner {
        rows: Mutex<HashMap<ArticleId, ArticleStatus>>,
        fetch_batches: Mutex<Vec<Vec<ArticleId>>>,
        create_batches: Mutex<Vec<Vec<ArticleStatus>>>,
        update_batches: Mutex<Vec<(StatusFlag, bool, Vec<ArticleId>)>>,
        fail_next_fetch: AtomicBool,
        fail_next_update: AtomicBool,
    }

    impl MockStore {
        fn fail_next_fetch(&self) {
            self.inner.fail_next_fetch.store(true, Ordering::SeqCst);
        }

        fn fail_next_update(&self) {
            self.inner.fail_next_update.store(true, Ordering::SeqCst);
        }

        fn seed(&self, status: ArticleStatus) {
            self.inner
                .rows
                .lock()
                .unwrap()
                .insert(status.article_id.clone(), status);
        }

        fn row(&self, id: &ArticleId) -> Option<ArticleStatus> {
            self.inner.rows.lock().unwrap().get(id).cloned()
        }

        fn fetch_count(&self) -> usize {
            self.inner.fetch_batches.lock().unwrap().len()
        }

        fn create_batches(&self) -> Vec<Vec<ArticleStatus>> {
            self.inner.create_batches.lock().unwrap().clone()
        }

        fn update_batches(&self) -> Vec<(StatusFlag, bool, Vec<ArticleId>)> {
            self.inner.update_batches.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl StatusStore for MockStore {
        async fn fetch_statuses(&self, ids: &[ArticleId]) -> Result<Vec<ArticleStatus>> {
            self.inner
                .fetch_batches
                .lock()
                .unwrap()
                .push(ids.to_vec());
            if self.inner.fail_next_fetch.swap(false, Ordering::SeqCst) {
                anyhow::bail!("status fetch failed");
            }
            let rows = self.inner.rows.lock().unwrap();
            Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
        }

        async fn create_statuses(&self, statuses: &[ArticleStatus]) -> Result<()> {
            self.inner
                .create_batches
                .lock()
                .unwrap()
                .push(statuses.to_vec());
            let mut rows = self.inner.rows.lock().unwrap();
            for status in statuses {
                rows.entry(status.article_id.clone())
                    .or_insert_with(|| status.clone());
            }
            Ok(())
        }

        async fn update_statuses(
            &self,
            flag: StatusFlag,
            value: bool,
            ids: &[ArticleId],
        ) -> Result<()> {
            self.inner
                .update_batches
                .lock()
                .unwrap()
                .push((flag, value, ids.to_vec()));
            if self.inner.fail_next_update.swap(false, Ordering::SeqCst) {
                anyhow::bail!("status update failed");
            }
            let mut rows = self.inner.rows.lock().unwrap();
            for id in ids {
                if let Some(row) = rows.get_mut(id) {
                    row.set_flag(flag, value);
                }
            }
            Ok(())
        }
    }

    fn id(n: u32) -> ArticleId {
        ArticleId::from_parts("https://feed.example/rss", &n.to_string())
    }

    fn ids(range: std::ops::Range<u32>) -> Vec<ArticleId> {
        range.map(id).collect()
    }

    struct TestArticle {
        article_id: ArticleId,
        status: Option<ArticleStatus>,
    }

    impl HasStatus for TestArticle {
        fn article_id(&self) -> &ArticleId {
            &self.article_id
        }
        fn status(&self) -> Option<&ArticleStatus> {
            self.status.as_ref()
        }
        fn set_status(&mut self, status: ArticleStatus) {
            self.status = Some(status);
        }
    }

    #[tokio::test]
    async fn ensure_with_no_candidates_touches_nothing() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());

        manager.ensure_statuses(&[]).await.unwrap();

        assert_eq!(store.fetch_count(), 0);
        assert!(store.create_batches().is_empty());
    }

    #[tokio::test]
    async fn ensure_is_idempotent() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());

        manager.ensure_statuses(&ids(0..3)).await.unwrap();
        manager.flush().await.unwrap();
        assert_eq!(store.fetch_count(), 1);
        assert_eq!(store.create_batches().len(), 1);

        // Second call over the same set: every id cache-hits, zero store
        // access of any kind.
        manager.ensure_statuses(&ids(0..3)).await.unwrap();
        manager.flush().await.unwrap();
        assert_eq!(store.fetch_count(), 1);
        assert_eq!(store.create_batches().len(), 1);
    }

    #[tokio::test]
    async fn ensure_creates_one_batch_for_all_new_ids() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());

        manager.ensure_statuses(&ids(0..100)).await.unwrap();
        manager.flush().await.unwrap();

        let batches = store.create_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 100);
        for article_id in ids(0..100) {
            let status = manager.status(&article_id).expect("cache-resolvable");
            assert!(!status.read && !status.starred && !status.user_deleted);
        }
    }

    #[tokio::test]
    async fn ensure_never_recreates_fetched_ids() {
        let store = MockStore::default();
        // A stored record with default-looking flags; only date_arrived
        // betrays that it pre-existed.
        store.seed(ArticleStatus::new_default(id(0), 1_000));
        let mut manager = StatusManager::new(store.clone());

        manager.ensure_statuses(&ids(0..2)).await.unwrap();
        manager.flush().await.unwrap();

        let batches = store.create_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[0][0].article_id, id(1));
        assert_eq!(manager.status(&id(0)).unwrap().date_arrived, 1_000);
    }

    #[tokio::test]
    async fn ensure_dedups_candidate_ids() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());

        let candidates = vec![id(0), id(1), id(0), id(1), id(0)];
        manager.ensure_statuses(&candidates).await.unwrap();
        manager.flush().await.unwrap();

        let batches = store.create_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[tokio::test]
    async fn ensure_for_items_derives_composite_ids() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());

        let items = vec![
            ParsedItem {
                feed_url: "https://a.example/feed".to_string(),
                unique_id: "1".to_string(),
            },
            ParsedItem {
                feed_url: "https://b.example/feed".to_string(),
                unique_id: "1".to_string(),
            },
        ];
        manager.ensure_statuses_for_items(&items).await.unwrap();

        assert!(manager
            .status(&ArticleId::from_parts("https://a.example/feed", "1"))
            .is_some());
        assert!(manager
            .status(&ArticleId::from_parts("https://b.example/feed", "1"))
            .is_some());
    }

    #[tokio::test]
    async fn ensure_propagates_fetch_failure_and_creates_nothing() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());

        store.fail_next_fetch();
        let result = manager.ensure_statuses(&ids(0..2)).await;
        manager.flush().await.unwrap();

        assert!(result.is_err());
        assert!(store.create_batches().is_empty());
        assert!(manager.status(&id(0)).is_none());
        assert!(manager.status(&id(1)).is_none());

        // The failure was transient; a retry from the caller resolves
        // everything normally.
        manager.ensure_statuses(&ids(0..2)).await.unwrap();
        manager.flush().await.unwrap();
        assert_eq!(store.create_batches().len(), 1);
        assert!(manager.status(&id(0)).is_some());
    }

    #[tokio::test]
    async fn failed_update_is_dropped_and_the_queue_keeps_draining() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..1)).await.unwrap();

        // First queued write fails in the writer task; the one behind it
        // must still apply, and flush must still ack.
        store.fail_next_update();
        let status = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[status], StatusFlag::Read, true);
        let status = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[status], StatusFlag::Starred, true);

        manager.flush().await.unwrap();

        assert_eq!(store.update_batches().len(), 2);
        let row = store.row(&id(0)).unwrap();
        assert!(!row.read, "failed write is dropped, not retried");
        assert!(row.starred, "later write still lands");
        // The cache keeps the caller-visible value regardless.
        assert!(manager.status(&id(0)).unwrap().read);
    }

    #[tokio::test]
    async fn mark_filters_out_noops_without_io() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..1)).await.unwrap();

        let status = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[status.clone()], StatusFlag::Read, false);
        manager.flush().await.unwrap();

        assert!(store.update_batches().is_empty());
        assert_eq!(manager.status(&id(0)), Some(&status));
    }

    #[tokio::test]
    async fn mark_batches_only_changed_ids() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..3)).await.unwrap();

        // Pre-mark id 2 so it is a no-op in the second call.
        let pre = manager.status(&id(2)).unwrap().clone();
        manager.mark_statuses(&[pre], StatusFlag::Read, true);

        let statuses: Vec<ArticleStatus> = ids(0..3)
            .iter()
            .map(|i| manager.status(i).unwrap().clone())
            .collect();
        manager.mark_statuses(&statuses, StatusFlag::Read, true);
        manager.flush().await.unwrap();

        let batches = store.update_batches();
        assert_eq!(batches.len(), 2);
        let (flag, value, changed) = &batches[1];
        assert_eq!(*flag, StatusFlag::Read);
        assert!(*value);
        let mut changed = changed.clone();
        changed.sort();
        assert_eq!(changed, vec![id(0), id(1)]);
    }

    #[tokio::test]
    async fn mark_dedups_repeated_records() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..1)).await.unwrap();

        let status = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[status.clone(), status], StatusFlag::Starred, true);
        manager.flush().await.unwrap();

        let batches = store.update_batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].2.len(), 1);
    }

    #[tokio::test]
    async fn mark_is_visible_in_cache_before_flush() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..1)).await.unwrap();

        let status = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[status], StatusFlag::Read, true);

        // No flush: the cache mutation is synchronous.
        assert!(manager.status(&id(0)).unwrap().read);
    }

    #[tokio::test]
    async fn mark_adopts_uncached_records() {
        let store = MockStore::default();
        store.seed(ArticleStatus::new_default(id(0), 1_000));
        let mut manager = StatusManager::new(store.clone());

        // Resolved out of band (e.g. carried by a deserialized article), not
        // via ensure_statuses.
        let status = store.row(&id(0)).unwrap();
        manager.mark_statuses(&[status], StatusFlag::Read, true);
        manager.flush().await.unwrap();

        assert!(manager.status(&id(0)).unwrap().read);
        assert!(store.row(&id(0)).unwrap().read);
    }

    #[tokio::test]
    async fn mark_judges_noops_against_the_cache_not_the_argument() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..1)).await.unwrap();

        let stale = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[stale.clone()], StatusFlag::Read, true);

        // The caller's clone still says read=false, but the cache already
        // says true, so this second call must not queue another write.
        manager.mark_statuses(&[stale], StatusFlag::Read, true);
        manager.flush().await.unwrap();

        assert_eq!(store.update_batches().len(), 1);
    }

    #[tokio::test]
    async fn writes_apply_in_submission_order() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..1)).await.unwrap();

        let status = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[status], StatusFlag::Read, true);
        let status = manager.status(&id(0)).unwrap().clone();
        manager.mark_statuses(&[status], StatusFlag::Read, false);
        manager.flush().await.unwrap();

        assert!(!store.row(&id(0)).unwrap().read);
        assert_eq!(store.update_batches().len(), 2);
    }

    #[tokio::test]
    async fn mark_articles_marks_resolved_entities() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..2)).await.unwrap();

        let articles: Vec<TestArticle> = ids(0..2)
            .into_iter()
            .map(|article_id| TestArticle {
                status: manager.status(&article_id).cloned(),
                article_id,
            })
            .collect();
        manager.mark_articles(&articles, StatusFlag::Read, true);
        manager.flush().await.unwrap();

        assert!(manager.status(&id(0)).unwrap().read);
        assert!(manager.status(&id(1)).unwrap().read);
        assert_eq!(store.update_batches().len(), 1);
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    #[should_panic(expected = "every article must have a status")]
    async fn mark_articles_without_status_aborts_in_debug() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store);

        let articles = vec![TestArticle {
            article_id: id(0),
            status: None,
        }];
        manager.mark_articles(&articles, StatusFlag::Read, true);
    }

    #[tokio::test]
    async fn attach_hands_out_cached_and_seeds_from_carried() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..1)).await.unwrap();
        let cached = manager.status(&id(0)).unwrap().clone();

        let mut carried = ArticleStatus::new_default(id(1), 2_000);
        carried.set_flag(StatusFlag::Starred, true);

        let mut articles = vec![
            TestArticle {
                article_id: id(0),
                status: None,
            },
            TestArticle {
                article_id: id(1),
                status: Some(carried.clone()),
            },
        ];
        manager.attach_cached_statuses(&mut articles);

        assert_eq!(articles[0].status.as_ref(), Some(&cached));
        assert_eq!(manager.status(&id(1)), Some(&carried));
    }

    #[tokio::test]
    async fn shutdown_drains_pending_writes() {
        let store = MockStore::default();
        let mut manager = StatusManager::new(store.clone());
        manager.ensure_statuses(&ids(0..5)).await.unwrap();

        manager.shutdown().await.unwrap();

        assert_eq!(store.create_batches().len(), 1);
        for article_id in ids(0..5) {
            assert!(store.row(&article_id).is_some());
        }
    }
}
