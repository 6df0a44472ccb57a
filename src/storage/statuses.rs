use anyhow::Result;
use async_trait::async_trait;
use sqlx::QueryBuilder;

use super::schema::Database;
use super::types::StatusRow;
use crate::model::{ArticleId, ArticleStatus, StatusFlag};
use crate::store::StatusStore;

// ============================================================================
// Batch Limit Constants
// ============================================================================

/// Maximum ids per IN (...) list. SQLite's default bind-parameter limit is
/// 999; 500 leaves headroom for the handful of extra binds per statement.
const MAX_IDS_PER_STATEMENT: usize = 500;

/// Rows per INSERT statement: 5 columns * 100 = 500 binds, under the limit.
const INSERT_BATCH_SIZE: usize = 100;

impl Database {
    // ========================================================================
    // Status Operations
    // ========================================================================

    /// Bulk point-lookup of status rows by id.
    ///
    /// One SELECT per `MAX_IDS_PER_STATEMENT` ids; ids with no row are
    /// absent from the result.
    pub async fn fetch_statuses(&self, ids: &[ArticleId]) -> Result<Vec<ArticleStatus>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut statuses = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
            let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
                "SELECT article_id, read, starred, user_deleted, date_arrived \
                 FROM statuses WHERE article_id IN (",
            );
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated(")");

            let rows: Vec<StatusRow> = builder.build_query_as().fetch_all(&self.pool).await?;
            statuses.extend(rows.into_iter().map(StatusRow::into_status));
        }

        tracing::debug!(
            requested = ids.len(),
            found = statuses.len(),
            "bulk status fetch"
        );
        Ok(statuses)
    }

    /// Insert status rows with conflict-ignore semantics: an existing row
    /// for the same id wins and is left unchanged.
    ///
    /// All chunks run inside one transaction so a mixed-size batch lands
    /// atomically.
    pub async fn create_statuses(&self, statuses: &[ArticleStatus]) -> Result<()> {
        if statuses.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for chunk in statuses.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<sqlx::Sqlite> = QueryBuilder::new(
                "INSERT OR IGNORE INTO statuses \
                 (article_id, read, starred, user_deleted, date_arrived) ",
            );
            builder.push_values(chunk, |mut b, status| {
                b.push_bind(status.article_id.as_str())
                    .push_bind(status.read)
                    .push_bind(status.starred)
                    .push_bind(status.user_deleted)
                    .push_bind(status.date_arrived);
            });
            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(count = statuses.len(), "bulk status insert-or-ignore");
        Ok(())
    }

    /// Set one flag for every listed id, as a single logical transaction.
    ///
    /// A batch larger than `MAX_IDS_PER_STATEMENT` spans multiple UPDATE
    /// statements, but the enclosing transaction keeps partial application
    /// unobservable to outside readers.
    pub async fn update_statuses(
        &self,
        flag: StatusFlag,
        value: bool,
        ids: &[ArticleId],
    ) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for chunk in ids.chunks(MAX_IDS_PER_STATEMENT) {
            // flag.column() is a closed set of column names, never user input.
            let mut builder: QueryBuilder<sqlx::Sqlite> =
                QueryBuilder::new(format!("UPDATE statuses SET {} = ", flag.column()));
            builder.push_bind(value);
            builder.push(" WHERE article_id IN (");
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.as_str());
            }
            separated.push_unseparated(")");

            builder.build().execute(&mut *tx).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            count = ids.len(),
            flag = flag.column(),
            value,
            "bulk status flag update"
        );
        Ok(())
    }
}

#[async_trait]
impl StatusStore for Database {
    async fn fetch_statuses(&self, ids: &[ArticleId]) -> Result<Vec<ArticleStatus>> {
        Database::fetch_statuses(self, ids).await
    }

    async fn create_statuses(&self, statuses: &[ArticleStatus]) -> Result<()> {
        Database::create_statuses(self, statuses).await
    }

    async fn update_statuses(
        &self,
        flag: StatusFlag,
        value: bool,
        ids: &[ArticleId],
    ) -> Result<()> {
        Database::update_statuses(self, flag, value, ids).await
    }
}
