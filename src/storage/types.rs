use thiserror::Error;

use crate::model::{ArticleId, ArticleStatus};

// ============================================================================
// Error Types
// ============================================================================

/// Database-specific errors with user-friendly messages
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Another process has the status database locked
    #[error("Another process appears to have the status database locked. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Status database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Check if a sqlx error indicates database locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        if Self::is_lock_message(&err.to_string()) {
            return DatabaseError::InstanceLocked;
        }

        DatabaseError::Other(err)
    }

    /// Check if an error message indicates database locking.
    ///
    /// SQLITE_BUSY (5): database is locked
    /// SQLITE_LOCKED (6): database table is locked
    /// SQLITE_CANTOPEN (14): unable to open database file
    pub(crate) fn is_lock_message(message: &str) -> bool {
        let message = message.to_lowercase();
        message.contains("database is locked")
            || message.contains("database table is locked")
            || message.contains("sqlite_busy")
            || message.contains("sqlite_locked")
            || message.contains("unable to open database file")
    }
}

// ============================================================================
// Row Types
// ============================================================================

/// Internal row type for status queries (used by sqlx FromRow)
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StatusRow {
    pub article_id: String,
    pub read: bool,
    pub starred: bool,
    pub user_deleted: bool,
    pub date_arrived: i64,
}

impl StatusRow {
    pub(crate) fn into_status(self) -> ArticleStatus {
        ArticleStatus {
            article_id: ArticleId::from_raw(self.article_id),
            read: self.read,
            starred: self.starred,
            user_deleted: self.user_deleted,
            date_arrived: self.date_arrived,
        }
    }
}
