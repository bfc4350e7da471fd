//! # Database Error Types
//!
//! Error types for database operations, including the expected business
//! outcomes that surface as typed errors.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Handler layer maps expected outcomes to user messages:                │
//! │    InsufficientBalance   → "not enough credits"                        │
//! │    AlreadyClaimed        → "job no longer available"                   │
//! │    RefundAlreadyIssued   → re-fetch and show current state             │
//! │                                                                         │
//! │  None of these are retried internally: a failed conditional update     │
//! │  is a final answer for this request.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use vela_core::CoreError;

/// Database operation errors.
///
/// Two families live here: storage failures (connection, migration, query)
/// and expected contention outcomes (balance, claims, refunds) that a
/// conditional update reports by affecting zero rows.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The entity's credit balance cannot cover the requested spend.
    ///
    /// ## When This Occurs
    /// - The conditional debit (`WHERE balance >= amount`) matched zero rows
    /// - Two concurrent spends raced and this one lost
    ///
    /// Expected, recoverable: surfaced to the user as "not enough credits".
    #[error("Insufficient balance for {entity_id}: have {balance}, requested {requested}")]
    InsufficientBalance {
        entity_id: String,
        balance: i64,
        requested: i64,
    },

    /// The delivery job was claimed by another driver first.
    ///
    /// ## When This Occurs
    /// - The conditional claim (`WHERE status = 'pending' AND driver_id IS
    ///   NULL`) matched zero rows but the job exists
    ///
    /// Expected contention outcome: the caller re-fetches and reports
    /// "job no longer available", never retries the same write.
    #[error("Job {job_id} already claimed")]
    AlreadyClaimed { job_id: String },

    /// The campaign is already settled terminally (deleted, refund issued).
    ///
    /// ## When This Occurs
    /// - `pause`/`delete` called on a deleted campaign; the status
    ///   transition (`WHERE status != 'deleted'`) matched zero rows
    #[error("Campaign {campaign_id} already settled, refund already issued")]
    RefundAlreadyIssued { campaign_id: String },

    /// A trigger would push `credits_used` past `credit_budget`.
    ///
    /// ## When This Occurs
    /// - The campaign is out of budget or no longer active
    #[error("Campaign {campaign_id} budget exhausted or campaign not active")]
    BudgetExhausted { campaign_id: String },

    /// Rules-engine error from vela-core (bad catalog, bad amount).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Unique constraint violation.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when the error is an expected business outcome rather than a
    /// storage failure. Handlers surface these to the user; everything
    /// else is logged and reported as an internal error.
    pub fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            DbError::InsufficientBalance { .. }
                | DbError::AlreadyClaimed { .. }
                | DbError::RefundAlreadyIssued { .. }
                | DbError::BudgetExhausted { .. }
        )
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite error messages for constraints:
                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_outcome_classification() {
        let err = DbError::InsufficientBalance {
            entity_id: "vnd-1".into(),
            balance: 40,
            requested: 60,
        };
        assert!(err.is_business_outcome());

        let err = DbError::AlreadyClaimed {
            job_id: "job-1".into(),
        };
        assert!(err.is_business_outcome());

        let err = DbError::QueryFailed("boom".into());
        assert!(!err.is_business_outcome());
    }

    #[test]
    fn test_error_messages() {
        let err = DbError::InsufficientBalance {
            entity_id: "vnd-1".into(),
            balance: 40,
            requested: 60,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance for vnd-1: have 40, requested 60"
        );

        let err = DbError::not_found("Campaign", "cmp-1");
        assert_eq!(err.to_string(), "Campaign not found: cmp-1");
    }

    #[test]
    fn test_core_error_passes_through() {
        let core = CoreError::InvalidAmount { amount: 0 };
        let err: DbError = core.into();
        assert_eq!(err.to_string(), "Credit amount must be positive, got 0");
    }
}
