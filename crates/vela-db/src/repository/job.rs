//! # Delivery Job Repository
//!
//! Open delivery jobs claimed first-come-first-served by drivers.
//!
//! ## Claim Race
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Two Drivers, One Job                                 │
//! │                                                                         │
//! │  Driver A ──┐                                                           │
//! │             ├──► UPDATE delivery_jobs                                   │
//! │  Driver B ──┘    SET status = 'claimed', driver_id = ?                  │
//! │                  WHERE id = ? AND status = 'pending'                    │
//! │                    AND driver_id IS NULL                                │
//! │                         │                                               │
//! │                         ├── 1 row  → claim won                          │
//! │                         └── 0 rows → AlreadyClaimed                     │
//! │                                                                         │
//! │  The status check and the assignment are one statement, so exactly     │
//! │  one driver wins no matter how the writes interleave. The loser gets   │
//! │  a definitive error, not a retry loop.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vela_core::{DeliveryJob, JobStatus};

/// Repository for delivery job database operations.
#[derive(Debug, Clone)]
pub struct DeliveryJobRepository {
    pool: SqlitePool,
}

impl DeliveryJobRepository {
    /// Creates a new DeliveryJobRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DeliveryJobRepository { pool }
    }

    /// Creates a pending job for an order.
    pub async fn create(&self, order_id: &str, payout_cents: i64) -> DbResult<DeliveryJob> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(job_id = %id, order_id = %order_id, "Creating delivery job");

        sqlx::query(
            r#"
            INSERT INTO delivery_jobs (id, order_id, status, driver_id, payout_cents, created_at)
            VALUES (?1, ?2, ?3, NULL, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(order_id)
        .bind(JobStatus::Pending)
        .bind(payout_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(&id).await
    }

    /// Gets a job by its ID.
    pub async fn get_by_id(&self, job_id: &str) -> DbResult<DeliveryJob> {
        let job = sqlx::query_as::<_, DeliveryJob>(
            r#"
            SELECT id, order_id, status, driver_id, payout_cents,
                   created_at, claimed_at, completed_at
            FROM delivery_jobs
            WHERE id = ?1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        job.ok_or_else(|| DbError::not_found("DeliveryJob", job_id))
    }

    /// Lists jobs still open for claiming, oldest first.
    pub async fn list_pending(&self) -> DbResult<Vec<DeliveryJob>> {
        let jobs = sqlx::query_as::<_, DeliveryJob>(
            r#"
            SELECT id, order_id, status, driver_id, payout_cents,
                   created_at, claimed_at, completed_at
            FROM delivery_jobs
            WHERE status = 'pending'
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(jobs)
    }

    /// Claims a pending job for a driver.
    ///
    /// First writer wins; everyone else gets `AlreadyClaimed`. There is no
    /// read-check-write window: the pending check and the driver assignment
    /// are a single conditional UPDATE.
    ///
    /// ## Errors
    /// * `DbError::AlreadyClaimed` - another driver got there first (or the
    ///   job already completed / was cancelled)
    /// * `DbError::NotFound` - no such job
    pub async fn claim(&self, job_id: &str, driver_id: &str) -> DbResult<DeliveryJob> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE delivery_jobs
            SET status = ?3, driver_id = ?2, claimed_at = ?4
            WHERE id = ?1 AND status = 'pending' AND driver_id IS NULL
            "#,
        )
        .bind(job_id)
        .bind(driver_id)
        .bind(JobStatus::Claimed)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish "lost the race" from "no such job"
            return match self.find(job_id).await? {
                Some(_) => Err(DbError::AlreadyClaimed {
                    job_id: job_id.to_string(),
                }),
                None => Err(DbError::not_found("DeliveryJob", job_id)),
            };
        }

        info!(job_id = %job_id, driver_id = %driver_id, "Job claimed");
        self.get_by_id(job_id).await
    }

    /// Marks a claimed job completed by its claiming driver.
    ///
    /// Ownership is enforced in the WHERE clause: a driver cannot complete
    /// a job claimed by someone else, and a pending or already-completed
    /// job cannot be completed.
    pub async fn complete(&self, job_id: &str, driver_id: &str) -> DbResult<DeliveryJob> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE delivery_jobs
            SET status = ?3, completed_at = ?4
            WHERE id = ?1 AND driver_id = ?2 AND status = 'claimed'
            "#,
        )
        .bind(job_id)
        .bind(driver_id)
        .bind(JobStatus::Completed)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find(job_id).await? {
                Some(_) => Err(DbError::AlreadyClaimed {
                    job_id: job_id.to_string(),
                }),
                None => Err(DbError::not_found("DeliveryJob", job_id)),
            };
        }

        info!(job_id = %job_id, driver_id = %driver_id, "Job completed");
        self.get_by_id(job_id).await
    }

    /// Cancels a job that has not been claimed yet.
    pub async fn cancel(&self, job_id: &str) -> DbResult<DeliveryJob> {
        let result = sqlx::query(
            r#"
            UPDATE delivery_jobs
            SET status = ?2
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(job_id)
        .bind(JobStatus::Cancelled)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find(job_id).await? {
                Some(_) => Err(DbError::AlreadyClaimed {
                    job_id: job_id.to_string(),
                }),
                None => Err(DbError::not_found("DeliveryJob", job_id)),
            };
        }

        self.get_by_id(job_id).await
    }

    async fn find(&self, job_id: &str) -> DbResult<Option<DeliveryJob>> {
        let job = sqlx::query_as::<_, DeliveryJob>(
            "SELECT id, order_id, status, driver_id, payout_cents, created_at, claimed_at, completed_at FROM delivery_jobs WHERE id = ?1",
        )
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use vela_core::JobStatus;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_claim() {
        let db = test_db().await;
        let jobs = db.jobs();

        let job = jobs.create("ord-1", 750).await.unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert!(job.is_claimable());

        let claimed = jobs.claim(&job.id, "drv-1").await.unwrap();
        assert_eq!(claimed.status, JobStatus::Claimed);
        assert_eq!(claimed.driver_id.as_deref(), Some("drv-1"));
        assert!(claimed.claimed_at.is_some());
    }

    #[tokio::test]
    async fn test_second_claim_loses() {
        let db = test_db().await;
        let jobs = db.jobs();

        let job = jobs.create("ord-1", 750).await.unwrap();
        jobs.claim(&job.id, "drv-1").await.unwrap();

        let err = jobs.claim(&job.id, "drv-2").await.unwrap_err();
        assert!(matches!(err, DbError::AlreadyClaimed { .. }));

        // The winner keeps the job
        let current = jobs.get_by_id(&job.id).await.unwrap();
        assert_eq!(current.driver_id.as_deref(), Some("drv-1"));
    }

    #[tokio::test]
    async fn test_concurrent_claims_exactly_one_wins() {
        let db = test_db().await;
        let jobs = db.jobs();

        let job = jobs.create("ord-1", 750).await.unwrap();

        let (a, b) = tokio::join!(jobs.claim(&job.id, "drv-a"), jobs.claim(&job.id, "drv-b"));

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        let winner = if a.is_ok() { "drv-a" } else { "drv-b" };
        let current = jobs.get_by_id(&job.id).await.unwrap();
        assert_eq!(current.driver_id.as_deref(), Some(winner));
    }

    #[tokio::test]
    async fn test_complete_enforces_ownership() {
        let db = test_db().await;
        let jobs = db.jobs();

        let job = jobs.create("ord-1", 750).await.unwrap();
        jobs.claim(&job.id, "drv-1").await.unwrap();

        // A different driver cannot complete it
        assert!(jobs.complete(&job.id, "drv-2").await.is_err());

        let done = jobs.complete(&job.id, "drv-1").await.unwrap();
        assert_eq!(done.status, JobStatus::Completed);
        assert!(done.completed_at.is_some());

        // Completing twice fails
        assert!(jobs.complete(&job.id, "drv-1").await.is_err());
    }

    #[tokio::test]
    async fn test_list_pending_excludes_claimed() {
        let db = test_db().await;
        let jobs = db.jobs();

        let a = jobs.create("ord-1", 500).await.unwrap();
        let _b = jobs.create("ord-2", 600).await.unwrap();
        jobs.claim(&a.id, "drv-1").await.unwrap();

        let pending = jobs.list_pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].order_id, "ord-2");
    }

    #[tokio::test]
    async fn test_cancel_only_pending() {
        let db = test_db().await;
        let jobs = db.jobs();

        let job = jobs.create("ord-1", 500).await.unwrap();
        jobs.claim(&job.id, "drv-1").await.unwrap();

        assert!(jobs.cancel(&job.id).await.is_err());

        let other = jobs.create("ord-2", 500).await.unwrap();
        let cancelled = jobs.cancel(&other.id).await.unwrap();
        assert_eq!(cancelled.status, JobStatus::Cancelled);
        assert!(!cancelled.is_claimable());
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let db = test_db().await;

        let err = db.jobs().claim("ghost", "drv-1").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
