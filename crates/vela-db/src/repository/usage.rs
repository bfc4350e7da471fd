//! # Usage Counter Repository
//!
//! Per-entity, per-period counters for limited actions.
//!
//! ## Two Increment Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Counting Limited Actions                             │
//! │                                                                         │
//! │  PATH 1: pure check, count after success                               │
//! │    can_perform(action, tier, usage)      ← vela-core, pure             │
//! │         │ Allowed                                                       │
//! │         ▼                                                               │
//! │    ... action succeeds ...                                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │    record_use()                          ← failed attempts not counted │
//! │                                                                         │
//! │  PATH 2: atomic reserve under contention                               │
//! │    try_increment(limit)                                                │
//! │      UPDATE ... SET used = used + 1                                    │
//! │      WHERE ... AND (?limit IS NULL OR used < ?limit)                   │
//! │         │                                                               │
//! │         ├── 1 row  → slot reserved; release() if the action fails      │
//! │         └── 0 rows → limit reached, caller surfaces Denied             │
//! │                                                                         │
//! │  Periods are 'YYYY-MM' keys: a new month keys a new row, so counters   │
//! │  reset at the period boundary without any write.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vela_core::{period_key, ActionKind, UsageCounter};

/// Repository for usage counter database operations.
#[derive(Debug, Clone)]
pub struct UsageCounterRepository {
    pool: SqlitePool,
}

impl UsageCounterRepository {
    /// Creates a new UsageCounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UsageCounterRepository { pool }
    }

    /// The current usage period key (calendar month, e.g. "2026-08").
    pub fn current_period(&self) -> String {
        period_key(Utc::now())
    }

    /// Gets a counter, returning a zeroed one when no row exists yet.
    pub async fn get(
        &self,
        entity_id: &str,
        action: ActionKind,
        period: &str,
    ) -> DbResult<UsageCounter> {
        let counter = sqlx::query_as::<_, UsageCounter>(
            r#"
            SELECT entity_id, action, period, used, updated_at
            FROM usage_counters
            WHERE entity_id = ?1 AND action = ?2 AND period = ?3
            "#,
        )
        .bind(entity_id)
        .bind(action)
        .bind(period)
        .fetch_optional(&self.pool)
        .await?;

        Ok(counter.unwrap_or_else(|| UsageCounter::empty(entity_id, action, period, Utc::now())))
    }

    /// Counts one successful action. Unconditional.
    ///
    /// Used after a guarded action actually succeeded, so failed attempts
    /// are never counted.
    pub async fn record_use(
        &self,
        entity_id: &str,
        action: ActionKind,
        period: &str,
    ) -> DbResult<()> {
        debug!(entity_id = %entity_id, action = %action, period = %period, "Recording use");
        self.upsert_delta(entity_id, action, period, 1).await
    }

    /// Atomically reserves a slot against a limit.
    ///
    /// The limit check and the increment are one conditional UPDATE, so
    /// two concurrent calls at `limit - 1` cannot both pass. A `None`
    /// limit means unlimited and always succeeds.
    ///
    /// ## Returns
    /// * `Ok(true)` - slot reserved (counter incremented)
    /// * `Ok(false)` - limit reached; counter untouched; caller surfaces a
    ///   Denied decision, never blindly retries
    pub async fn try_increment(
        &self,
        entity_id: &str,
        action: ActionKind,
        period: &str,
        limit: Option<i64>,
    ) -> DbResult<bool> {
        // Row must exist for the conditional UPDATE to have something to
        // guard; inserting at zero is idempotent and unguarded
        self.ensure_row(entity_id, action, period).await?;

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE usage_counters
            SET used = used + 1, updated_at = ?4
            WHERE entity_id = ?1 AND action = ?2 AND period = ?3
              AND (?5 IS NULL OR used < ?5)
            "#,
        )
        .bind(entity_id)
        .bind(action)
        .bind(period)
        .bind(now)
        .bind(limit)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Releases a previously reserved slot (the guarded action failed).
    ///
    /// Floored at zero: releasing more than was reserved cannot drive the
    /// counter negative.
    pub async fn release(
        &self,
        entity_id: &str,
        action: ActionKind,
        period: &str,
    ) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE usage_counters
            SET used = used - 1, updated_at = ?4
            WHERE entity_id = ?1 AND action = ?2 AND period = ?3 AND used > 0
            "#,
        )
        .bind(entity_id)
        .bind(action)
        .bind(period)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a zeroed row if none exists.
    async fn ensure_row(&self, entity_id: &str, action: ActionKind, period: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO usage_counters (entity_id, action, period, used, updated_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            ON CONFLICT(entity_id, action, period) DO NOTHING
            "#,
        )
        .bind(entity_id)
        .bind(action)
        .bind(period)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Applies a signed delta via upsert.
    async fn upsert_delta(
        &self,
        entity_id: &str,
        action: ActionKind,
        period: &str,
        delta: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO usage_counters (entity_id, action, period, used, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(entity_id, action, period) DO UPDATE SET
                used = used + excluded.used,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity_id)
        .bind(action)
        .bind(period)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
