//! # Metrics Repository
//!
//! Rolling performance aggregates, written as deltas on completion events.
//!
//! ## Delta Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Metrics Update Strategy                              │
//! │                                                                         │
//! │  ❌ WRONG: Absolute update (clobbers concurrent completions)           │
//! │     UPDATE entity_metrics SET total_orders = 61 WHERE entity_id = ?    │
//! │                                                                         │
//! │  ✅ CORRECT: Delta update                                              │
//! │     UPDATE entity_metrics SET total_orders = total_orders + 1, ...     │
//! │                                                                         │
//! │  Two deliveries completing at once:                                    │
//! │  Handler A: +1 order, +460 rating sum                                  │
//! │  Handler B: +1 order, +500 rating sum                                  │
//! │  Both commute: totals are correct in either commit order               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tier evaluation reads these aggregates; it never writes them. The tier
//! itself is recomputed on demand, not stored.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use vela_core::{EntityKind, EntityMetrics, MAX_RATING_HUNDREDTHS};

/// Repository for entity performance metrics.
///
/// ## Usage
/// ```rust,ignore
/// // A delivery completed: 4.60 stars, on time, $7.50 payout
/// db.metrics()
///     .record_completion("drv-1", EntityKind::Driver, 750, 460, true)
///     .await?;
///
/// let metrics = db.metrics().get("drv-1").await?.unwrap();
/// let tier = catalog.evaluate(&metrics);
/// ```
#[derive(Debug, Clone)]
pub struct MetricsRepository {
    pool: SqlitePool,
}

impl MetricsRepository {
    /// Creates a new MetricsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MetricsRepository { pool }
    }

    /// Records one completed order/delivery as a delta upsert.
    ///
    /// ## Arguments
    /// * `revenue_cents` - order revenue (vendor) or payout (driver)
    /// * `rating_hundredths` - rating received, clamped to the 5-star scale
    /// * `fulfilled` - whether the completion was fulfilled / on time
    pub async fn record_completion(
        &self,
        entity_id: &str,
        kind: EntityKind,
        revenue_cents: i64,
        rating_hundredths: u32,
        fulfilled: bool,
    ) -> DbResult<()> {
        // A buggy event producer cannot inflate an average past 5 stars
        let rating = rating_hundredths.min(MAX_RATING_HUNDREDTHS) as i64;
        let fulfilled_delta: i64 = if fulfilled { 1 } else { 0 };
        let now = Utc::now();

        debug!(entity_id = %entity_id, rating = %rating, fulfilled = %fulfilled, "Recording completion");

        sqlx::query(
            r#"
            INSERT INTO entity_metrics (
                entity_id, kind, total_orders, rating_sum_hundredths,
                fulfilled_count, revenue_cents, updated_at
            ) VALUES (?1, ?2, 1, ?3, ?4, ?5, ?6)
            ON CONFLICT(entity_id) DO UPDATE SET
                total_orders = total_orders + 1,
                rating_sum_hundredths = rating_sum_hundredths + excluded.rating_sum_hundredths,
                fulfilled_count = fulfilled_count + excluded.fulfilled_count,
                revenue_cents = revenue_cents + excluded.revenue_cents,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity_id)
        .bind(kind)
        .bind(rating)
        .bind(fulfilled_delta)
        .bind(revenue_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets an entity's aggregates.
    ///
    /// ## Returns
    /// * `Ok(Some(EntityMetrics))` - entity has completion history
    /// * `Ok(None)` - no completions yet (caller treats as fresh metrics)
    pub async fn get(&self, entity_id: &str) -> DbResult<Option<EntityMetrics>> {
        let metrics = sqlx::query_as::<_, EntityMetrics>(
            r#"
            SELECT entity_id, kind, total_orders, rating_sum_hundredths,
                   fulfilled_count, revenue_cents, updated_at
            FROM entity_metrics
            WHERE entity_id = ?1
            "#,
        )
        .bind(entity_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(metrics)
    }

    /// Gets an entity's aggregates, or fresh zeroed metrics if none exist.
    ///
    /// Convenience for evaluation paths: a brand-new entity lands on the
    /// base tier without needing a row.
    pub async fn get_or_fresh(&self, entity_id: &str, kind: EntityKind) -> DbResult<EntityMetrics> {
        Ok(self
            .get(entity_id)
            .await?
            .unwrap_or_else(|| EntityMetrics::fresh(entity_id, kind, Utc::now())))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
