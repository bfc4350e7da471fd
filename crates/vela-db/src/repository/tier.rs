//! # Tier Repository
//!
//! Persistence for tier catalogs.
//!
//! ## Single Source Of Truth
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Tier Benefit Flow                                    │
//! │                                                                         │
//! │  Administrator seeds/updates tier_definitions                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  load_catalog(kind) ──► TierCatalog::new ──► validated catalog         │
//! │       │                      (vela-core)                                │
//! │       ▼                                                                 │
//! │  Every commission rate, payout day and credit grant is read from       │
//! │  here. Benefits are NEVER duplicated as literals at call sites -       │
//! │  the catalog table wins.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use vela_core::{EntityKind, TierCatalog, TierDefinition};

/// Repository for tier catalog database operations.
#[derive(Debug, Clone)]
pub struct TierRepository {
    pool: SqlitePool,
}

impl TierRepository {
    /// Creates a new TierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TierRepository { pool }
    }

    /// Seeds or updates a catalog for an entity kind.
    ///
    /// Validates the catalog through `TierCatalog::new` FIRST, so an
    /// ill-formed catalog never reaches storage, then upserts row by row
    /// inside one transaction (keyed on kind + level).
    pub async fn seed_catalog(&self, kind: EntityKind, tiers: Vec<TierDefinition>) -> DbResult<()> {
        let catalog = TierCatalog::new(kind, tiers)?;

        debug!(kind = %kind, tiers = catalog.len(), "Seeding tier catalog");

        let mut tx = self.pool.begin().await?;

        for tier in catalog.tiers() {
            sqlx::query(
                r#"
                INSERT INTO tier_definitions (
                    kind, level, name,
                    min_orders, min_rating_hundredths, min_fulfillment_bps, min_revenue_cents,
                    commission_bps, payout_days, monthly_credit_grant,
                    product_limit, promotion_limit, visibility_boost
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                ON CONFLICT(kind, level) DO UPDATE SET
                    name = excluded.name,
                    min_orders = excluded.min_orders,
                    min_rating_hundredths = excluded.min_rating_hundredths,
                    min_fulfillment_bps = excluded.min_fulfillment_bps,
                    min_revenue_cents = excluded.min_revenue_cents,
                    commission_bps = excluded.commission_bps,
                    payout_days = excluded.payout_days,
                    monthly_credit_grant = excluded.monthly_credit_grant,
                    product_limit = excluded.product_limit,
                    promotion_limit = excluded.promotion_limit,
                    visibility_boost = excluded.visibility_boost
                "#,
            )
            .bind(kind)
            .bind(tier.level)
            .bind(&tier.name)
            .bind(tier.min_orders)
            .bind(tier.min_rating_hundredths)
            .bind(tier.min_fulfillment_bps)
            .bind(tier.min_revenue_cents)
            .bind(tier.commission_bps)
            .bind(tier.payout_days)
            .bind(tier.monthly_credit_grant)
            .bind(tier.product_limit)
            .bind(tier.promotion_limit)
            .bind(tier.visibility_boost)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Loads and validates the catalog for an entity kind.
    ///
    /// ## Errors
    /// * `CoreError::EmptyCatalog` (via `DbError::Core`) - kind was never
    ///   seeded; fatal configuration, fix by seeding, never retry
    pub async fn load_catalog(&self, kind: EntityKind) -> DbResult<TierCatalog> {
        let tiers = sqlx::query_as::<_, TierDefinition>(
            r#"
            SELECT name, level,
                   min_orders, min_rating_hundredths, min_fulfillment_bps, min_revenue_cents,
                   commission_bps, payout_days, monthly_credit_grant,
                   product_limit, promotion_limit, visibility_boost
            FROM tier_definitions
            WHERE kind = ?1
            ORDER BY level
            "#,
        )
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;

        debug!(kind = %kind, tiers = tiers.len(), "Loaded tier catalog");

        TierCatalog::new(kind, tiers).map_err(DbError::from)
    }

    /// Counts seeded tiers across all kinds (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tier_definitions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use vela_core::{CoreError, EntityKind, TierDefinition};

    fn tier(name: &str, level: u32, min_orders: i64, commission_bps: u32) -> TierDefinition {
        TierDefinition {
            name: name.to_string(),
            level,
            min_orders,
            min_rating_hundredths: 0,
            min_fulfillment_bps: 0,
            min_revenue_cents: 0,
            commission_bps,
            payout_days: 14,
            monthly_credit_grant: 50,
            product_limit: Some(25),
            promotion_limit: None,
            visibility_boost: 1,
        }
    }

    #[tokio::test]
    async fn test_seed_and_load_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tiers = db.tiers();

        tiers
            .seed_catalog(
                EntityKind::Vendor,
                vec![tier("Starter", 1, 0, 1500), tier("Growth", 2, 50, 1200)],
            )
            .await
            .unwrap();

        let catalog = tiers.load_catalog(EntityKind::Vendor).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.base().name, "Starter");
        assert_eq!(catalog.by_level(2).unwrap().commission_bps, 1200);
    }

    #[tokio::test]
    async fn test_reseed_updates_in_place() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tiers = db.tiers();

        tiers
            .seed_catalog(EntityKind::Vendor, vec![tier("Starter", 1, 0, 1500)])
            .await
            .unwrap();
        // Administrator lowers the commission
        tiers
            .seed_catalog(EntityKind::Vendor, vec![tier("Starter", 1, 0, 1400)])
            .await
            .unwrap();

        let catalog = tiers.load_catalog(EntityKind::Vendor).await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.base().commission_bps, 1400);
    }

    #[tokio::test]
    async fn test_kinds_are_separate_catalogs() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tiers = db.tiers();

        tiers
            .seed_catalog(EntityKind::Vendor, vec![tier("Starter", 1, 0, 1500)])
            .await
            .unwrap();
        tiers
            .seed_catalog(EntityKind::Driver, vec![tier("Bronze", 1, 0, 0)])
            .await
            .unwrap();

        assert_eq!(
            tiers
                .load_catalog(EntityKind::Vendor)
                .await
                .unwrap()
                .base()
                .name,
            "Starter"
        );
        assert_eq!(
            tiers
                .load_catalog(EntityKind::Driver)
                .await
                .unwrap()
                .base()
                .name,
            "Bronze"
        );
        assert_eq!(tiers.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unseeded_kind_is_configuration_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.tiers().load_catalog(EntityKind::Driver).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::EmptyCatalog { .. })
        ));
    }

    #[tokio::test]
    async fn test_ill_formed_catalog_never_reaches_storage() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        // Level 2 demands fewer orders than level 1
        let err = db
            .tiers()
            .seed_catalog(
                EntityKind::Vendor,
                vec![tier("A", 1, 50, 1500), tier("B", 2, 10, 1200)],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::ThresholdRegression { .. })
        ));

        assert_eq!(db.tiers().count().await.unwrap(), 0);
    }
}
