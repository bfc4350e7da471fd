//! # Tier Evaluator
//!
//! Determines which tier an entity's current metrics place it in.
//!
//! ## Evaluation Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Tier Evaluation                                    │
//! │                                                                         │
//! │  Catalog (sorted by level):                                            │
//! │    L1 Bronze  (orders ≥ 0)                                             │
//! │    L2 Silver  (orders ≥ 50, rating ≥ 4.50)                             │
//! │    L3 Gold    (orders ≥ 200, rating ≥ 4.70)                            │
//! │                                                                         │
//! │  Metrics: { deliveries: 60, rating: 4.60 }                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │    L1 qualifies ✓   L2 qualifies ✓   L3 orders unmet ✗                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Result: Silver (highest qualifying level wins)                        │
//! │                                                                         │
//! │  Tiers are cumulative bands, not exclusive ranges: qualifying for      │
//! │  L3 implies qualifying for L1 and L2. If nothing qualifies, the        │
//! │  base tier applies.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The tier is recomputed on every call - it is a pure function of current
//! metrics and the catalog, never stored as mutable derived state that
//! could go stale.

use crate::catalog::TierCatalog;
use crate::error::{CoreError, CoreResult};
use crate::types::{EntityMetrics, TierDefinition};

// =============================================================================
// Evaluation
// =============================================================================

/// Selects the highest-level tier whose every threshold the metrics meet.
///
/// Falls back to the lowest tier when none qualify. Fails with
/// [`CoreError::EmptyCatalog`] if `tiers` is empty; prefer
/// [`TierCatalog::evaluate`], which proves non-emptiness at construction.
///
/// Works on any slice order - the scan tracks the best qualifying level
/// rather than assuming sortedness.
///
/// ## Example
/// ```rust
/// use vela_core::evaluator::evaluate;
/// use vela_core::types::{EntityKind, EntityMetrics, TierDefinition};
///
/// # fn tier(name: &str, level: u32, min_orders: i64, min_rating: u32) -> TierDefinition {
/// #     TierDefinition {
/// #         name: name.into(), level, min_orders,
/// #         min_rating_hundredths: min_rating, min_fulfillment_bps: 0,
/// #         min_revenue_cents: 0, commission_bps: 1500, payout_days: 14,
/// #         monthly_credit_grant: 0, product_limit: None,
/// #         promotion_limit: None, visibility_boost: 1,
/// #     }
/// # }
/// let tiers = [tier("Bronze", 1, 0, 0), tier("Silver", 2, 50, 450)];
///
/// let metrics = EntityMetrics::sample("d1", EntityKind::Driver, 60, 460, 10_000, 0);
/// assert_eq!(evaluate(&metrics, &tiers).unwrap().name, "Silver");
/// ```
pub fn evaluate<'a>(
    metrics: &EntityMetrics,
    tiers: &'a [TierDefinition],
) -> CoreResult<&'a TierDefinition> {
    let mut base: Option<&TierDefinition> = None;
    let mut best: Option<&TierDefinition> = None;

    for tier in tiers {
        if base.map_or(true, |b| tier.level < b.level) {
            base = Some(tier);
        }
        if tier.meets_thresholds(metrics) && best.map_or(true, |b| tier.level > b.level) {
            best = Some(tier);
        }
    }

    best.or(base).ok_or_else(|| CoreError::EmptyCatalog {
        kind: metrics.kind.as_str().to_string(),
    })
}

impl TierCatalog {
    /// Evaluates metrics against this catalog.
    ///
    /// Infallible: non-emptiness was proven by [`TierCatalog::new`], so
    /// there is always a base tier to fall back to.
    pub fn evaluate(&self, metrics: &EntityMetrics) -> &TierDefinition {
        let mut best = self.base();
        // Sorted ascending at construction, so the last qualifying tier
        // is the highest qualifying level.
        for tier in self.tiers() {
            if tier.meets_thresholds(metrics) {
                best = tier;
            }
        }
        best
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityKind;

    fn tier(name: &str, level: u32, min_orders: i64, min_rating: u32) -> TierDefinition {
        TierDefinition {
            name: name.to_string(),
            level,
            min_orders,
            min_rating_hundredths: min_rating,
            min_fulfillment_bps: 0,
            min_revenue_cents: 0,
            commission_bps: 1500,
            payout_days: 14,
            monthly_credit_grant: 0,
            product_limit: None,
            promotion_limit: None,
            visibility_boost: 1,
        }
    }

    fn driver_catalog() -> TierCatalog {
        TierCatalog::new(
            EntityKind::Driver,
            vec![
                tier("Bronze", 1, 0, 0),
                tier("Silver", 2, 50, 450),
                tier("Gold", 3, 200, 470),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_highest_qualifying_tier_wins() {
        let catalog = driver_catalog();
        // 60 deliveries at 4.60: qualifies for Bronze and Silver, not Gold
        let metrics = EntityMetrics::sample("d1", EntityKind::Driver, 60, 460, 10_000, 0);
        assert_eq!(catalog.evaluate(&metrics).name, "Silver");
    }

    #[test]
    fn test_unmet_rating_drops_to_lower_tier() {
        let catalog = driver_catalog();
        // 60 deliveries but 4.00 rating: Silver's rating threshold unmet
        let metrics = EntityMetrics::sample("d1", EntityKind::Driver, 60, 400, 10_000, 0);
        assert_eq!(catalog.evaluate(&metrics).level, 1);
    }

    #[test]
    fn test_base_tier_when_nothing_qualifies() {
        let catalog = TierCatalog::new(
            EntityKind::Vendor,
            vec![tier("Growth", 2, 50, 400), tier("Pro", 3, 200, 450)],
        )
        .unwrap();
        // Even the lowest tier's thresholds are unmet: fall back to it anyway
        let metrics = EntityMetrics::sample("v1", EntityKind::Vendor, 3, 300, 10_000, 0);
        assert_eq!(catalog.evaluate(&metrics).name, "Growth");
    }

    #[test]
    fn test_fresh_entity_lands_on_base() {
        let catalog = driver_catalog();
        let metrics = EntityMetrics::fresh(
            "d-new",
            EntityKind::Driver,
            chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
        );
        assert_eq!(catalog.evaluate(&metrics).name, "Bronze");
    }

    #[test]
    fn test_top_tier_reachable() {
        let catalog = driver_catalog();
        let metrics = EntityMetrics::sample("d1", EntityKind::Driver, 500, 490, 10_000, 0);
        assert_eq!(catalog.evaluate(&metrics).name, "Gold");
    }

    #[test]
    fn test_slice_evaluate_empty_is_configuration_error() {
        let metrics = EntityMetrics::sample("d1", EntityKind::Driver, 10, 400, 10_000, 0);
        let err = evaluate(&metrics, &[]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCatalog { .. }));
    }

    #[test]
    fn test_slice_evaluate_ignores_order() {
        let tiers = [
            tier("Gold", 3, 200, 470),
            tier("Bronze", 1, 0, 0),
            tier("Silver", 2, 50, 450),
        ];
        let metrics = EntityMetrics::sample("d1", EntityKind::Driver, 60, 460, 10_000, 0);
        assert_eq!(evaluate(&metrics, &tiers).unwrap().name, "Silver");
    }

    /// Property check from the contract: the selected tier's thresholds are
    /// all met (or it is the base tier), and no higher level also qualifies.
    #[test]
    fn test_no_higher_qualifier_skipped() {
        let catalog = driver_catalog();
        let cases = [
            (0i64, 0u32),
            (49, 500),
            (50, 450),
            (199, 500),
            (200, 470),
            (1000, 460),
        ];
        for (orders, rating) in cases {
            let metrics =
                EntityMetrics::sample("d", EntityKind::Driver, orders, rating as i64, 10_000, 0);
            let chosen = catalog.evaluate(&metrics);
            for tier in catalog.tiers() {
                if tier.level > chosen.level {
                    assert!(
                        !tier.meets_thresholds(&metrics),
                        "tier {} qualified but {} was chosen",
                        tier.name,
                        chosen.name
                    );
                }
            }
        }
    }
}
