//! # Tier Catalog
//!
//! A validated, ordered list of tier definitions for one entity kind.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Catalog Validation Layers                            │
//! │                                                                         │
//! │  Layer 1: Storage (vela-db)                                            │
//! │  ├── UNIQUE (kind, level) constraint                                   │
//! │  └── NOT NULL columns                                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE - TierCatalog::new                               │
//! │  ├── non-empty                                                         │
//! │  ├── levels strictly increasing                                        │
//! │  └── thresholds monotonically non-decreasing                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Evaluation - infallible on a validated catalog               │
//! │                                                                         │
//! │  Catching a broken catalog at load time means every later evaluate     │
//! │  call is total: no failure modes to thread through request handlers.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is the single source of truth for tier benefits. Commission
//! rates, payout days, and credit grants are read from here and nowhere
//! else - never duplicated as literals at call sites.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{EntityKind, TierDefinition};

// =============================================================================
// Tier Catalog
// =============================================================================

/// An ordered, validated set of tiers for vendors or drivers.
///
/// ## Usage
/// ```rust
/// use vela_core::catalog::TierCatalog;
/// use vela_core::types::{EntityKind, TierDefinition};
///
/// let tiers = vec![
///     TierDefinition {
///         name: "Bronze".into(),
///         level: 1,
///         min_orders: 0,
///         min_rating_hundredths: 0,
///         min_fulfillment_bps: 0,
///         min_revenue_cents: 0,
///         commission_bps: 1500,
///         payout_days: 14,
///         monthly_credit_grant: 0,
///         product_limit: Some(25),
///         promotion_limit: Some(1),
///         visibility_boost: 1,
///     },
///     TierDefinition {
///         name: "Silver".into(),
///         level: 2,
///         min_orders: 50,
///         min_rating_hundredths: 450,
///         min_fulfillment_bps: 0,
///         min_revenue_cents: 0,
///         commission_bps: 1200,
///         payout_days: 7,
///         monthly_credit_grant: 100,
///         product_limit: Some(100),
///         promotion_limit: Some(5),
///         visibility_boost: 2,
///     },
/// ];
///
/// let catalog = TierCatalog::new(EntityKind::Driver, tiers).unwrap();
/// assert_eq!(catalog.base().name, "Bronze");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCatalog {
    kind: EntityKind,
    /// Sorted by level ascending. Non-empty; validated at construction.
    tiers: Vec<TierDefinition>,
}

impl TierCatalog {
    /// Builds a catalog, validating its structural invariants.
    ///
    /// ## Validation Rules
    /// - At least one tier (the base tier evaluation falls back to)
    /// - Levels strictly increasing
    /// - Every threshold monotonically non-decreasing with level
    ///
    /// Input order does not matter; tiers are sorted by level first.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCatalog`] - no tiers given
    /// - [`CoreError::NonMonotonicLevels`] - duplicate level ordinals
    /// - [`CoreError::ThresholdRegression`] - a higher tier relaxes a
    ///   threshold below the tier beneath it
    pub fn new(kind: EntityKind, mut tiers: Vec<TierDefinition>) -> CoreResult<Self> {
        if tiers.is_empty() {
            return Err(CoreError::EmptyCatalog {
                kind: kind.as_str().to_string(),
            });
        }

        tiers.sort_by_key(|t| t.level);

        for pair in tiers.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);

            if upper.level <= lower.level {
                return Err(CoreError::NonMonotonicLevels {
                    previous: lower.level,
                    level: upper.level,
                });
            }

            let threshold = if upper.min_orders < lower.min_orders {
                Some("min_orders")
            } else if upper.min_rating_hundredths < lower.min_rating_hundredths {
                Some("min_rating_hundredths")
            } else if upper.min_fulfillment_bps < lower.min_fulfillment_bps {
                Some("min_fulfillment_bps")
            } else if upper.min_revenue_cents < lower.min_revenue_cents {
                Some("min_revenue_cents")
            } else {
                None
            };

            if let Some(threshold) = threshold {
                return Err(CoreError::ThresholdRegression {
                    tier: upper.name.clone(),
                    level: upper.level,
                    threshold,
                });
            }
        }

        Ok(TierCatalog { kind, tiers })
    }

    /// Which entity kind this catalog applies to.
    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The lowest tier, which evaluation falls back to when no thresholds
    /// are met.
    pub fn base(&self) -> &TierDefinition {
        // Non-empty is a construction invariant
        &self.tiers[0]
    }

    /// All tiers, sorted by level ascending.
    pub fn tiers(&self) -> &[TierDefinition] {
        &self.tiers
    }

    /// Number of tiers in the catalog.
    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    /// Always false: an empty catalog cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    /// Looks up a tier by its level ordinal.
    pub fn by_level(&self, level: u32) -> CoreResult<&TierDefinition> {
        self.tiers
            .iter()
            .find(|t| t.level == level)
            .ok_or_else(|| CoreError::UnknownTier(format!("level {level}")))
    }

    /// Looks up a tier by name (case-insensitive).
    pub fn by_name(&self, name: &str) -> CoreResult<&TierDefinition> {
        self.tiers
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CoreError::UnknownTier(name.to_string()))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

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

    #[test]
    fn test_empty_catalog_rejected() {
        let err = TierCatalog::new(EntityKind::Vendor, vec![]).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCatalog { .. }));
    }

    #[test]
    fn test_unsorted_input_is_sorted() {
        let catalog = TierCatalog::new(
            EntityKind::Driver,
            vec![tier("Gold", 3, 200, 470), tier("Bronze", 1, 0, 0), tier("Silver", 2, 50, 450)],
        )
        .unwrap();

        let levels: Vec<u32> = catalog.tiers().iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert_eq!(catalog.base().name, "Bronze");
    }

    #[test]
    fn test_duplicate_levels_rejected() {
        let err = TierCatalog::new(
            EntityKind::Vendor,
            vec![tier("A", 1, 0, 0), tier("B", 1, 10, 0)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::NonMonotonicLevels { previous: 1, level: 1 }
        ));
    }

    #[test]
    fn test_threshold_regression_rejected() {
        // Level 2 demands fewer orders than level 1: ill-formed
        let err = TierCatalog::new(
            EntityKind::Vendor,
            vec![tier("A", 1, 50, 0), tier("B", 2, 10, 0)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ThresholdRegression { threshold: "min_orders", .. }
        ));
    }

    #[test]
    fn test_equal_thresholds_allowed() {
        // Non-decreasing, not strictly increasing: equal thresholds are fine
        let catalog = TierCatalog::new(
            EntityKind::Vendor,
            vec![tier("A", 1, 50, 400), tier("B", 2, 50, 450)],
        );
        assert!(catalog.is_ok());
    }

    #[test]
    fn test_lookups() {
        let catalog = TierCatalog::new(
            EntityKind::Driver,
            vec![tier("Bronze", 1, 0, 0), tier("Silver", 2, 50, 450)],
        )
        .unwrap();

        assert_eq!(catalog.by_level(2).unwrap().name, "Silver");
        assert_eq!(catalog.by_name("bronze").unwrap().level, 1);
        assert!(matches!(
            catalog.by_level(9).unwrap_err(),
            CoreError::UnknownTier(_)
        ));
        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_empty());
    }
}
