//! # Entitlement Checker
//!
//! Decides whether a tier permits a count-limited action right now.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Entitlement Decision                                 │
//! │                                                                         │
//! │  can_perform(AddProduct, tier, usage)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  tier.limit_for(AddProduct)                                            │
//! │       │                                                                 │
//! │       ├── None (unlimited) ──────────────► Allowed                     │
//! │       │                                                                 │
//! │       └── Some(25)                                                     │
//! │              │                                                          │
//! │              ├── usage.used < 25 ────────► Allowed                     │
//! │              │                                                          │
//! │              └── usage.used >= 25 ───────► Denied(LimitReached)        │
//! │                                                                         │
//! │  Denied is a DECISION, not an error: the handler surfaces it to the    │
//! │  user as "upgrade your tier to list more products".                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Counting Discipline
//! This is a pure check. The caller increments the usage counter only
//! AFTER the guarded action actually succeeds, so failed attempts are
//! never counted. Callers that need the check and the increment to be one
//! atomic step under contention use the conditional-update path in
//! `vela-db` instead of check-then-write.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ActionKind, TierDefinition, UsageCounter};

// =============================================================================
// Decision
// =============================================================================

/// Why an action was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The tier's per-period limit for this action is exhausted.
    LimitReached {
        action: ActionKind,
        limit: i64,
        used: i64,
    },
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::LimitReached { action, limit, used } => {
                write!(f, "{action} limit reached: {used} of {limit} used this period")
            }
        }
    }
}

/// The outcome of an entitlement check.
///
/// Both variants are ordinary values - a `Denied` outcome is expected
/// business behaviour, never an `Err`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The action may proceed.
    Allowed,
    /// The action must not proceed; the reason is user-facing.
    Denied(DenyReason),
}

impl Decision {
    /// True when the action may proceed.
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

// =============================================================================
// Checking
// =============================================================================

/// Checks whether `tier` permits `action` given current period usage.
///
/// ## Rules
/// - Unlimited (`limit == None`): always allowed, regardless of usage
/// - Limited: denied once `usage.used >= limit`, allowed below it
///
/// Pure function; the switch over [`ActionKind`] inside
/// [`TierDefinition::limit_for`] is exhaustive, so adding a new limited
/// action is a compile error until its limit is defined.
///
/// ## Example
/// ```rust
/// use chrono::{DateTime, Utc};
/// use vela_core::entitlement::{can_perform, Decision};
/// use vela_core::types::{ActionKind, TierDefinition, UsageCounter};
///
/// # let tier = TierDefinition {
/// #     name: "Starter".into(), level: 1, min_orders: 0,
/// #     min_rating_hundredths: 0, min_fulfillment_bps: 0,
/// #     min_revenue_cents: 0, commission_bps: 1500, payout_days: 14,
/// #     monthly_credit_grant: 0, product_limit: Some(25),
/// #     promotion_limit: None, visibility_boost: 1,
/// # };
/// let mut usage = UsageCounter::empty("vnd-1", ActionKind::AddProduct, "2026-08",
///     DateTime::<Utc>::UNIX_EPOCH);
/// usage.used = 24;
/// assert!(can_perform(ActionKind::AddProduct, &tier, &usage).is_allowed());
///
/// usage.used = 25;
/// assert!(!can_perform(ActionKind::AddProduct, &tier, &usage).is_allowed());
/// ```
pub fn can_perform(action: ActionKind, tier: &TierDefinition, usage: &UsageCounter) -> Decision {
    match tier.limit_for(action) {
        None => Decision::Allowed,
        Some(limit) if usage.used < limit => Decision::Allowed,
        Some(limit) => Decision::Denied(DenyReason::LimitReached {
            action,
            limit,
            used: usage.used,
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn tier_with_limits(product: Option<i64>, promotion: Option<i64>) -> TierDefinition {
        TierDefinition {
            name: "Starter".into(),
            level: 1,
            min_orders: 0,
            min_rating_hundredths: 0,
            min_fulfillment_bps: 0,
            min_revenue_cents: 0,
            commission_bps: 1500,
            payout_days: 14,
            monthly_credit_grant: 0,
            product_limit: product,
            promotion_limit: promotion,
            visibility_boost: 1,
        }
    }

    fn usage(action: ActionKind, used: i64) -> UsageCounter {
        let mut counter =
            UsageCounter::empty("vnd-1", action, "2026-08", DateTime::<Utc>::UNIX_EPOCH);
        counter.used = used;
        counter
    }

    #[test]
    fn test_at_limit_denies() {
        let tier = tier_with_limits(Some(25), None);
        let decision = can_perform(
            ActionKind::AddProduct,
            &tier,
            &usage(ActionKind::AddProduct, 25),
        );
        assert_eq!(
            decision,
            Decision::Denied(DenyReason::LimitReached {
                action: ActionKind::AddProduct,
                limit: 25,
                used: 25,
            })
        );
    }

    #[test]
    fn test_below_limit_allows() {
        let tier = tier_with_limits(Some(25), None);
        let decision = can_perform(
            ActionKind::AddProduct,
            &tier,
            &usage(ActionKind::AddProduct, 24),
        );
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_unlimited_always_allows() {
        let tier = tier_with_limits(None, None);
        // Absurdly high usage: still allowed, limit is null
        let decision = can_perform(
            ActionKind::AddProduct,
            &tier,
            &usage(ActionKind::AddProduct, 1_000_000),
        );
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_over_limit_still_denies() {
        // Counter drifted past the limit (e.g. limit was lowered): deny
        let tier = tier_with_limits(Some(10), None);
        let decision = can_perform(
            ActionKind::AddProduct,
            &tier,
            &usage(ActionKind::AddProduct, 12),
        );
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_actions_use_their_own_limits() {
        let tier = tier_with_limits(Some(25), Some(2));
        assert!(can_perform(
            ActionKind::CreatePromotion,
            &tier,
            &usage(ActionKind::CreatePromotion, 1)
        )
        .is_allowed());
        assert!(!can_perform(
            ActionKind::CreatePromotion,
            &tier,
            &usage(ActionKind::CreatePromotion, 2)
        )
        .is_allowed());
    }

    #[test]
    fn test_deny_reason_is_user_facing() {
        let reason = DenyReason::LimitReached {
            action: ActionKind::CreatePromotion,
            limit: 5,
            used: 5,
        };
        assert_eq!(
            reason.to_string(),
            "create_promotion limit reached: 5 of 5 used this period"
        );
    }
}
