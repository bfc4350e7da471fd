//! # Error Types
//!
//! Domain-specific error types for vela-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vela-core errors (this file)                                          │
//! │  └── CoreError        - Configuration and input errors                 │
//! │                                                                         │
//! │  vela-db errors (separate crate)                                       │
//! │  └── DbError          - Storage failures + contention outcomes         │
//! │      (InsufficientBalance, AlreadyClaimed, RefundAlreadyIssued, ...)   │
//! │                                                                         │
//! │  Flow: CoreError → DbError → handler layer → end user                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (entity ID, level, amount)
//! 3. Errors are enum variants, never String
//! 4. Configuration errors are fatal and operator-facing, never retried
//!
//! Note: `Denied` entitlement outcomes are NOT errors - they are ordinary
//! decision values. See [`crate::entitlement::Decision`].

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core rules-engine errors.
///
/// These errors represent a broken tier catalog (operator must fix it) or a
/// caller bug (bad input). None of them are retryable.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Tier catalog has no tiers at all.
    ///
    /// ## When This Occurs
    /// - Catalog table was never seeded
    /// - An administrator deleted every tier row
    ///
    /// This is fatal configuration: evaluation is meaningless without a
    /// base tier to fall back to.
    #[error("Tier catalog for {kind} is empty")]
    EmptyCatalog { kind: String },

    /// Tier levels are not strictly increasing.
    ///
    /// ## When This Occurs
    /// - Two tiers share the same level ordinal
    /// - Tiers were seeded out of order with a duplicated level
    #[error("Tier catalog levels must be strictly increasing: level {level} after level {previous}")]
    NonMonotonicLevels { previous: u32, level: u32 },

    /// A higher tier has a lower threshold than the tier below it.
    ///
    /// ## When This Occurs
    /// - An administrator edits one tier without adjusting its neighbours
    ///
    /// Thresholds must be monotonically non-decreasing with level, otherwise
    /// "highest qualifying tier wins" stops being well-defined.
    #[error("Tier '{tier}' (level {level}) lowers threshold '{threshold}' below the tier beneath it")]
    ThresholdRegression {
        tier: String,
        level: u32,
        threshold: &'static str,
    },

    /// A grant, spend, or refund was requested with a non-positive amount.
    ///
    /// ## When This Occurs
    /// - Caller bug: zero or negative credit amounts are never valid input
    #[error("Credit amount must be positive, got {amount}")]
    InvalidAmount { amount: i64 },

    /// A tier referenced by name or level does not exist in the catalog.
    #[error("Unknown tier: {0}")]
    UnknownTier(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::EmptyCatalog {
            kind: "vendor".to_string(),
        };
        assert_eq!(err.to_string(), "Tier catalog for vendor is empty");

        let err = CoreError::InvalidAmount { amount: -50 };
        assert_eq!(err.to_string(), "Credit amount must be positive, got -50");
    }

    #[test]
    fn test_threshold_regression_message_names_the_tier() {
        let err = CoreError::ThresholdRegression {
            tier: "Gold".to_string(),
            level: 3,
            threshold: "min_orders",
        };
        let msg = err.to_string();
        assert!(msg.contains("Gold"));
        assert!(msg.contains("min_orders"));
    }

    #[test]
    fn test_non_monotonic_levels_message() {
        let err = CoreError::NonMonotonicLevels {
            previous: 2,
            level: 2,
        };
        assert_eq!(
            err.to_string(),
            "Tier catalog levels must be strictly increasing: level 2 after level 2"
        );
    }
}
