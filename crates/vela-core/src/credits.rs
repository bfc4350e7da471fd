//! # Credits Module
//!
//! Provides the `Credits` type for promotional credit balances.
//!
//! ## Why Integer Credits?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CREDITS ARE NOT MONEY, BUT THE SAME RULES APPLY                        │
//! │                                                                         │
//! │  Credits are a whole-unit promotional balance. Every grant, spend and  │
//! │  refund is an integer delta on an append-only ledger:                  │
//! │                                                                         │
//! │    grant(+200) ──► spend(-60) ──► refund(+60)                          │
//! │                                                                         │
//! │  balance == SUM(entries), always. A float balance would drift under    │
//! │  repeated arithmetic; an i64 never does.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vela_core::credits::Credits;
//!
//! let budget = Credits::new(200);
//! let spent = Credits::new(60);
//!
//! let remaining = budget - spent;
//! assert_eq!(remaining.amount(), 140);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Credits Type
// =============================================================================

/// A promotional credit amount.
///
/// ## Design Decisions
/// - **i64 (signed)**: Ledger entries carry signed deltas (spends are
///   negative); the same type works for balances and entries
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Credits(i64);

impl Credits {
    /// Creates a credit amount from whole units.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::credits::Credits;
    ///
    /// let grant = Credits::new(500);
    /// assert_eq!(grant.amount(), 500);
    /// ```
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Credits(amount)
    }

    /// Returns the raw credit amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Returns zero credits.
    #[inline]
    pub const fn zero() -> Self {
        Credits(0)
    }

    /// Checks if the amount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the amount is positive (greater than zero).
    ///
    /// Grants, spends, and refunds all require a positive requested amount;
    /// this is the predicate the ledger validates with.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the amount is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::credits::Credits;
    ///
    /// let spend_entry = Credits::new(-60);
    /// assert_eq!(spend_entry.abs().amount(), 60);
    /// ```
    #[inline]
    pub const fn abs(&self) -> Self {
        Credits(self.0.abs())
    }

    /// Returns the spend-entry form of this amount (negated).
    ///
    /// Ledger spend entries are recorded as negative deltas so that
    /// `SUM(amount)` over the log equals the balance.
    #[inline]
    pub const fn as_debit(&self) -> Self {
        Credits(-self.0)
    }

    /// Checks whether this balance can cover a requested spend.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::credits::Credits;
    ///
    /// let balance = Credits::new(100);
    /// assert!(balance.covers(Credits::new(60)));
    /// assert!(!balance.covers(Credits::new(101)));
    /// ```
    #[inline]
    pub const fn covers(&self, requested: Credits) -> bool {
        self.0 >= requested.0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows credits in a human-readable format.
///
/// ## Note
/// This is for debugging and logs. The handler layer formats balances
/// for end users.
impl fmt::Display for Credits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} cr", self.0)
    }
}

/// Default credits is zero.
impl Default for Credits {
    fn default() -> Self {
        Credits::zero()
    }
}

/// Addition of two credit amounts.
impl Add for Credits {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Credits(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Credits {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two credit amounts.
impl Sub for Credits {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Credits(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Credits {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (e.g. monthly grant × months).
impl Mul<i64> for Credits {
    type Output = Self;

    #[inline]
    fn mul(self, factor: i64) -> Self {
        Credits(self.0 * factor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
