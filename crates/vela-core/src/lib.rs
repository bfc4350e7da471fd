//! # vela-core: Pure Rules Engine for Vela Market
//!
//! This crate is the **heart** of Vela Market. It contains the tiered
//! marketplace rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Vela Market Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Request Handlers (out of scope)                │   │
//! │  │   add_product, create_campaign, claim_job, spend_credits        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ vela-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  catalog  │  │ evaluator │  │entitlement│  │  credits  │  │   │
//! │  │   │TierCatalog│  │ evaluate  │  │ Decision  │  │  Credits  │  │   │
//! │  │   │ validated │  │ highest   │  │ Allowed/  │  │  integer  │  │   │
//! │  │   │  tiers    │  │qualifying │  │ Denied    │  │  deltas   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  vela-db (Persistence Layer)                    │   │
//! │  │     Ledger, campaigns, usage counters, job claims - every      │   │
//! │  │     read-then-write is one atomic conditional UPDATE           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (TierDefinition, EntityMetrics, Campaign, etc.)
//! - [`credits`] - Credits type with integer arithmetic (no floating point!)
//! - [`catalog`] - Validated tier catalogs (single source of truth for benefits)
//! - [`evaluator`] - Pure tier evaluation
//! - [`entitlement`] - Allow/deny decisions for count-limited actions
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every decision is deterministic - same input = same output
//! 2. **No I/O**: Database, network, clock access is FORBIDDEN here
//! 3. **Integer Rule Math**: Ratings in hundredths, rates in basis points,
//!    money in cents - threshold comparisons are exact
//! 4. **Explicit Errors**: Configuration and input errors are typed;
//!    denials and contention outcomes are values, not errors
//!
//! ## Example Usage
//!
//! ```rust
//! use vela_core::catalog::TierCatalog;
//! use vela_core::entitlement::{can_perform, Decision};
//! use vela_core::types::{ActionKind, EntityKind, EntityMetrics, TierDefinition, UsageCounter};
//!
//! # fn tier(name: &str, level: u32, min_orders: i64) -> TierDefinition {
//! #     TierDefinition {
//! #         name: name.into(), level, min_orders, min_rating_hundredths: 0,
//! #         min_fulfillment_bps: 0, min_revenue_cents: 0, commission_bps: 1500,
//! #         payout_days: 14, monthly_credit_grant: 0, product_limit: Some(25),
//! #         promotion_limit: None, visibility_boost: 1,
//! #     }
//! # }
//! let catalog = TierCatalog::new(
//!     EntityKind::Vendor,
//!     vec![tier("Starter", 1, 0), tier("Growth", 2, 50)],
//! )?;
//!
//! // Tier is a pure function of current metrics and the catalog
//! let metrics = EntityMetrics::sample("vnd-1", EntityKind::Vendor, 60, 480, 9800, 500_000);
//! let tier = catalog.evaluate(&metrics);
//! assert_eq!(tier.name, "Growth");
//!
//! // Entitlement is a pure decision over tier + usage
//! let usage = UsageCounter::empty("vnd-1", ActionKind::AddProduct, "2026-08",
//!     chrono::DateTime::<chrono::Utc>::UNIX_EPOCH);
//! assert!(can_perform(ActionKind::AddProduct, tier, &usage).is_allowed());
//! # Ok::<(), vela_core::CoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod credits;
pub mod entitlement;
pub mod error;
pub mod evaluator;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use vela_core::TierCatalog` instead of
// `use vela_core::catalog::TierCatalog`

pub use catalog::TierCatalog;
pub use credits::Credits;
pub use entitlement::{can_perform, Decision, DenyReason};
pub use error::{CoreError, CoreResult};
pub use evaluator::evaluate;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum rating, in hundredths (a 5-star scale).
///
/// ## Why a constant?
/// Metrics writers clamp incoming ratings to this bound so a buggy event
/// producer cannot inflate an average past the scale.
pub const MAX_RATING_HUNDREDTHS: u32 = 500;

/// One hundred percent, in basis points.
///
/// Fulfillment rates and commission rates never exceed this.
pub const FULL_RATE_BPS: u32 = 10_000;
