//! # Domain Types
//!
//! Core domain types used throughout Vela Market.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ TierDefinition  │   │  EntityMetrics  │   │   LedgerEntry   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name, level    │   │  total_orders   │   │  amount (±)     │       │
//! │  │  thresholds     │   │  rating sums    │   │  entry_type     │       │
//! │  │  benefits       │   │  revenue_cents  │   │  seq (ordered)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CommissionRate  │   │    Campaign     │   │   DeliveryJob   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  budget/used    │   │  Pending        │       │
//! │  │  800 = 8.00%    │   │  refund_issued  │   │  Claimed        │       │
//! │  └─────────────────┘   │  Active/Paused  │   │  Completed      │       │
//! │                        │  /Deleted       │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Floating Point In Rule Math
//! Ratings are stored in hundredths (450 = 4.50 stars), fulfillment rates
//! and commission in basis points (9500 = 95.00%), revenue in cents. Every
//! threshold comparison is integer-exact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::credits::Credits;

// =============================================================================
// Commission Rate
// =============================================================================

/// Commission rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8.00% (a typical mid-tier marketplace commission)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionRate(u32);

impl CommissionRate {
    /// Creates a commission rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        CommissionRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Computes the commission owed on an order amount, in cents.
    ///
    /// ## Implementation
    /// Integer math with rounding: `(amount * bps + 5000) / 10000`.
    /// i128 intermediate prevents overflow on large order values.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::types::CommissionRate;
    ///
    /// let rate = CommissionRate::from_bps(800); // 8.00%
    /// assert_eq!(rate.commission_on(10_000), 800); // $100.00 → $8.00
    /// ```
    pub fn commission_on(&self, amount_cents: i64) -> i64 {
        ((amount_cents as i128 * self.0 as i128 + 5000) / 10000) as i64
    }

    /// Zero commission.
    #[inline]
    pub const fn zero() -> Self {
        CommissionRate(0)
    }
}

impl Default for CommissionRate {
    fn default() -> Self {
        CommissionRate::zero()
    }
}

// =============================================================================
// Entity Kind
// =============================================================================

/// The kind of marketplace participant a tier catalog applies to.
///
/// Vendors and drivers have separate catalogs with different thresholds;
/// the evaluation algorithm is identical for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A merchant selling products on the marketplace.
    Vendor,
    /// A delivery driver claiming and fulfilling jobs.
    Driver,
}

impl EntityKind {
    /// Returns the lowercase string form used in storage and logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Vendor => "vendor",
            EntityKind::Driver => "driver",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tier Definition
// =============================================================================

/// A single tier in a catalog: the thresholds an entity must meet and the
/// benefits it receives once it does.
///
/// ## Cumulative, Not Exclusive
/// Tiers are cumulative bands: an entity that qualifies for level 3 also
/// qualifies for levels 1 and 2. The evaluator always assigns the highest
/// qualifying level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TierDefinition {
    /// Display name (e.g. "Starter", "Growth", "Pro", "Elite").
    pub name: String,

    /// Ordinal level. Strictly increasing within a catalog.
    pub level: u32,

    /// Minimum completed orders (vendors) or deliveries (drivers).
    pub min_orders: i64,

    /// Minimum average rating, in hundredths (450 = 4.50 stars).
    pub min_rating_hundredths: u32,

    /// Minimum fulfillment / on-time rate, in basis points (9500 = 95%).
    pub min_fulfillment_bps: u32,

    /// Minimum lifetime revenue (vendors) or earnings (drivers), in cents.
    pub min_revenue_cents: i64,

    /// Commission the marketplace takes at this tier, in basis points.
    pub commission_bps: u32,

    /// Days until earnings are paid out at this tier.
    pub payout_days: u32,

    /// Promotional credits granted each month at this tier.
    pub monthly_credit_grant: i64,

    /// Maximum products listed per period. `None` = unlimited.
    pub product_limit: Option<i64>,

    /// Maximum promotions created per period. `None` = unlimited.
    pub promotion_limit: Option<i64>,

    /// Search-ranking boost weight applied to this tier's listings.
    pub visibility_boost: u32,
}

impl TierDefinition {
    /// Checks whether the given metrics satisfy every threshold of this tier.
    ///
    /// ## Example
    /// ```rust
    /// use vela_core::types::{EntityKind, EntityMetrics, TierDefinition};
    ///
    /// let tier = TierDefinition {
    ///     name: "Silver".into(),
    ///     level: 2,
    ///     min_orders: 50,
    ///     min_rating_hundredths: 450,
    ///     min_fulfillment_bps: 0,
    ///     min_revenue_cents: 0,
    ///     commission_bps: 1200,
    ///     payout_days: 7,
    ///     monthly_credit_grant: 100,
    ///     product_limit: None,
    ///     promotion_limit: Some(5),
    ///     visibility_boost: 2,
    /// };
    ///
    /// let metrics = EntityMetrics::sample("drv-1", EntityKind::Driver, 60, 460, 9800, 0);
    /// assert!(tier.meets_thresholds(&metrics));
    /// ```
    pub fn meets_thresholds(&self, metrics: &EntityMetrics) -> bool {
        metrics.total_orders >= self.min_orders
            && metrics.rating_hundredths() >= self.min_rating_hundredths
            && metrics.fulfillment_bps() >= self.min_fulfillment_bps
            && metrics.revenue_cents >= self.min_revenue_cents
    }

    /// Returns the per-period limit for a counted action.
    ///
    /// `None` means the action is unlimited at this tier.
    pub fn limit_for(&self, action: ActionKind) -> Option<i64> {
        match action {
            ActionKind::AddProduct => self.product_limit,
            ActionKind::CreatePromotion => self.promotion_limit,
        }
    }

    /// Returns the commission rate at this tier.
    #[inline]
    pub fn commission(&self) -> CommissionRate {
        CommissionRate::from_bps(self.commission_bps)
    }

    /// Returns the monthly credit grant at this tier.
    #[inline]
    pub fn monthly_grant(&self) -> Credits {
        Credits::new(self.monthly_credit_grant)
    }
}

// =============================================================================
// Entity Metrics
// =============================================================================

/// Rolling performance aggregates for a vendor or driver.
///
/// ## Delta-Friendly Sums
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                    Metrics Update Strategy                              │
/// │                                                                         │
/// │  ❌ WRONG: store averages, rewrite them on every completion            │
/// │     avg_rating = (avg_rating * n + new) / (n + 1)   ← race-prone       │
/// │                                                                         │
/// │  ✅ CORRECT: store sums, derive averages on read                       │
/// │     rating_sum += new; total_orders += 1            ← pure delta       │
/// │                                                                         │
/// │  Deltas commute, so concurrent completion events never clobber         │
/// │  each other's writes.                                                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Metrics are produced by order/delivery completion events and are
/// read-only input to tier evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EntityMetrics {
    /// The vendor or driver these aggregates belong to.
    pub entity_id: String,

    /// Which catalog applies to this entity.
    pub kind: EntityKind,

    /// Completed orders (vendors) or deliveries (drivers).
    pub total_orders: i64,

    /// Sum of all ratings received, in hundredths.
    pub rating_sum_hundredths: i64,

    /// Completions that were fulfilled / on time.
    pub fulfilled_count: i64,

    /// Lifetime revenue or earnings, in cents.
    pub revenue_cents: i64,

    /// When these aggregates last changed.
    pub updated_at: DateTime<Utc>,
}

impl EntityMetrics {
    /// A brand-new entity with no history.
    ///
    /// Lands on the base tier: zero orders means zero rating and zero
    /// fulfillment, and base-tier thresholds are zero.
    pub fn fresh(entity_id: impl Into<String>, kind: EntityKind, now: DateTime<Utc>) -> Self {
        EntityMetrics {
            entity_id: entity_id.into(),
            kind,
            total_orders: 0,
            rating_sum_hundredths: 0,
            fulfilled_count: 0,
            revenue_cents: 0,
            updated_at: now,
        }
    }

    /// Builds metrics from already-averaged numbers. Test and doc helper.
    ///
    /// The fulfilled count is a whole number, so `fulfillment_bps` is
    /// realized as the nearest representable rate for `total_orders`
    /// (e.g. 9800 bps over 60 orders rounds to 59 fulfilled = 9833 bps).
    /// Exact round trips need `bps * orders` divisible by 10 000.
    ///
    /// ## Arguments
    /// * `avg_rating_hundredths` - e.g. 460 for 4.60 stars
    /// * `fulfillment_bps` - e.g. 9800 for 98%
    pub fn sample(
        entity_id: impl Into<String>,
        kind: EntityKind,
        total_orders: i64,
        avg_rating_hundredths: i64,
        fulfillment_bps: i64,
        revenue_cents: i64,
    ) -> Self {
        EntityMetrics {
            entity_id: entity_id.into(),
            kind,
            total_orders,
            rating_sum_hundredths: avg_rating_hundredths * total_orders,
            fulfilled_count: (fulfillment_bps * total_orders + 5_000) / 10_000,
            revenue_cents,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Average rating in hundredths (450 = 4.50 stars). Zero with no orders.
    pub fn rating_hundredths(&self) -> u32 {
        if self.total_orders <= 0 {
            return 0;
        }
        (self.rating_sum_hundredths / self.total_orders).max(0) as u32
    }

    /// Fulfillment rate in basis points. Zero with no orders.
    pub fn fulfillment_bps(&self) -> u32 {
        if self.total_orders <= 0 {
            return 0;
        }
        ((self.fulfilled_count * 10_000) / self.total_orders)
            .clamp(0, crate::FULL_RATE_BPS as i64) as u32
    }
}

// =============================================================================
// Action Kind
// =============================================================================

/// A count-limited action guarded by the entitlement checker.
///
/// ## Why A Closed Enum?
/// The source of these rules carried action names as bare strings. A closed
/// enum makes the entitlement switch exhaustive: adding a new limited action
/// is a compile error until every decision site handles it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// List a new product.
    AddProduct,
    /// Create a new promotion.
    CreatePromotion,
}

impl ActionKind {
    /// Returns the lowercase string form used in storage and logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ActionKind::AddProduct => "add_product",
            ActionKind::CreatePromotion => "create_promotion",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Usage Counter
// =============================================================================

/// Per-entity, per-period count of a limited action.
///
/// Periods are calendar months keyed as `YYYY-MM`; a new period keys a new
/// row, so counters "reset" without any write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct UsageCounter {
    /// The vendor or driver this counter belongs to.
    pub entity_id: String,

    /// Which action is being counted.
    pub action: ActionKind,

    /// Period key, e.g. "2026-08".
    pub period: String,

    /// Times the action succeeded this period.
    pub used: i64,

    /// When the counter last changed.
    pub updated_at: DateTime<Utc>,
}

impl UsageCounter {
    /// A zeroed counter for an entity/action/period that has no row yet.
    pub fn empty(
        entity_id: impl Into<String>,
        action: ActionKind,
        period: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        UsageCounter {
            entity_id: entity_id.into(),
            action,
            period: period.into(),
            used: 0,
            updated_at: now,
        }
    }
}

/// Formats the usage period key for a point in time.
///
/// Pure function of the given instant; callers supply the clock.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use vela_core::types::period_key;
///
/// let at = Utc.with_ymd_and_hms(2026, 8, 31, 12, 0, 0).unwrap();
/// assert_eq!(period_key(at), "2026-08");
/// ```
pub fn period_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

// =============================================================================
// Credit Ledger Entry
// =============================================================================

/// The type of a credit ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Credits added (monthly tier grant, admin top-up).
    Grant,
    /// Credits consumed (campaign budget, boost purchase). Negative amount.
    Spend,
    /// Credits returned (unused campaign budget).
    Refund,
}

impl EntryType {
    /// Returns the lowercase string form used in storage and logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            EntryType::Grant => "grant",
            EntryType::Spend => "spend",
            EntryType::Refund => "refund",
        }
    }
}

/// One immutable row in the append-only credit ledger.
///
/// ## Invariants
/// - Entries are never updated or deleted once written
/// - `SUM(amount)` over an entity's entries equals its balance
/// - `seq` is strictly increasing per entity (assigned by storage), so
///   balance-as-of queries are deterministic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The vendor or driver this entry belongs to.
    pub entity_id: String,

    /// Signed credit delta: positive for grant/refund, negative for spend.
    pub amount: i64,

    /// What kind of movement this is.
    pub entry_type: EntryType,

    /// Free-form category for reporting (e.g. "monthly_grant",
    /// "campaign_budget", "campaign_refund").
    pub category: String,

    /// Stable caller-supplied reference (e.g. campaign ID) so a
    /// reconciliation job can detect double refunds. The ledger itself
    /// never deduplicates on it.
    pub reference_id: Option<String>,

    /// Monotonic sequence number assigned by storage.
    pub seq: i64,

    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the signed amount as a credit value.
    #[inline]
    pub fn credits(&self) -> Credits {
        Credits::new(self.amount)
    }
}

// =============================================================================
// Campaign
// =============================================================================

/// The promotional activity a campaign funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CampaignKind {
    /// Boost a single product in search results.
    ProductBoost,
    /// Feature the whole storefront on category pages.
    StorefrontFeature,
    /// A sponsored slot in the marketplace feed.
    SponsoredListing,
}

impl CampaignKind {
    /// Returns the lowercase string form used in storage and logs.
    pub const fn as_str(&self) -> &'static str {
        match self {
            CampaignKind::ProductBoost => "product_boost",
            CampaignKind::StorefrontFeature => "storefront_feature",
            CampaignKind::SponsoredListing => "sponsored_listing",
        }
    }
}

/// The lifecycle state of a campaign.
///
/// ```text
/// created ──► Active ◄──────► Paused
///                │               │
///                └──► Deleted ◄──┘   (terminal, refund issued once)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    /// Running: triggers consume budget.
    Active,
    /// Suspended: unused budget refunded, may be resumed.
    Paused,
    /// Terminal: no transitions out.
    Deleted,
}

/// A budgeted promotional activity funded from the credit ledger.
///
/// ## Invariants
/// - `credits_used <= credit_budget`
/// - Pausing or deleting refunds `credit_budget - credits_used` exactly
///   once, guarded by `refund_issued`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Campaign {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The vendor or driver funding this campaign.
    pub entity_id: String,

    /// What the campaign promotes.
    pub kind: CampaignKind,

    /// Credits reserved from the ledger at creation.
    pub credit_budget: i64,

    /// Credits consumed by triggers so far.
    pub credits_used: i64,

    /// Lifecycle state.
    pub status: CampaignStatus,

    /// Whether the one-time unused-budget refund has been issued.
    pub refund_issued: bool,

    /// How many times the campaign has fired (impression/click events).
    pub trigger_count: i64,

    /// When the campaign was created.
    pub created_at: DateTime<Utc>,

    /// When the campaign last changed.
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Credits still available for triggers.
    #[inline]
    pub fn remaining_budget(&self) -> Credits {
        Credits::new(self.credit_budget - self.credits_used)
    }

    /// Whether triggers may still consume budget.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

// =============================================================================
// Delivery Job
// =============================================================================

/// The lifecycle state of a delivery job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Unassigned, open for claiming.
    Pending,
    /// Claimed by exactly one driver.
    Claimed,
    /// Delivered; feeds the driver's metrics.
    Completed,
    /// Withdrawn before completion.
    Cancelled,
}

/// A delivery job that drivers race to claim.
///
/// ## Claim Discipline
/// A claim is a single conditional update
/// (`WHERE status = 'pending' AND driver_id IS NULL`): exactly one
/// concurrent claimant wins, the rest observe zero rows affected and report
/// "job no longer available".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct DeliveryJob {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The order this delivery fulfills.
    pub order_id: String,

    /// Lifecycle state.
    pub status: JobStatus,

    /// The winning claimant, once claimed.
    pub driver_id: Option<String>,

    /// Driver payout for completing this job, in cents.
    pub payout_cents: i64,

    /// When the job was posted.
    pub created_at: DateTime<Utc>,

    /// When the job was claimed.
    pub claimed_at: Option<DateTime<Utc>>,

    /// When the job was completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl DeliveryJob {
    /// Whether the job is still open for claiming.
    #[inline]
    pub fn is_claimable(&self) -> bool {
        self.status == JobStatus::Pending && self.driver_id.is_none()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commission_on() {
        let rate = CommissionRate::from_bps(800); // 8.00%
        assert_eq!(rate.commission_on(10_000), 800);

        // 8.25% of $10.99 = 90.67 cents → rounds to 91
        let rate = CommissionRate::from_bps(825);
        assert_eq!(rate.commission_on(1099), 91);

        assert_eq!(CommissionRate::zero().commission_on(10_000), 0);
    }

    #[test]
    fn test_metrics_derived_averages() {
        let mut metrics =
            EntityMetrics::fresh("vnd-1", EntityKind::Vendor, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(metrics.rating_hundredths(), 0);
        assert_eq!(metrics.fulfillment_bps(), 0);

        // Two orders: ratings 5.00 and 4.00, one fulfilled on time
        metrics.total_orders = 2;
        metrics.rating_sum_hundredths = 500 + 400;
        metrics.fulfilled_count = 1;

        assert_eq!(metrics.rating_hundredths(), 450);
        assert_eq!(metrics.fulfillment_bps(), 5000);
    }

    #[test]
    fn test_metrics_sample_round_trips_representable_averages() {
        // 9800 bps over 50 orders is exactly 49 fulfilled
        let metrics = EntityMetrics::sample("drv-1", EntityKind::Driver, 50, 460, 9800, 250_000);
        assert_eq!(metrics.rating_hundredths(), 460);
        assert_eq!(metrics.fulfilled_count, 49);
        assert_eq!(metrics.fulfillment_bps(), 9800);
        assert_eq!(metrics.total_orders, 50);
    }

    #[test]
    fn test_metrics_sample_rounds_to_nearest_representable_rate() {
        // 9800 bps over 60 orders would need 58.8 fulfilled; nearest whole
        // count is 59, which reads back as 9833 bps
        let metrics = EntityMetrics::sample("drv-1", EntityKind::Driver, 60, 460, 9800, 0);
        assert_eq!(metrics.fulfilled_count, 59);
        assert_eq!(metrics.fulfillment_bps(), 9833);
    }

    #[test]
    fn test_meets_thresholds() {
        let tier = TierDefinition {
            name: "Silver".into(),
            level: 2,
            min_orders: 50,
            min_rating_hundredths: 450,
            min_fulfillment_bps: 9000,
            min_revenue_cents: 0,
            commission_bps: 1200,
            payout_days: 7,
            monthly_credit_grant: 100,
            product_limit: Some(100),
            promotion_limit: Some(5),
            visibility_boost: 2,
        };

        let qualifies = EntityMetrics::sample("d1", EntityKind::Driver, 60, 460, 9800, 0);
        assert!(tier.meets_thresholds(&qualifies));

        let low_rating = EntityMetrics::sample("d2", EntityKind::Driver, 60, 400, 9800, 0);
        assert!(!tier.meets_thresholds(&low_rating));

        let too_few = EntityMetrics::sample("d3", EntityKind::Driver, 40, 480, 9800, 0);
        assert!(!tier.meets_thresholds(&too_few));
    }

    #[test]
    fn test_limit_for_is_exhaustive_over_actions() {
        let tier = TierDefinition {
            name: "Starter".into(),
            level: 1,
            min_orders: 0,
            min_rating_hundredths: 0,
            min_fulfillment_bps: 0,
            min_revenue_cents: 0,
            commission_bps: 1500,
            payout_days: 14,
            monthly_credit_grant: 0,
            product_limit: Some(25),
            promotion_limit: None,
            visibility_boost: 1,
        };

        assert_eq!(tier.limit_for(ActionKind::AddProduct), Some(25));
        assert_eq!(tier.limit_for(ActionKind::CreatePromotion), None);
    }

    #[test]
    fn test_period_key_format() {
        use chrono::TimeZone;
        let at = Utc.with_ymd_and_hms(2026, 1, 5, 23, 59, 0).unwrap();
        assert_eq!(period_key(at), "2026-01");
    }

    #[test]
    fn test_campaign_remaining_budget() {
        let campaign = Campaign {
            id: "cmp-1".into(),
            entity_id: "vnd-1".into(),
            kind: CampaignKind::ProductBoost,
            credit_budget: 50,
            credits_used: 12,
            status: CampaignStatus::Active,
            refund_issued: false,
            trigger_count: 12,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        assert_eq!(campaign.remaining_budget().amount(), 38);
        assert!(campaign.is_active());
    }

    #[test]
    fn test_job_claimable() {
        let mut job = DeliveryJob {
            id: "job-1".into(),
            order_id: "ord-1".into(),
            status: JobStatus::Pending,
            driver_id: None,
            payout_cents: 750,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            claimed_at: None,
            completed_at: None,
        };
        assert!(job.is_claimable());

        job.status = JobStatus::Claimed;
        job.driver_id = Some("drv-1".into());
        assert!(!job.is_claimable());
    }

    #[test]
    fn test_enum_storage_names() {
        assert_eq!(ActionKind::AddProduct.as_str(), "add_product");
        assert_eq!(EntryType::Refund.as_str(), "refund");
        assert_eq!(CampaignKind::SponsoredListing.as_str(), "sponsored_listing");
        assert_eq!(EntityKind::Driver.as_str(), "driver");
    }
}
