//! # Repository Module
//!
//! Database repository implementations for Vela Market.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Each repository abstracts one table family behind a typed API.        │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │                                                                 │
//! │       │  db.ledger().spend("vnd-1", 50, "campaign_budget", None)       │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CreditLedgerRepository                                                │
//! │  ├── grant(&self, entity_id, amount, category)                         │
//! │  ├── spend(&self, entity_id, amount, category, reference)              │
//! │  ├── balance(&self, entity_id)                                         │
//! │  └── reconcile(&self, entity_id)                                       │
//! │       │                                                                 │
//! │       │  SQL (conditional UPDATEs carry the business invariants)       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Invariant checks live in the WHERE clause of the statement that       │
//! │  mutates, never in a separate read. rows_affected() == 0 means the     │
//! │  precondition failed and maps to a typed DbError.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`tier::TierRepository`] - Tier catalog seeding and loading
//! - [`metrics::MetricsRepository`] - Entity performance aggregates
//! - [`ledger::CreditLedgerRepository`] - Append-only credit ledger
//! - [`campaign::CampaignRepository`] - Campaign lifecycle and budgets
//! - [`usage::UsageCounterRepository`] - Per-period action counters
//! - [`job::DeliveryJobRepository`] - Delivery job claims

pub mod campaign;
pub mod job;
pub mod ledger;
pub mod metrics;
pub mod tier;
pub mod usage;
