//! # vela-db: Database Layer for Vela Market
//!
//! This crate persists the Vela Market rules engine state. It uses SQLite
//! for storage with sqlx for async operations, and `vela-core` for all
//! business rules: SQL enforces the atomic preconditions, `vela-core`
//! decides the pure ones.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vela Market Data Flow                            │
//! │                                                                         │
//! │  Caller (API handler, worker, seed binary)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     vela-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (ledger.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ TierRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ LedgerRepo    │    │ 002_jobs.sql │  │   │
//! │  │   │ Management    │    │ CampaignRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │            │                                                    │   │
//! │  │            │  pure rules (catalog, evaluator, entitlement)     │   │
//! │  │            ▼                                                    │   │
//! │  │       vela-core                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (WAL mode)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (tier, ledger, campaign, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vela_db::{Database, DbConfig};
//! use vela_core::EntityKind;
//!
//! let db = Database::new(DbConfig::new("path/to/vela.db")).await?;
//!
//! // Evaluate a vendor's tier from live aggregates
//! let catalog = db.tiers().load_catalog(EntityKind::Vendor).await?;
//! let metrics = db.metrics().get_or_fresh("vnd-1", EntityKind::Vendor).await?;
//! let tier = catalog.evaluate(&metrics);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::campaign::{CampaignRepository, RefundOutcome};
pub use repository::job::DeliveryJobRepository;
pub use repository::ledger::CreditLedgerRepository;
pub use repository::metrics::MetricsRepository;
pub use repository::tier::TierRepository;
pub use repository::usage::UsageCounterRepository;
