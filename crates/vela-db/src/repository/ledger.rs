//! # Credit Ledger Repository
//!
//! Append-only credit ledger with an atomically-maintained balance cache.
//!
//! ## Spend Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How A Spend Commits                                  │
//! │                                                                         │
//! │  ❌ WRONG: read balance, compare in Rust, then write                    │
//! │     let bal = read();                                                  │
//! │     if bal >= 60 { write(bal - 60) }   ← two spends both pass check    │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional UPDATE carries the precondition           │
//! │     UPDATE credit_balances                                             │
//! │     SET balance = balance - 60                                         │
//! │     WHERE entity_id = ? AND balance >= 60                              │
//! │                                                                         │
//! │  Two concurrent spend(60) calls against balance 100:                   │
//! │     spend A: 1 row affected  → entry appended, Ok                      │
//! │     spend B: 0 rows affected → InsufficientBalance, nothing written    │
//! │     final balance: 40, never negative                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Source Of Truth
//! The entry log is authoritative: `balance() == SUM(amount)` at every
//! point. `credit_balances` is a cache the conditional updates ride on;
//! [`CreditLedgerRepository::reconcile`] recomputes and repairs it.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use vela_core::{CoreError, Credits, EntryType, LedgerEntry};

/// Repository for credit ledger operations.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.ledger();
///
/// ledger.grant("vnd-1", 200, "monthly_grant").await?;
/// ledger.spend("vnd-1", 60, "campaign_budget", Some("cmp-1")).await?;
/// assert_eq!(ledger.balance("vnd-1").await?, 140);
/// ```
#[derive(Debug, Clone)]
pub struct CreditLedgerRepository {
    pool: SqlitePool,
}

impl CreditLedgerRepository {
    /// Creates a new CreditLedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditLedgerRepository { pool }
    }

    /// Grants credits to an entity.
    ///
    /// Appends a positive entry and credits the balance cache in one
    /// transaction.
    ///
    /// ## Errors
    /// * `CoreError::InvalidAmount` - `amount <= 0` (caller bug)
    pub async fn grant(
        &self,
        entity_id: &str,
        amount: i64,
        category: &str,
    ) -> DbResult<LedgerEntry> {
        debug!(entity_id = %entity_id, amount = %amount, category = %category, "Granting credits");

        let mut tx = self.pool.begin().await?;
        let entry =
            credit_in_tx(&mut tx, entity_id, amount, EntryType::Grant, category, None).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Spends credits, failing if the balance cannot cover the amount.
    ///
    /// The balance check and the entry append are atomic with respect to
    /// concurrent spends on the same entity: the precondition rides on a
    /// single conditional UPDATE, and the losing racer writes nothing.
    ///
    /// ## Errors
    /// * `CoreError::InvalidAmount` - `amount <= 0` (caller bug)
    /// * `DbError::InsufficientBalance` - expected outcome, surfaced to the
    ///   user as "not enough credits"; never retried internally
    pub async fn spend(
        &self,
        entity_id: &str,
        amount: i64,
        category: &str,
        reference_id: Option<&str>,
    ) -> DbResult<LedgerEntry> {
        debug!(entity_id = %entity_id, amount = %amount, category = %category, "Spending credits");

        let mut tx = self.pool.begin().await?;
        let entry = debit_in_tx(&mut tx, entity_id, amount, category, reference_id).await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Refunds credits to an entity.
    ///
    /// Appends a positive entry. The ledger does NOT deduplicate by
    /// `reference_id`; callers pass a stable reference (e.g. the campaign
    /// ID) so a reconciliation job can detect double refunds. Guards that
    /// must refund exactly once (campaign pause/delete) live upstream.
    ///
    /// ## Errors
    /// * `CoreError::InvalidAmount` - `amount <= 0` (caller bug)
    pub async fn refund(
        &self,
        entity_id: &str,
        amount: i64,
        category: &str,
        reference_id: &str,
    ) -> DbResult<LedgerEntry> {
        debug!(entity_id = %entity_id, amount = %amount, reference_id = %reference_id, "Refunding credits");

        let mut tx = self.pool.begin().await?;
        let entry = credit_in_tx(
            &mut tx,
            entity_id,
            amount,
            EntryType::Refund,
            category,
            Some(reference_id),
        )
        .await?;
        tx.commit().await?;

        Ok(entry)
    }

    /// Authoritative balance: the sum of all ledger entries for an entity.
    ///
    /// Always recomputable from the log; the cache is an optimization.
    pub async fn balance(&self, entity_id: &str) -> DbResult<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM credit_ledger WHERE entity_id = ?1",
        )
        .bind(entity_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum)
    }

    /// Balance as of a ledger sequence number (inclusive).
    ///
    /// Deterministic because entries for an entity are strictly ordered
    /// by `seq`. No ordering exists across entities.
    pub async fn balance_as_of(&self, entity_id: &str, seq: i64) -> DbResult<i64> {
        let sum: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0) FROM credit_ledger WHERE entity_id = ?1 AND seq <= ?2",
        )
        .bind(entity_id)
        .bind(seq)
        .fetch_one(&self.pool)
        .await?;

        Ok(sum)
    }

    /// The cached balance the conditional updates ride on.
    ///
    /// Zero for entities with no cache row yet.
    pub async fn cached_balance(&self, entity_id: &str) -> DbResult<i64> {
        let cached: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM credit_balances WHERE entity_id = ?1")
                .bind(entity_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(cached.unwrap_or(0))
    }

    /// All entries for an entity, ordered by sequence.
    pub async fn entries_for(&self, entity_id: &str) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, entity_id, amount, entry_type, category, reference_id, seq, created_at
            FROM credit_ledger
            WHERE entity_id = ?1
            ORDER BY seq
            "#,
        )
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Recomputes the balance from the entry log and repairs the cache.
    ///
    /// ## Returns
    /// * `Ok(true)` - drift was found and repaired
    /// * `Ok(false)` - cache already matched the log
    pub async fn reconcile(&self, entity_id: &str) -> DbResult<bool> {
        let authoritative = self.balance(entity_id).await?;
        let cached = self.cached_balance(entity_id).await?;

        if authoritative == cached {
            return Ok(false);
        }

        warn!(
            entity_id = %entity_id,
            cached = %cached,
            authoritative = %authoritative,
            "Balance cache drift detected, repairing"
        );

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO credit_balances (entity_id, balance, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(entity_id) DO UPDATE SET
                balance = excluded.balance,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(entity_id)
        .bind(authoritative)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(true)
    }
}

// =============================================================================
// Transaction-Scoped Primitives
// =============================================================================
// Shared with the campaign repository so "spend budget + insert campaign"
// and "flip refund flag + append refund entry" each commit as one unit.

/// Appends a positive entry (grant or refund) and credits the balance cache.
///
/// Caller owns the transaction; nothing is visible until it commits.
pub(crate) async fn credit_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    entity_id: &str,
    amount: i64,
    entry_type: EntryType,
    category: &str,
    reference_id: Option<&str>,
) -> DbResult<LedgerEntry> {
    if !Credits::new(amount).is_positive() {
        return Err(CoreError::InvalidAmount { amount }.into());
    }

    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO credit_balances (entity_id, balance, updated_at)
        VALUES (?1, ?2, ?3)
        ON CONFLICT(entity_id) DO UPDATE SET
            balance = balance + excluded.balance,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(entity_id)
    .bind(amount)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    insert_entry(tx, entity_id, amount, entry_type, category, reference_id).await
}

/// Conditionally debits the balance cache and appends a negative entry.
///
/// The precondition (`balance >= amount`) is carried by the UPDATE itself;
/// zero rows affected means this spend lost to the balance (or to a
/// concurrent spend) and nothing is written.
pub(crate) async fn debit_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    entity_id: &str,
    amount: i64,
    category: &str,
    reference_id: Option<&str>,
) -> DbResult<LedgerEntry> {
    if !Credits::new(amount).is_positive() {
        return Err(CoreError::InvalidAmount { amount }.into());
    }

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE credit_balances
        SET balance = balance - ?2, updated_at = ?3
        WHERE entity_id = ?1 AND balance >= ?2
        "#,
    )
    .bind(entity_id)
    .bind(amount)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        // Report the balance the caller lost to; entities with no cache
        // row at all simply have a zero balance
        let balance: Option<i64> =
            sqlx::query_scalar("SELECT balance FROM credit_balances WHERE entity_id = ?1")
                .bind(entity_id)
                .fetch_optional(&mut **tx)
                .await?;

        return Err(DbError::InsufficientBalance {
            entity_id: entity_id.to_string(),
            balance: balance.unwrap_or(0),
            requested: amount,
        });
    }

    insert_entry(
        tx,
        entity_id,
        -amount,
        EntryType::Spend,
        category,
        reference_id,
    )
    .await
}

/// Appends one immutable ledger row and returns it with its assigned `seq`.
async fn insert_entry(
    tx: &mut Transaction<'_, Sqlite>,
    entity_id: &str,
    amount: i64,
    entry_type: EntryType,
    category: &str,
    reference_id: Option<&str>,
) -> DbResult<LedgerEntry> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO credit_ledger (id, entity_id, amount, entry_type, category, reference_id, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&id)
    .bind(entity_id)
    .bind(amount)
    .bind(entry_type)
    .bind(category)
    .bind(reference_id)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    Ok(LedgerEntry {
        id,
        entity_id: entity_id.to_string(),
        amount,
        entry_type,
        category: category.to_string(),
        reference_id: reference_id.map(str::to_string),
        seq: result.last_insert_rowid(),
        created_at: now,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
