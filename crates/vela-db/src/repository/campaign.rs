//! # Campaign Repository
//!
//! Campaigns funded from the credit ledger, with budget enforcement and a
//! one-time unused-budget refund.
//!
//! ## Campaign Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Campaign Lifecycle                                  │
//! │                                                                         │
//! │  1. CREATE (all-or-nothing)                                            │
//! │     └── one transaction: conditional ledger debit + campaign insert    │
//! │         └── InsufficientBalance → no campaign row exists               │
//! │                                                                         │
//! │  2. TRIGGERS                                                           │
//! │     └── record_trigger() → credits_used += n, capped at budget by      │
//! │         the UPDATE's own precondition                                  │
//! │                                                                         │
//! │  3. PAUSE or DELETE (settle)                                           │
//! │     └── status transition and refund are separate concerns:            │
//! │         • status moves whenever the campaign is not deleted            │
//! │         • a conditional flip of refund_issued decides the single       │
//! │           refund winner; (budget - used) appended in the same          │
//! │           transaction, zero on every later settle                      │
//! │                                                                         │
//! │  4. RESUME                                                             │
//! │     └── Paused → Active. Does not re-charge the ledger; the refund     │
//! │         flag is sticky (refund happens at most once per campaign)      │
//! │                                                                         │
//! │  Deleted is terminal: no transition out, and active → deleted stays    │
//! │  reachable after any number of pause/resume cycles.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::ledger::{credit_in_tx, debit_in_tx};
use vela_core::{Campaign, CampaignKind, CampaignStatus, EntryType};

/// Ledger category for campaign budget debits.
const CATEGORY_BUDGET: &str = "campaign_budget";

/// Ledger category for unused-budget refunds.
const CATEGORY_REFUND: &str = "campaign_refund";

/// Outcome of a pause or delete: what was refunded, and the updated row.
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    /// Credits returned to the entity's ledger (zero if fully consumed).
    pub refunded: i64,
    /// The campaign after the transition.
    pub campaign: Campaign,
}

/// Repository for campaign database operations.
#[derive(Debug, Clone)]
pub struct CampaignRepository {
    pool: SqlitePool,
}

impl CampaignRepository {
    /// Creates a new CampaignRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CampaignRepository { pool }
    }

    /// Creates a campaign, reserving its budget from the credit ledger.
    ///
    /// All-or-nothing: the conditional ledger debit and the campaign
    /// insert share one transaction. If the balance cannot cover the
    /// budget, no campaign row is created and nothing is appended.
    ///
    /// ## Errors
    /// * `CoreError::InvalidAmount` - `budget <= 0`
    /// * `DbError::InsufficientBalance` - not enough credits
    pub async fn create(
        &self,
        entity_id: &str,
        kind: CampaignKind,
        budget: i64,
    ) -> DbResult<Campaign> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(id = %id, entity_id = %entity_id, budget = %budget, "Creating campaign");

        let mut tx = self.pool.begin().await?;

        debit_in_tx(&mut tx, entity_id, budget, CATEGORY_BUDGET, Some(&id)).await?;

        sqlx::query(
            r#"
            INSERT INTO campaigns (
                id, entity_id, kind, credit_budget, credits_used,
                status, refund_issued, trigger_count, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5, 0, 0, ?6, ?6)
            "#,
        )
        .bind(&id)
        .bind(entity_id)
        .bind(kind)
        .bind(budget)
        .bind(CampaignStatus::Active)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Campaign {
            id,
            entity_id: entity_id.to_string(),
            kind,
            credit_budget: budget,
            credits_used: 0,
            status: CampaignStatus::Active,
            refund_issued: false,
            trigger_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Gets a campaign by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, entity_id, kind, credit_budget, credits_used,
                   status, refund_issued, trigger_count, created_at, updated_at
            FROM campaigns
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(campaign)
    }

    /// Lists an entity's campaigns, newest first.
    pub async fn list_for_entity(&self, entity_id: &str) -> DbResult<Vec<Campaign>> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, entity_id, kind, credit_budget, credits_used,
                   status, refund_issued, trigger_count, created_at, updated_at
            FROM campaigns
            WHERE entity_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(entity_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }

    /// Records a campaign firing (impression/click), consuming budget.
    ///
    /// The budget cap is the UPDATE's own precondition: a trigger that
    /// would push `credits_used` past `credit_budget`, or hit a non-active
    /// campaign, affects zero rows.
    ///
    /// ## Errors
    /// * `DbError::BudgetExhausted` - out of budget or not active
    /// * `DbError::NotFound` - no such campaign
    pub async fn record_trigger(&self, id: &str, credits: i64) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET credits_used = credits_used + ?2,
                trigger_count = trigger_count + 1,
                updated_at = ?3
            WHERE id = ?1
              AND status = 'active'
              AND credits_used + ?2 <= credit_budget
            "#,
        )
        .bind(id)
        .bind(credits)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await? {
                Some(_) => Err(DbError::BudgetExhausted {
                    campaign_id: id.to_string(),
                }),
                None => Err(DbError::not_found("Campaign", id)),
            };
        }

        Ok(())
    }

    /// Pauses a campaign, refunding its unused budget if not yet refunded.
    ///
    /// May be resumed later; the refund is not re-issued on a second
    /// pause (see [`CampaignRepository::settle`]).
    pub async fn pause(&self, id: &str) -> DbResult<RefundOutcome> {
        self.settle(id, CampaignStatus::Paused).await
    }

    /// Deletes a campaign, refunding its unused budget if not yet refunded.
    /// Terminal, and reachable from both `Active` and `Paused`.
    pub async fn delete(&self, id: &str) -> DbResult<RefundOutcome> {
        self.settle(id, CampaignStatus::Deleted).await
    }

    /// Resumes a paused campaign.
    ///
    /// Does not touch the ledger: the one-time refund already happened and
    /// the `refund_issued` flag stays set.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no such campaign, or not currently paused
    ///   (deleted campaigns cannot be resumed)
    pub async fn resume(&self, id: &str) -> DbResult<Campaign> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = 'active', updated_at = ?2
            WHERE id = ?1 AND status = 'paused'
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Campaign (paused)", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Campaign", id))
    }

    /// Shared pause/delete path: transition status, refund `budget - used`
    /// exactly once per campaign.
    ///
    /// The two concerns are decoupled so `Deleted` stays reachable after a
    /// pause/resume cycle. The status transition only requires the campaign
    /// not to be deleted; the separate conditional flip of `refund_issued`
    /// (`WHERE refund_issued = 0`) decides the single refund winner under
    /// concurrent calls. A settle that loses the refund race still
    /// transitions and reports `refunded: 0`. The refund entry is appended
    /// in the same transaction, so either both commit or neither does.
    async fn settle(&self, id: &str, to: CampaignStatus) -> DbResult<RefundOutcome> {
        debug!(id = %id, to = ?to, "Settling campaign");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let transitioned = sqlx::query(
            r#"
            UPDATE campaigns
            SET status = ?2, updated_at = ?3
            WHERE id = ?1 AND status != 'deleted'
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if transitioned.rows_affected() == 0 {
            // Already deleted, or the campaign never existed
            drop(tx);
            return match self.get_by_id(id).await? {
                Some(_) => Err(DbError::RefundAlreadyIssued {
                    campaign_id: id.to_string(),
                }),
                None => Err(DbError::not_found("Campaign", id)),
            };
        }

        let won_refund = sqlx::query(
            "UPDATE campaigns SET refund_issued = 1 WHERE id = ?1 AND refund_issued = 0",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let campaign = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT id, entity_id, kind, credit_budget, credits_used,
                   status, refund_issued, trigger_count, created_at, updated_at
            FROM campaigns
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let mut refunded = 0;
        if won_refund {
            // credits_used <= credit_budget is a table CHECK
            refunded = campaign.credit_budget - campaign.credits_used;
            if refunded > 0 {
                credit_in_tx(
                    &mut tx,
                    &campaign.entity_id,
                    refunded,
                    EntryType::Refund,
                    CATEGORY_REFUND,
                    Some(id),
                )
                .await?;
            }
        }

        tx.commit().await?;

        Ok(RefundOutcome { refunded, campaign })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use vela_core::{CampaignKind, CampaignStatus};

    async fn funded_db(entity_id: &str, credits: i64) -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.ledger()
            .grant(entity_id, credits, "monthly_grant")
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_create_reserves_budget_from_ledger() {
        let db = funded_db("vnd-1", 100).await;

        let campaign = db
            .campaigns()
            .create("vnd-1", CampaignKind::ProductBoost, 50)
            .await
            .unwrap();

        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.credits_used, 0);
        assert_eq!(db.ledger().balance("vnd-1").await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_create_is_all_or_nothing() {
        let db = funded_db("vnd-1", 30).await;

        let err = db
            .campaigns()
            .create("vnd-1", CampaignKind::ProductBoost, 50)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InsufficientBalance { .. }));

        // No campaign row, no ledger entry, balance untouched
        assert!(db
            .campaigns()
            .list_for_entity("vnd-1")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(db.ledger().balance("vnd-1").await.unwrap(), 30);
        assert_eq!(db.ledger().entries_for("vnd-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_refunds_unused_budget_once() {
        let db = funded_db("vnd-1", 100).await;
        let campaigns = db.campaigns();

        let campaign = campaigns
            .create("vnd-1", CampaignKind::SponsoredListing, 50)
            .await
            .unwrap();
        campaigns.record_trigger(&campaign.id, 12).await.unwrap();

        let outcome = campaigns.delete(&campaign.id).await.unwrap();
        assert_eq!(outcome.refunded, 38); // 50 budget - 12 used
        assert_eq!(outcome.campaign.status, CampaignStatus::Deleted);
        assert_eq!(db.ledger().balance("vnd-1").await.unwrap(), 88);

        // Second delete refunds nothing
        let err = campaigns.delete(&campaign.id).await.unwrap_err();
        assert!(matches!(err, DbError::RefundAlreadyIssued { .. }));
        assert_eq!(db.ledger().balance("vnd-1").await.unwrap(), 88);
    }

    #[tokio::test]
    async fn test_concurrent_settles_refund_once() {
        let db = funded_db("vnd-1", 100).await;
        let campaigns = db.campaigns();

        let campaign = campaigns
            .create("vnd-1", CampaignKind::ProductBoost, 50)
            .await
            .unwrap();

        let a = campaigns.delete(&campaign.id);
        let b = campaigns.pause(&campaign.id);
        let (ra, rb) = tokio::join!(a, b);

        // Whichever settles interleave, the refund winner is unique
        let refunded: i64 = [&ra, &rb]
            .iter()
            .filter_map(|r| r.as_ref().ok().map(|o| o.refunded))
            .sum();
        assert_eq!(refunded, 50, "refund must be issued exactly once");

        // Full budget back exactly once: 100 - 50 + 50
        assert_eq!(db.ledger().balance("vnd-1").await.unwrap(), 100);
        assert_eq!(db.ledger().entries_for("vnd-1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_reachable_after_pause_resume() {
        let db = funded_db("vnd-1", 100).await;
        let campaigns = db.campaigns();

        let campaign = campaigns
            .create("vnd-1", CampaignKind::ProductBoost, 40)
            .await
            .unwrap();
        campaigns.record_trigger(&campaign.id, 5).await.unwrap();

        // Pause refunds the unused 35 and the flag goes sticky
        let paused = campaigns.pause(&campaign.id).await.unwrap();
        assert_eq!(paused.refunded, 35);
        campaigns.resume(&campaign.id).await.unwrap();

        // Delete still reaches the terminal state; no second refund
        let outcome = campaigns.delete(&campaign.id).await.unwrap();
        assert_eq!(outcome.campaign.status, CampaignStatus::Deleted);
        assert_eq!(outcome.refunded, 0);
        assert_eq!(db.ledger().balance("vnd-1").await.unwrap(), 95);

        // Terminal for real: no settle or resume out of Deleted
        assert!(campaigns.delete(&campaign.id).await.is_err());
        assert!(campaigns.resume(&campaign.id).await.is_err());
        let row = campaigns.get_by_id(&campaign.id).await.unwrap().unwrap();
        assert_eq!(row.status, CampaignStatus::Deleted);
    }

    #[tokio::test]
    async fn test_fully_consumed_campaign_refunds_zero() {
        let db = funded_db("vnd-1", 100).await;
        let campaigns = db.campaigns();

        let campaign = campaigns
            .create("vnd-1", CampaignKind::ProductBoost, 20)
            .await
            .unwrap();
        campaigns.record_trigger(&campaign.id, 20).await.unwrap();

        let outcome = campaigns.delete(&campaign.id).await.unwrap();
        assert_eq!(outcome.refunded, 0);
        assert_eq!(db.ledger().balance("vnd-1").await.unwrap(), 80);
    }

    #[tokio::test]
    async fn test_trigger_capped_at_budget() {
        let db = funded_db("vnd-1", 100).await;
        let campaigns = db.campaigns();

        let campaign = campaigns
            .create("vnd-1", CampaignKind::StorefrontFeature, 10)
            .await
            .unwrap();

        campaigns.record_trigger(&campaign.id, 7).await.unwrap();

        // 7 + 4 > 10: rejected, counters untouched
        let err = campaigns.record_trigger(&campaign.id, 4).await.unwrap_err();
        assert!(matches!(err, DbError::BudgetExhausted { .. }));

        let row = campaigns.get_by_id(&campaign.id).await.unwrap().unwrap();
        assert_eq!(row.credits_used, 7);
        assert_eq!(row.trigger_count, 1);

        // Exact boundary still fits
        campaigns.record_trigger(&campaign.id, 3).await.unwrap();
    }

    #[tokio::test]
    async fn test_pause_and_resume() {
        let db = funded_db("vnd-1", 100).await;
        let campaigns = db.campaigns();

        let campaign = campaigns
            .create("vnd-1", CampaignKind::ProductBoost, 40)
            .await
            .unwrap();

        let outcome = campaigns.pause(&campaign.id).await.unwrap();
        assert_eq!(outcome.campaign.status, CampaignStatus::Paused);
        assert_eq!(outcome.refunded, 40);

        // Paused campaigns do not consume budget
        let err = campaigns.record_trigger(&campaign.id, 1).await.unwrap_err();
        assert!(matches!(err, DbError::BudgetExhausted { .. }));

        let resumed = campaigns.resume(&campaign.id).await.unwrap();
        assert_eq!(resumed.status, CampaignStatus::Active);
        assert!(resumed.refund_issued, "refund flag stays sticky");
    }

    #[tokio::test]
    async fn test_deleted_campaign_cannot_resume() {
        let db = funded_db("vnd-1", 100).await;
        let campaigns = db.campaigns();

        let campaign = campaigns
            .create("vnd-1", CampaignKind::ProductBoost, 10)
            .await
            .unwrap();
        campaigns.delete(&campaign.id).await.unwrap();

        let err = campaigns.resume(&campaign.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_settle_unknown_campaign_is_not_found() {
        let db = funded_db("vnd-1", 100).await;
        let err = db.campaigns().delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
