//! Moderation manager: ban rules and idempotent wallet adjustments.

use super::{
    errors::{ModerationError, ModerationResult},
    models::{AdjustmentRequest, Ban, LedgerEntry, WalletKind},
    repository::ModerationRepository,
};
use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Default number of ledger entries returned by [`ModerationManager::history`]
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Largest single adjustment, one trillion units
pub const MAX_ADJUSTMENT_AMOUNT: i64 = 1_000_000_000_000;

/// Moderation manager
#[derive(Clone)]
pub struct ModerationManager {
    repo: Arc<dyn ModerationRepository>,
}

impl ModerationManager {
    /// Create a new moderation manager
    pub fn new(repo: Arc<dyn ModerationRepository>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<dyn ModerationRepository> {
        &self.repo
    }

    /// Ban a user
    ///
    /// # Arguments
    ///
    /// * `user_id` - User to ban
    /// * `reason` - Non-empty reason shown in the ban list
    /// * `banned_by` - Administrator placing the ban
    /// * `duration` - None for a permanent ban
    ///
    /// # Errors
    ///
    /// `ReasonRequired`, `InvalidDuration`, or `AlreadyBanned` when a ban is
    /// already in force.
    pub async fn ban_user(
        &self,
        user_id: &str,
        reason: &str,
        banned_by: &str,
        duration: Option<Duration>,
    ) -> ModerationResult<Ban> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ModerationError::ReasonRequired);
        }
        if duration.is_some_and(|d| d <= Duration::zero()) {
            return Err(ModerationError::InvalidDuration);
        }

        let now = Utc::now();
        let ban = Ban {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            reason: reason.to_string(),
            banned_by: banned_by.to_string(),
            created_at: now,
            expires_at: duration.map(|d| now + d),
            lifted_at: None,
        };
        if !self.repo.insert_ban(&ban).await? {
            return Err(ModerationError::AlreadyBanned(user_id.to_string()));
        }

        log::info!(
            "User {} banned by {} until {}",
            ban.user_id,
            ban.banned_by,
            ban.expires_at
                .map_or_else(|| "forever".to_string(), |t| t.to_rfc3339())
        );
        Ok(ban)
    }

    /// Lift the active ban of a user
    pub async fn unban_user(&self, user_id: &str) -> ModerationResult<()> {
        let lifted = self.repo.lift_ban(user_id, Utc::now()).await?;
        if lifted == 0 {
            return Err(ModerationError::NotBanned(user_id.to_string()));
        }
        log::info!("Ban lifted for user {}", user_id);
        Ok(())
    }

    /// Whether a ban is in force for the user right now
    pub async fn is_banned(&self, user_id: &str) -> ModerationResult<bool> {
        Ok(self.repo.active_ban(user_id, Utc::now()).await?.is_some())
    }

    pub async fn active_ban(&self, user_id: &str) -> ModerationResult<Option<Ban>> {
        self.repo.active_ban(user_id, Utc::now()).await
    }

    pub async fn list_bans(&self, active_only: bool) -> ModerationResult<Vec<Ban>> {
        self.repo.list_bans(active_only, Utc::now()).await
    }

    /// Record a wallet adjustment.
    ///
    /// Replaying a request with an idempotency key already on file returns
    /// the original entry; reusing the key for a different adjustment is a
    /// `KeyConflict`.
    pub async fn record_adjustment(
        &self,
        request: AdjustmentRequest,
    ) -> ModerationResult<LedgerEntry> {
        if !(1..=MAX_ADJUSTMENT_AMOUNT).contains(&request.amount) {
            return Err(ModerationError::InvalidAmount(request.amount));
        }

        let key = request
            .idempotency_key
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        if let Some(existing) = self.repo.find_entry_by_key(&key).await? {
            return replay(&request, existing, &key);
        }

        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            user_id: request.user_id.clone(),
            wallet: request.wallet,
            amount: request.amount,
            direction: request.direction,
            entry_type: request.entry_type,
            idempotency_key: key.clone(),
            description: request.description.clone(),
            performed_by: request.performed_by.clone(),
            created_at: Utc::now(),
        };

        match self.repo.append_entry(&entry).await {
            Ok(()) => {
                log::info!(
                    "Ledger {} {} {} for user {} by {}",
                    entry.direction,
                    entry.amount,
                    entry.wallet,
                    entry.user_id,
                    entry.performed_by
                );
                Ok(entry)
            }
            // Lost a race with a concurrent request carrying the same key
            Err(ModerationError::DuplicateKey(_)) => {
                match self.repo.find_entry_by_key(&key).await? {
                    Some(existing) => replay(&request, existing, &key),
                    None => Err(ModerationError::DuplicateKey(key)),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Ledger entries of a user, newest first
    pub async fn history(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> ModerationResult<Vec<LedgerEntry>> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT).max(0);
        self.repo.list_entries(user_id, Some(limit)).await
    }

    /// Credits minus debits over the full history of one wallet.
    ///
    /// `NetOverflow` when the total leaves the i64 range.
    pub async fn net_adjustment(&self, user_id: &str, wallet: WalletKind) -> ModerationResult<i64> {
        let entries = self.repo.list_entries(user_id, None).await?;
        entries
            .iter()
            .filter(|entry| entry.wallet == wallet)
            .try_fold(0_i64, |net, entry| net.checked_add(entry.signed_amount()))
            .ok_or_else(|| ModerationError::NetOverflow(user_id.to_string()))
    }
}

fn replay(
    request: &AdjustmentRequest,
    existing: LedgerEntry,
    key: &str,
) -> ModerationResult<LedgerEntry> {
    if request.matches(&existing) {
        log::debug!("Replayed ledger entry for key {}", key);
        Ok(existing)
    } else {
        log::warn!("Idempotency key {} reused for a different adjustment", key);
        Err(ModerationError::KeyConflict(key.to_string()))
    }
}
