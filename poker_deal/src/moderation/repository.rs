//! Storage for bans and ledger entries.
//!
//! [`PgModerationRepository`] persists to PostgreSQL (schema in
//! `migrations/0001_moderation.sql`); [`MemoryModerationRepository`] keeps
//! everything behind a tokio `RwLock` for development and tests.

use super::errors::{ModerationError, ModerationResult};
use super::models::{Ban, LedgerEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::{collections::HashMap, str::FromStr};
use tokio::sync::RwLock;

/// Trait for moderation repository operations
#[async_trait]
pub trait ModerationRepository: Send + Sync {
    /// Store `ban` unless the user already has one in force at
    /// `ban.created_at`. The check and the insert are atomic; returns
    /// whether the ban was stored.
    async fn insert_ban(&self, ban: &Ban) -> ModerationResult<bool>;

    /// Most recent ban in force for the user at `now`
    async fn active_ban(&self, user_id: &str, now: DateTime<Utc>)
    -> ModerationResult<Option<Ban>>;

    /// Mark every active ban of the user as lifted; returns how many were
    async fn lift_ban(&self, user_id: &str, lifted_at: DateTime<Utc>) -> ModerationResult<u64>;

    /// Bans newest first, optionally only those in force at `now`
    async fn list_bans(
        &self,
        active_only: bool,
        now: DateTime<Utc>,
    ) -> ModerationResult<Vec<Ban>>;

    /// Append a ledger entry. Fails with `DuplicateKey` when the
    /// idempotency key is taken.
    async fn append_entry(&self, entry: &LedgerEntry) -> ModerationResult<()>;

    /// Find entry by idempotency key
    async fn find_entry_by_key(&self, key: &str) -> ModerationResult<Option<LedgerEntry>>;

    /// Entries of a user, newest first
    async fn list_entries(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> ModerationResult<Vec<LedgerEntry>>;

    /// Check the backing store is reachable
    async fn health_check(&self) -> ModerationResult<()>;
}

/// Default PostgreSQL implementation of `ModerationRepository`
#[derive(Clone)]
pub struct PgModerationRepository {
    pool: PgPool,
}

impl PgModerationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BAN_COLUMNS: &str = "id, user_id, reason, banned_by, created_at, expires_at, lifted_at";

const ENTRY_COLUMNS: &str = "id, user_id, wallet, amount, direction, entry_type, \
                             idempotency_key, description, performed_by, created_at";

/// Unique violation (idempotency key)
const PG_UNIQUE_VIOLATION: &str = "23505";

fn ban_from_row(r: &PgRow) -> Ban {
    Ban {
        id: r.get("id"),
        user_id: r.get("user_id"),
        reason: r.get("reason"),
        banned_by: r.get("banned_by"),
        created_at: r.get("created_at"),
        expires_at: r.get("expires_at"),
        lifted_at: r.get("lifted_at"),
    }
}

fn parse_column<T: FromStr<Err = String>>(r: &PgRow, column: &str) -> ModerationResult<T> {
    let text: String = r.get(column);
    text.parse().map_err(ModerationError::CorruptRecord)
}

fn entry_from_row(r: &PgRow) -> ModerationResult<LedgerEntry> {
    Ok(LedgerEntry {
        id: r.get("id"),
        user_id: r.get("user_id"),
        wallet: parse_column(r, "wallet")?,
        amount: r.get("amount"),
        direction: parse_column(r, "direction")?,
        entry_type: parse_column(r, "entry_type")?,
        idempotency_key: r.get("idempotency_key"),
        description: r.get("description"),
        performed_by: r.get("performed_by"),
        created_at: r.get("created_at"),
    })
}

#[async_trait]
impl ModerationRepository for PgModerationRepository {
    async fn insert_ban(&self, ban: &Ban) -> ModerationResult<bool> {
        let mut tx = self.pool.begin().await?;

        // Serializes bans for one user until the transaction ends
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&ban.user_id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "INSERT INTO moderation_bans (id, user_id, reason, banned_by, created_at, expires_at, lifted_at)
             SELECT $1, $2, $3, $4, $5, $6, $7
             WHERE NOT EXISTS (
                 SELECT 1 FROM moderation_bans
                 WHERE user_id = $2 AND lifted_at IS NULL AND (expires_at IS NULL OR expires_at > $5)
             )",
        )
        .bind(ban.id)
        .bind(&ban.user_id)
        .bind(&ban.reason)
        .bind(&ban.banned_by)
        .bind(ban.created_at)
        .bind(ban.expires_at)
        .bind(ban.lifted_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(result.rows_affected() == 1)
    }

    async fn active_ban(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ModerationResult<Option<Ban>> {
        let row = sqlx::query(&format!(
            "SELECT {BAN_COLUMNS} FROM moderation_bans
             WHERE user_id = $1 AND lifted_at IS NULL AND (expires_at IS NULL OR expires_at > $2)
             ORDER BY created_at DESC LIMIT 1"
        ))
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(ban_from_row))
    }

    async fn lift_ban(&self, user_id: &str, lifted_at: DateTime<Utc>) -> ModerationResult<u64> {
        let result = sqlx::query(
            "UPDATE moderation_bans SET lifted_at = $2
             WHERE user_id = $1 AND lifted_at IS NULL AND (expires_at IS NULL OR expires_at > $2)",
        )
        .bind(user_id)
        .bind(lifted_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_bans(
        &self,
        active_only: bool,
        now: DateTime<Utc>,
    ) -> ModerationResult<Vec<Ban>> {
        let rows = sqlx::query(&format!(
            "SELECT {BAN_COLUMNS} FROM moderation_bans
             WHERE NOT $1 OR (lifted_at IS NULL AND (expires_at IS NULL OR expires_at > $2))
             ORDER BY created_at DESC"
        ))
        .bind(active_only)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(ban_from_row).collect())
    }

    async fn append_entry(&self, entry: &LedgerEntry) -> ModerationResult<()> {
        let result = sqlx::query(
            "INSERT INTO ledger_entries
                (id, user_id, wallet, amount, direction, entry_type, idempotency_key, description, performed_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(entry.id)
        .bind(&entry.user_id)
        .bind(entry.wallet.as_str())
        .bind(entry.amount)
        .bind(entry.direction.as_str())
        .bind(entry.entry_type.as_str())
        .bind(&entry.idempotency_key)
        .bind(&entry.description)
        .bind(&entry.performed_by)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) =>
            {
                Err(ModerationError::DuplicateKey(entry.idempotency_key.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_entry_by_key(&self, key: &str) -> ModerationResult<Option<LedgerEntry>> {
        let row = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE idempotency_key = $1"
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(entry_from_row).transpose()
    }

    async fn list_entries(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> ModerationResult<Vec<LedgerEntry>> {
        // NULL limit means no limit in PostgreSQL
        let rows = sqlx::query(&format!(
            "SELECT {ENTRY_COLUMNS} FROM ledger_entries
             WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entry_from_row).collect()
    }

    async fn health_check(&self) -> ModerationResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// In-memory implementation for development and tests
#[derive(Default)]
pub struct MemoryModerationRepository {
    bans: RwLock<Vec<Ban>>,
    entries: RwLock<Vec<LedgerEntry>>,
    keys: RwLock<HashMap<String, usize>>,
}

impl MemoryModerationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ModerationRepository for MemoryModerationRepository {
    async fn insert_ban(&self, ban: &Ban) -> ModerationResult<bool> {
        let mut bans = self.bans.write().await;
        if bans
            .iter()
            .any(|held| held.user_id == ban.user_id && held.is_active_at(ban.created_at))
        {
            return Ok(false);
        }
        bans.push(ban.clone());
        Ok(true)
    }

    async fn active_ban(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> ModerationResult<Option<Ban>> {
        let bans = self.bans.read().await;
        Ok(bans
            .iter()
            .filter(|ban| ban.user_id == user_id && ban.is_active_at(now))
            .max_by_key(|ban| ban.created_at)
            .cloned())
    }

    async fn lift_ban(&self, user_id: &str, lifted_at: DateTime<Utc>) -> ModerationResult<u64> {
        let mut bans = self.bans.write().await;
        let mut lifted = 0;
        for ban in bans
            .iter_mut()
            .filter(|ban| ban.user_id == user_id && ban.is_active_at(lifted_at))
        {
            ban.lifted_at = Some(lifted_at);
            lifted += 1;
        }
        Ok(lifted)
    }

    async fn list_bans(
        &self,
        active_only: bool,
        now: DateTime<Utc>,
    ) -> ModerationResult<Vec<Ban>> {
        let bans = self.bans.read().await;
        let mut listed: Vec<Ban> = bans
            .iter()
            .filter(|ban| !active_only || ban.is_active_at(now))
            .cloned()
            .collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn append_entry(&self, entry: &LedgerEntry) -> ModerationResult<()> {
        // Key index and log are updated under the key lock so a racing
        // duplicate cannot slip between the check and the push
        let mut keys = self.keys.write().await;
        if keys.contains_key(&entry.idempotency_key) {
            return Err(ModerationError::DuplicateKey(entry.idempotency_key.clone()));
        }
        let mut entries = self.entries.write().await;
        keys.insert(entry.idempotency_key.clone(), entries.len());
        entries.push(entry.clone());
        Ok(())
    }

    async fn find_entry_by_key(&self, key: &str) -> ModerationResult<Option<LedgerEntry>> {
        let keys = self.keys.read().await;
        let Some(&index) = keys.get(key) else {
            return Ok(None);
        };
        Ok(self.entries.read().await.get(index).cloned())
    }

    async fn list_entries(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> ModerationResult<Vec<LedgerEntry>> {
        let entries = self.entries.read().await;
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
        // Appended in time order, so newest first is reverse insertion order
        Ok(entries
            .iter()
            .rev()
            .filter(|entry| entry.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> ModerationResult<()> {
        Ok(())
    }
}
