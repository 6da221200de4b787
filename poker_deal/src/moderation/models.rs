//! Moderation data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// A ban placed on a user by an administrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ban {
    pub id: Uuid,
    pub user_id: String,
    pub reason: String,
    pub banned_by: String,
    pub created_at: DateTime<Utc>,
    /// None for a permanent ban
    pub expires_at: Option<DateTime<Utc>>,
    pub lifted_at: Option<DateTime<Utc>>,
}

impl Ban {
    /// In force at `now`: neither lifted nor expired
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.lifted_at.is_none() && self.expires_at.is_none_or(|expires| expires > now)
    }
}

/// Which balance an adjustment applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    Credits,
    Diamonds,
}

/// Entry direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryDirection {
    Debit,
    Credit,
}

/// Entry type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    AdminAdjust,
    Bonus,
    Refund,
    Correction,
}

macro_rules! text_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($ty::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($ty), other)),
                }
            }
        }
    };
}

text_enum!(WalletKind {
    Credits => "credits",
    Diamonds => "diamonds",
});

text_enum!(EntryDirection {
    Debit => "debit",
    Credit => "credit",
});

text_enum!(EntryType {
    AdminAdjust => "admin_adjust",
    Bonus => "bonus",
    Refund => "refund",
    Correction => "correction",
});

/// Append-only record of a manual wallet adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub user_id: String,
    pub wallet: WalletKind,
    /// Always positive; the sign comes from `direction`
    pub amount: i64,
    pub direction: EntryDirection,
    pub entry_type: EntryType,
    pub idempotency_key: String,
    pub description: Option<String>,
    pub performed_by: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Amount with credits positive and debits negative
    pub fn signed_amount(&self) -> i64 {
        match self.direction {
            EntryDirection::Credit => self.amount,
            EntryDirection::Debit => -self.amount,
        }
    }
}

/// Request to record an adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub user_id: String,
    pub wallet: WalletKind,
    pub amount: i64,
    pub direction: EntryDirection,
    #[serde(default)]
    pub entry_type: EntryType,
    /// Generated when absent
    #[serde(default)]
    pub idempotency_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub performed_by: String,
}

impl AdjustmentRequest {
    /// Every stored field except the generated id, key and timestamp agrees
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        self.user_id == entry.user_id
            && self.wallet == entry.wallet
            && self.amount == entry.amount
            && self.direction == entry.direction
            && self.entry_type == entry.entry_type
            && self.description == entry.description
            && self.performed_by == entry.performed_by
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn ban(expires_at: Option<DateTime<Utc>>) -> Ban {
        Ban {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            reason: "chip dumping".to_string(),
            banned_by: "admin".to_string(),
            created_at: Utc::now(),
            expires_at,
            lifted_at: None,
        }
    }

    #[test]
    fn test_ban_activity() {
        let now = Utc::now();
        assert!(ban(None).is_active_at(now));
        assert!(ban(Some(now + Duration::hours(1))).is_active_at(now));
        assert!(!ban(Some(now - Duration::hours(1))).is_active_at(now));

        let mut lifted = ban(None);
        lifted.lifted_at = Some(now);
        assert!(!lifted.is_active_at(now));
    }

    #[test]
    fn test_text_enums_round_trip_through_str() {
        for kind in [WalletKind::Credits, WalletKind::Diamonds] {
            assert_eq!(kind.as_str().parse::<WalletKind>().unwrap(), kind);
        }
        assert_eq!("refund".parse::<EntryType>().unwrap(), EntryType::Refund);
        assert!("gems".parse::<WalletKind>().is_err());
        assert_eq!(EntryDirection::Debit.to_string(), "debit");
    }

    #[test]
    fn test_signed_amount() {
        let mut entry = LedgerEntry {
            id: Uuid::new_v4(),
            user_id: "u1".to_string(),
            wallet: WalletKind::Credits,
            amount: 250,
            direction: EntryDirection::Credit,
            entry_type: EntryType::Bonus,
            idempotency_key: "k".to_string(),
            description: None,
            performed_by: "admin".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(entry.signed_amount(), 250);
        entry.direction = EntryDirection::Debit;
        assert_eq!(entry.signed_amount(), -250);
    }
}
