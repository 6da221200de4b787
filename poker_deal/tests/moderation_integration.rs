//! Integration tests for the moderation manager.
//!
//! Runs against the in-memory repository; the PostgreSQL repository is
//! covered by the ignored test in the repository module.

use chrono::{Duration, Utc};
use poker_deal::moderation::{
    AdjustmentRequest, EntryDirection, EntryType, LedgerEntry, MAX_ADJUSTMENT_AMOUNT,
    MemoryModerationRepository, ModerationError, ModerationManager, ModerationRepository,
    WalletKind,
};
use std::sync::Arc;
use uuid::Uuid;

fn manager() -> ModerationManager {
    ModerationManager::new(Arc::new(MemoryModerationRepository::new()))
}

fn adjustment(user_id: &str, amount: i64, direction: EntryDirection) -> AdjustmentRequest {
    AdjustmentRequest {
        user_id: user_id.to_string(),
        wallet: WalletKind::Credits,
        amount,
        direction,
        entry_type: EntryType::AdminAdjust,
        idempotency_key: None,
        description: None,
        performed_by: "ops".to_string(),
    }
}

// ============================================================================
// Ban Tests
// ============================================================================

#[tokio::test]
async fn test_ban_and_unban() {
    let manager = manager();

    let ban = manager
        .ban_user("alice", "chip dumping", "mod-1", Some(Duration::hours(12)))
        .await
        .unwrap();
    assert_eq!(ban.user_id, "alice");
    assert!(ban.expires_at.is_some());
    assert!(manager.is_banned("alice").await.unwrap());
    assert!(!manager.is_banned("bob").await.unwrap());

    manager.unban_user("alice").await.unwrap();
    assert!(!manager.is_banned("alice").await.unwrap());

    // Lifted bans stay on record
    let all = manager.list_bans(false).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].lifted_at.is_some());
    assert!(manager.list_bans(true).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ban_validation() {
    let manager = manager();

    assert!(matches!(
        manager.ban_user("alice", "  ", "mod-1", None).await,
        Err(ModerationError::ReasonRequired)
    ));
    assert!(matches!(
        manager
            .ban_user("alice", "spam", "mod-1", Some(Duration::zero()))
            .await,
        Err(ModerationError::InvalidDuration)
    ));
    assert!(matches!(
        manager.unban_user("alice").await,
        Err(ModerationError::NotBanned(_))
    ));
}

#[tokio::test]
async fn test_double_ban_rejected() {
    let manager = manager();

    manager.ban_user("alice", "spam", "mod-1", None).await.unwrap();
    let err = manager
        .ban_user("alice", "more spam", "mod-2", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::AlreadyBanned(ref user) if user == "alice"));

    // A new ban is allowed once the old one is lifted
    manager.unban_user("alice").await.unwrap();
    manager.ban_user("alice", "again", "mod-2", None).await.unwrap();
    assert_eq!(manager.list_bans(false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_racing_bans_leave_one_in_force() {
    let manager = manager();

    let (first, second) = tokio::join!(
        manager.ban_user("alice", "collusion", "mod-1", None),
        manager.ban_user("alice", "collusion", "mod-2", Some(Duration::hours(1))),
    );

    assert_eq!(first.is_ok() as u8 + second.is_ok() as u8, 1);
    let rejected = first.err().or(second.err()).unwrap();
    assert!(matches!(rejected, ModerationError::AlreadyBanned(ref user) if user == "alice"));
    assert_eq!(manager.list_bans(true).await.unwrap().len(), 1);
}

// ============================================================================
// Ledger Tests
// ============================================================================

#[tokio::test]
async fn test_adjustment_requires_positive_amount() {
    let manager = manager();

    for amount in [0, -10] {
        let err = manager
            .record_adjustment(adjustment("alice", amount, EntryDirection::Credit))
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::InvalidAmount(a) if a == amount));
    }
}

#[tokio::test]
async fn test_adjustment_above_limit_rejected() {
    let manager = manager();

    manager
        .record_adjustment(adjustment("alice", MAX_ADJUSTMENT_AMOUNT, EntryDirection::Credit))
        .await
        .unwrap();
    let err = manager
        .record_adjustment(adjustment("alice", i64::MAX, EntryDirection::Credit))
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::InvalidAmount(i64::MAX)));
}

#[tokio::test]
async fn test_net_adjustment_out_of_range() {
    // Entries written before the per-entry limit existed
    let repo = Arc::new(MemoryModerationRepository::new());
    for key in ["legacy-1", "legacy-2"] {
        repo.append_entry(&LedgerEntry {
            id: Uuid::new_v4(),
            user_id: "whale".to_string(),
            wallet: WalletKind::Credits,
            amount: i64::MAX,
            direction: EntryDirection::Credit,
            entry_type: EntryType::Correction,
            idempotency_key: key.to_string(),
            description: None,
            performed_by: "import".to_string(),
            created_at: Utc::now(),
        })
        .await
        .unwrap();
    }
    let manager = ModerationManager::new(repo);

    let err = manager
        .net_adjustment("whale", WalletKind::Credits)
        .await
        .unwrap_err();
    assert!(matches!(err, ModerationError::NetOverflow(ref user) if user == "whale"));
    assert_eq!(
        manager
            .net_adjustment("whale", WalletKind::Diamonds)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_idempotent_replay() {
    let manager = manager();
    let mut request = adjustment("alice", 100, EntryDirection::Credit);
    request.idempotency_key = Some("bonus-42".to_string());

    let first = manager.record_adjustment(request.clone()).await.unwrap();
    let second = manager.record_adjustment(request.clone()).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(manager.history("alice", None).await.unwrap().len(), 1);

    request.amount = 200;
    let err = manager.record_adjustment(request).await.unwrap_err();
    assert!(matches!(err, ModerationError::KeyConflict(ref key) if key == "bonus-42"));
}

#[tokio::test]
async fn test_replay_with_other_metadata_conflicts() {
    let manager = manager();
    let mut request = adjustment("alice", 100, EntryDirection::Credit);
    request.idempotency_key = Some("promo-7".to_string());
    manager.record_adjustment(request.clone()).await.unwrap();

    let mut retyped = request.clone();
    retyped.entry_type = EntryType::Bonus;
    let mut reworded = request.clone();
    reworded.description = Some("spring promo".to_string());
    let mut reassigned = request;
    reassigned.performed_by = "someone-else".to_string();

    for replay in [retyped, reworded, reassigned] {
        let err = manager.record_adjustment(replay).await.unwrap_err();
        assert!(matches!(err, ModerationError::KeyConflict(ref key) if key == "promo-7"));
    }
    assert_eq!(manager.history("alice", None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_generated_keys_are_unique() {
    let manager = manager();

    let a = manager
        .record_adjustment(adjustment("alice", 5, EntryDirection::Credit))
        .await
        .unwrap();
    let b = manager
        .record_adjustment(adjustment("alice", 5, EntryDirection::Credit))
        .await
        .unwrap();

    assert_ne!(a.idempotency_key, b.idempotency_key);
    assert_eq!(manager.history("alice", None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_net_adjustment_per_wallet() {
    let manager = manager();

    manager
        .record_adjustment(adjustment("alice", 300, EntryDirection::Credit))
        .await
        .unwrap();
    manager
        .record_adjustment(adjustment("alice", 120, EntryDirection::Debit))
        .await
        .unwrap();
    let mut diamonds = adjustment("alice", 7, EntryDirection::Credit);
    diamonds.wallet = WalletKind::Diamonds;
    manager.record_adjustment(diamonds).await.unwrap();
    manager
        .record_adjustment(adjustment("bob", 999, EntryDirection::Credit))
        .await
        .unwrap();

    assert_eq!(
        manager
            .net_adjustment("alice", WalletKind::Credits)
            .await
            .unwrap(),
        180
    );
    assert_eq!(
        manager
            .net_adjustment("alice", WalletKind::Diamonds)
            .await
            .unwrap(),
        7
    );
    assert_eq!(
        manager
            .net_adjustment("carol", WalletKind::Credits)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_history_limit() {
    let manager = manager();

    for amount in 1..=5 {
        manager
            .record_adjustment(adjustment("alice", amount, EntryDirection::Credit))
            .await
            .unwrap();
    }

    let recent = manager.history("alice", Some(2)).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent[0].created_at >= recent[1].created_at);
    assert!(manager.history("alice", Some(0)).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_concurrent_replays_record_once() {
    let manager = manager();
    let mut request = adjustment("alice", 50, EntryDirection::Credit);
    request.idempotency_key = Some("refund-1".to_string());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let manager = manager.clone();
        let request = request.clone();
        handles.push(tokio::spawn(async move {
            manager.record_adjustment(request).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(manager.history("alice", None).await.unwrap().len(), 1);
}
