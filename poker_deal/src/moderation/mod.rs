//! Persisted ban list and wallet adjustment log.
//!
//! Bans and manual credit/diamond adjustments live behind the
//! [`ModerationRepository`] trait so the service can run against PostgreSQL
//! or an in-memory store.
//!
//! ## Example
//!
//! ```
//! use poker_deal::moderation::{
//!     AdjustmentRequest, EntryDirection, EntryType, MemoryModerationRepository,
//!     ModerationManager, WalletKind,
//! };
//! use std::sync::Arc;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let manager = ModerationManager::new(Arc::new(MemoryModerationRepository::new()));
//!
//! manager.ban_user("user-7", "collusion", "admin", None).await?;
//! assert!(manager.is_banned("user-7").await?);
//!
//! let request = AdjustmentRequest {
//!     user_id: "user-7".to_string(),
//!     wallet: WalletKind::Credits,
//!     amount: 500,
//!     direction: EntryDirection::Credit,
//!     entry_type: EntryType::Refund,
//!     idempotency_key: Some("refund-7".to_string()),
//!     description: None,
//!     performed_by: "admin".to_string(),
//! };
//! let first = manager.record_adjustment(request.clone()).await?;
//! let replayed = manager.record_adjustment(request).await?;
//! assert_eq!(first.id, replayed.id);
//! # Ok::<(), poker_deal::moderation::ModerationError>(())
//! # }).unwrap();
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod repository;

pub use errors::{ModerationError, ModerationResult};
pub use manager::{DEFAULT_HISTORY_LIMIT, MAX_ADJUSTMENT_AMOUNT, ModerationManager};
pub use models::{
    AdjustmentRequest, Ban, EntryDirection, EntryType, LedgerEntry, WalletKind,
};
pub use repository::{
    MemoryModerationRepository, ModerationRepository, PgModerationRepository,
};
