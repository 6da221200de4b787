//! HTTP service for tournament deal-making.
//!
//! Exposes the `poker_deal` equity models and deal calculator over JSON,
//! along with the bot decision heuristic and an admin-only moderation API.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
