//! Plain-text rendering of results.

use poker_deal::{
    bot::BotDecision,
    equity::EquityMethod,
    moderation::{Ban, LedgerEntry},
    tournament::DealProposal,
};
use std::fmt::Write;

/// One line per stack with its equity and share of the total.
///
/// ```
/// use pd_client::report::render_equities;
/// use poker_deal::equity::EquityMethod;
///
/// let text = render_equities(EquityMethod::ChipChop, &[100.0, 300.0], &[250.0, 750.0]);
/// assert!(text.contains("chip_chop"));
/// assert!(text.contains("750.00"));
/// ```
pub fn render_equities(method: EquityMethod, stacks: &[f64], equities: &[f64]) -> String {
    let total: f64 = equities.iter().sum();
    let mut out = format!("Method: {method}\n");
    let _ = writeln!(out, "  {:>4}  {:>14}  {:>12}  {:>7}", "#", "stack", "equity", "share");
    for (i, (stack, equity)) in stacks.iter().zip(equities).enumerate() {
        let share = if total > 0.0 { equity / total * 100.0 } else { 0.0 };
        let _ = writeln!(
            out,
            "  {:>4}  {:>14.0}  {:>12.2}  {:>6.2}%",
            i + 1,
            stack,
            equity,
            share
        );
    }
    let _ = writeln!(out, "  Total equity: {total:.2}");
    out
}

/// Deal table with raw and rounded values.
pub fn render_proposal(proposal: &DealProposal) -> String {
    let mut out = format!(
        "Tournament {} - {} deal over a prize pool of {:.2}\n",
        proposal.tournament_id, proposal.method, proposal.prize_pool
    );
    let _ = writeln!(
        out,
        "  {:<16}  {:>12}  {:>7}  {:>12}  {:>8}",
        "player", "stack", "chips", "equity", "payout"
    );
    for line in &proposal.lines {
        let name = if line.username.is_empty() {
            line.user_id.as_str()
        } else {
            line.username.as_str()
        };
        let _ = writeln!(
            out,
            "  {:<16}  {:>12.0}  {:>6.2}%  {:>12.2}  {:>8}",
            name,
            line.stack,
            line.chip_share * 100.0,
            line.equity,
            line.payout
        );
    }
    let _ = writeln!(
        out,
        "  Rounded total: {} (drift {:+.2}, unallocated {:.2})",
        proposal.rounded_total,
        proposal.rounding_drift(),
        proposal.unallocated()
    );
    out
}

pub fn render_decision(decision: &BotDecision) -> String {
    let action = if decision.amount > 0 {
        format!("{} {}", decision.action, decision.amount)
    } else {
        decision.action.to_string()
    };
    format!(
        "Action: {action}\nStrength: {:.2}\nWhy: {}\n",
        decision.hand_strength, decision.rationale
    )
}

pub fn render_ban(ban: &Ban) -> String {
    let until = match ban.expires_at {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "permanent".to_string(),
    };
    let lifted = match ban.lifted_at {
        Some(at) => format!(", lifted {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => String::new(),
    };
    format!(
        "{} banned by {} on {} until {}{}: {}",
        ban.user_id,
        ban.banned_by,
        ban.created_at.format("%Y-%m-%d %H:%M UTC"),
        until,
        lifted,
        ban.reason
    )
}

pub fn render_entry(entry: &LedgerEntry) -> String {
    format!(
        "{}  {:>+8} {:<8} {:<13} by {:<12} key {}{}",
        entry.created_at.format("%Y-%m-%d %H:%M"),
        entry.signed_amount(),
        entry.wallet,
        entry.entry_type,
        entry.performed_by,
        entry.idempotency_key,
        entry
            .description
            .as_deref()
            .map(|d| format!(" ({d})"))
            .unwrap_or_default()
    )
}
