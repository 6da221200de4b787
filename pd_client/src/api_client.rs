//! HTTP API client for the deal server.

use anyhow::{Context, Result};
use poker_deal::{
    bot::BotDecision,
    cards::Card,
    equity::EquityMethod,
    moderation::{Ban, LedgerEntry},
    tournament::DealProposal,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// API client for communicating with the deal server
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    admin_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct EquityRequest<'a> {
    stacks: &'a [f64],
    payouts: &'a [f64],
    trials: Option<usize>,
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ChipChopRequest<'a> {
    stacks: &'a [f64],
    prize_pool: f64,
}

#[derive(Debug, Serialize)]
struct DealRequest {
    method: Option<EquityMethod>,
    trials: Option<usize>,
    seed: Option<u64>,
    snapshot: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct BanRequest<'a> {
    user_id: &'a str,
    reason: &'a str,
    banned_by: &'a str,
    duration_hours: Option<i64>,
}

/// Server reply for every equity endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct EquityReply {
    pub method: EquityMethod,
    pub equities: Vec<f64>,
    pub total: f64,
}

/// Bot decision request body
#[derive(Debug, Clone, Serialize)]
pub struct BotQuery {
    pub hole_cards: Vec<Card>,
    pub board_cards: Vec<Card>,
    pub pot_size: u32,
    pub current_bet: u32,
    pub bot_chips: u32,
    pub big_blind: u32,
    pub position: Option<usize>,
    pub players_remaining: usize,
    pub difficulty: poker_deal::bot::BotDifficulty,
    pub aggression: Option<f32>,
    pub seed: Option<u64>,
}

/// Ledger adjustment request body
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentQuery {
    pub user_id: String,
    pub wallet: String,
    pub amount: i64,
    pub direction: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_type: Option<String>,
    pub idempotency_key: Option<String>,
    pub description: Option<String>,
    pub performed_by: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BanStatus {
    pub user_id: String,
    pub banned: bool,
    pub ban: Option<Ban>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerHistory {
    pub user_id: String,
    pub entries: Vec<LedgerEntry>,
    pub net_credits: i64,
    pub net_diamonds: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            admin_token: None,
        }
    }

    /// Attach the admin bearer token used by moderation calls
    pub fn with_admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Server health report
    pub async fn health(&self) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .context("Failed to send health request")?;

        // 503 still carries a health body
        response
            .json()
            .await
            .context("Failed to parse health response")
    }

    /// Equities with the given method
    pub async fn equity(
        &self,
        method: EquityMethod,
        stacks: &[f64],
        payouts: &[f64],
        trials: Option<usize>,
        seed: Option<u64>,
    ) -> Result<EquityReply> {
        let request = EquityRequest {
            stacks,
            payouts,
            trials,
            seed,
        };
        let response = self
            .client
            .post(format!("{}/api/v1/equity/{method}", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send equity request")?;

        parse_response(response, "Equity request").await
    }

    /// Chip-chop split of an explicit prize pool
    pub async fn chip_chop(&self, stacks: &[f64], prize_pool: f64) -> Result<EquityReply> {
        let response = self
            .client
            .post(format!("{}/api/v1/equity/chip-chop", self.base_url))
            .json(&ChipChopRequest { stacks, prize_pool })
            .send()
            .await
            .context("Failed to send chip-chop request")?;

        parse_response(response, "Chip-chop request").await
    }

    /// Deal proposal for a raw tournament snapshot
    pub async fn propose_deal(
        &self,
        snapshot: serde_json::Value,
        method: Option<EquityMethod>,
        trials: Option<usize>,
        seed: Option<u64>,
    ) -> Result<DealProposal> {
        let request = DealRequest {
            method,
            trials,
            seed,
            snapshot,
        };
        let response = self
            .client
            .post(format!("{}/api/v1/deals", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Failed to send deal request")?;

        parse_response(response, "Deal request").await
    }

    /// Bot decision for a spot
    pub async fn bot_decision(&self, query: &BotQuery) -> Result<BotDecision> {
        let response = self
            .client
            .post(format!("{}/api/v1/bots/decide", self.base_url))
            .json(query)
            .send()
            .await
            .context("Failed to send bot request")?;

        parse_response(response, "Bot request").await
    }

    /// Ban a user
    pub async fn ban_user(
        &self,
        user_id: &str,
        reason: &str,
        banned_by: &str,
        duration_hours: Option<i64>,
    ) -> Result<Ban> {
        let request = BanRequest {
            user_id,
            reason,
            banned_by,
            duration_hours,
        };
        let response = self
            .admin(self.client.post(format!("{}/api/v1/bans", self.base_url)))?
            .json(&request)
            .send()
            .await
            .context("Failed to send ban request")?;

        parse_response(response, "Ban").await
    }

    /// Lift the active ban of a user
    pub async fn lift_ban(&self, user_id: &str) -> Result<()> {
        let response = self
            .admin(
                self.client
                    .delete(format!("{}/api/v1/bans/{user_id}", self.base_url)),
            )?
            .send()
            .await
            .context("Failed to send unban request")?;

        if !response.status().is_success() {
            anyhow::bail!("Unban failed: {}", error_text(response).await);
        }
        Ok(())
    }

    /// Ban status of a user
    pub async fn ban_status(&self, user_id: &str) -> Result<BanStatus> {
        let response = self
            .admin(
                self.client
                    .get(format!("{}/api/v1/bans/{user_id}", self.base_url)),
            )?
            .send()
            .await
            .context("Failed to send ban status request")?;

        parse_response(response, "Ban status").await
    }

    /// All bans, or only those in force
    pub async fn list_bans(&self, active_only: bool) -> Result<Vec<Ban>> {
        let response = self
            .admin(self.client.get(format!(
                "{}/api/v1/bans?active={active_only}",
                self.base_url
            )))?
            .send()
            .await
            .context("Failed to list bans")?;

        parse_response(response, "Ban list").await
    }

    /// Record a wallet adjustment
    pub async fn record_adjustment(&self, query: &AdjustmentQuery) -> Result<LedgerEntry> {
        let response = self
            .admin(self.client.post(format!("{}/api/v1/ledger", self.base_url)))?
            .json(query)
            .send()
            .await
            .context("Failed to send adjustment request")?;

        parse_response(response, "Adjustment").await
    }

    /// Adjustment history of a user
    pub async fn ledger_history(&self, user_id: &str, limit: Option<i64>) -> Result<LedgerHistory> {
        let mut url = format!("{}/api/v1/ledger/{user_id}", self.base_url);
        if let Some(limit) = limit {
            url.push_str(&format!("?limit={limit}"));
        }
        let response = self
            .admin(self.client.get(url))?
            .send()
            .await
            .context("Failed to send history request")?;

        parse_response(response, "History").await
    }

    fn admin(&self, request: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        let token = self
            .admin_token
            .as_ref()
            .context("Admin token required (use --admin-token or ADMIN_TOKEN)")?;
        Ok(request.bearer_auth(token))
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response, what: &str) -> Result<T> {
    if !response.status().is_success() {
        anyhow::bail!("{what} failed: {}", error_text(response).await);
    }
    response
        .json()
        .await
        .with_context(|| format!("Failed to parse {} response", what.to_lowercase()))
}

async fn error_text(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => match serde_json::from_str::<ErrorBody>(&body) {
            Ok(parsed) => format!("{status}: {}", parsed.error),
            Err(_) => format!("{status}: {body}"),
        },
        Err(e) => format!("Failed to read error response: {e}"),
    }
}
