//! Server settings from the environment, with command-line overrides.
//!
//! Loading and validation are separate steps so tests can build a config
//! from a map and check each rule on its own.

use poker_deal::{
    db::DatabaseConfig,
    equity::{DEFAULT_SIMULATION_TRIALS, EquityMethod},
};
use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    str::FromStr,
};

/// Default bind address when neither CLI nor environment set one
pub const DEFAULT_BIND: SocketAddr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 6970));

/// Minimum admin token length
pub const MIN_ADMIN_TOKEN_LEN: usize = 32;

/// Upper bound accepted for `MAX_SIMULATION_TRIALS`
pub const TRIALS_CEILING: usize = 10_000_000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Database configuration; None runs the in-memory moderation store
    pub database: Option<DatabaseConfig>,
    /// Bearer token for the admin endpoints
    pub admin_token: String,
    /// Prometheus scrape listener
    pub metrics_bind: Option<SocketAddr>,
    /// Equity endpoint defaults
    pub equity: EquitySettings,
}

/// Equity defaults and limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquitySettings {
    /// Method used by the deal endpoint when the request names none
    pub default_method: EquityMethod,
    /// Trials for simulated equities when the request names none
    pub default_trials: usize,
    /// Largest trial count a request may ask for
    pub max_trials: usize,
}

impl Default for EquitySettings {
    fn default() -> Self {
        Self {
            default_method: EquityMethod::Approximate,
            default_trials: DEFAULT_SIMULATION_TRIALS,
            max_trials: 200_000,
        }
    }
}

/// Values given on the command line, which win over the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind: Option<SocketAddr>,
    pub database_url: Option<String>,
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Fails when `ADMIN_TOKEN` is missing or a value does not parse.
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F, overrides: ConfigOverrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Bind address
        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_var(&lookup, "SERVER_BIND")?.unwrap_or(DEFAULT_BIND),
        };

        // Database configuration
        let database = match overrides.database_url {
            Some(url) => {
                let url_lookup = |key: &str| {
                    if key == "DATABASE_URL" {
                        Some(url.clone())
                    } else {
                        lookup(key)
                    }
                };
                DatabaseConfig::from_lookup(url_lookup)
            }
            None => DatabaseConfig::from_lookup(&lookup),
        };

        // Admin token (REQUIRED)
        let admin_token = lookup("ADMIN_TOKEN").ok_or_else(|| ConfigError::MissingRequired {
            var: "ADMIN_TOKEN".to_string(),
            hint: "Generate with: openssl rand -hex 32".to_string(),
        })?;

        let metrics_bind = match overrides.metrics_bind {
            Some(addr) => Some(addr),
            None => parse_var(&lookup, "METRICS_BIND")?,
        };

        let defaults = EquitySettings::default();
        let equity = EquitySettings {
            default_method: parse_var(&lookup, "DEFAULT_EQUITY_METHOD")?
                .unwrap_or(defaults.default_method),
            default_trials: parse_var(&lookup, "SIMULATION_TRIALS")?
                .unwrap_or(defaults.default_trials),
            max_trials: parse_var(&lookup, "MAX_SIMULATION_TRIALS")?
                .unwrap_or(defaults.max_trials),
        };

        Ok(ServerConfig {
            bind,
            database,
            admin_token,
            metrics_bind,
            equity,
        })
    }

    /// Cross-field and range checks that parsing alone cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin_token.trim().len() < MIN_ADMIN_TOKEN_LEN {
            return Err(ConfigError::Invalid {
                var: "ADMIN_TOKEN".to_string(),
                reason: format!("Must be at least {MIN_ADMIN_TOKEN_LEN} characters"),
            });
        }

        if self.equity.default_trials == 0 {
            return Err(ConfigError::Invalid {
                var: "SIMULATION_TRIALS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.equity.max_trials > TRIALS_CEILING {
            return Err(ConfigError::Invalid {
                var: "MAX_SIMULATION_TRIALS".to_string(),
                reason: format!("Must be at most {TRIALS_CEILING}"),
            });
        }

        if self.equity.default_trials > self.equity.max_trials {
            return Err(ConfigError::Invalid {
                var: "SIMULATION_TRIALS".to_string(),
                reason: format!(
                    "Cannot exceed MAX_SIMULATION_TRIALS ({})",
                    self.equity.max_trials
                ),
            });
        }

        if let Some(database) = &self.database {
            if database.min_connections > database.max_connections {
                return Err(ConfigError::Invalid {
                    var: "DB_MIN_CONNECTIONS".to_string(),
                    reason: format!(
                        "Cannot exceed DB_MAX_CONNECTIONS ({})",
                        database.max_connections
                    ),
                });
            }
        }

        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional variable; present but unparseable is an error
fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: e.to_string(),
            }),
    }
}
