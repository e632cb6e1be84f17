// Configuration module for reading Bot.toml
// Heuristic weights and thresholds live here so that scoring variants are
// configuration rather than forked code paths

use log::warn;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub identity: IdentityConfig,
    pub server: ServerConfig,
    pub scoring: ScoringConfig,
    pub leader_defense: LeaderDefenseConfig,
    pub ledger: LedgerConfig,
    pub debug: DebugConfig,
}

/// How the bot recognises itself among tile occupants
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub name: String,
    pub token: String,
}

impl IdentityConfig {
    /// An occupant is us when its id matches either our name or our token
    pub fn is_me(&self, occupant_id: &str) -> bool {
        occupant_id == self.name || (!self.token.is_empty() && occupant_id == self.token)
    }
}

/// Connection and retry pacing for the I/O loop
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub uri: String,
    pub reconnect_delay_ms: u64,
    pub login_rejected_delay_ms: u64,
}

/// Weights for the reward tier rules
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScoringConfig {
    /// Congestion weight of opponents that end up richer than us
    pub oppo_weight: f64,
    /// Congestion weight of opponents that end up at or below us
    pub risk_weight: f64,
    /// Share of leftover gold used by the opportunity/risk adjustment
    pub adjustment_share: f64,
    /// Flat score of the near-neutral tier (rewards 0, 1, -1)
    pub neutral_score: f64,

    // Gamble tier (reward -4)
    pub gamble_interest_rate: f64,
    pub gamble_interest_cap: f64,
    pub gamble_win_chance: f64,
    pub gamble_loss: f64,
}

/// Defensive override used while we lead the table
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LeaderDefenseConfig {
    pub enabled: bool,
    /// Round from which the gold-per-round trigger is considered
    pub round_threshold: u32,
    /// Gold per elapsed round above which we play defensively
    pub gold_per_round: i32,
    pub neutral_score: f64,
    pub gamble_score: f64,
}

/// Post-game round ledger output
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub enabled: bool,
    pub output_dir: String,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Bot.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Bot.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Bot.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Bot.toml
    pub fn default_hardcoded() -> Self {
        Config {
            identity: IdentityConfig {
                name: "gold-grid-bot".to_string(),
                token: String::new(),
            },
            server: ServerConfig {
                uri: "ws://localhost:8881/ws".to_string(),
                reconnect_delay_ms: 1000,
                login_rejected_delay_ms: 2000,
            },
            scoring: ScoringConfig {
                oppo_weight: 1.0,
                risk_weight: 1.0,
                adjustment_share: 0.25,
                neutral_score: 0.0,
                gamble_interest_rate: 0.4,
                gamble_interest_cap: 10.0,
                gamble_win_chance: 0.5,
                gamble_loss: 4.0,
            },
            leader_defense: LeaderDefenseConfig {
                enabled: true,
                round_threshold: 50,
                gold_per_round: 11,
                neutral_score: 10.0,
                gamble_score: -4.0,
            },
            ledger: LedgerConfig {
                enabled: true,
                output_dir: "ledgers".to_string(),
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "gold_grid_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        let mut config = Self::load_default().unwrap_or_else(|e| {
            warn!("Could not load Bot.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        });
        config.apply_env_overrides(|key| env::var(key).ok());
        config
    }

    /// Replaces identity and server uri with values from the environment
    /// The lookup is injected so tests never touch the process environment
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("BOT_TOKEN") {
            self.identity.token = token;
        }
        if let Some(name) = lookup("BOT_NAME") {
            self.identity.name = name;
        }
        if let Some(uri) = lookup("BOT_SERVER_URI") {
            self.server.uri = uri;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.scoring.adjustment_share, 0.25);
        assert_eq!(config.leader_defense.round_threshold, 50);
    }

    #[test]
    fn test_bot_toml_can_be_parsed() {
        let result = Config::from_file("Bot.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Bot.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Bot.toml")
            .expect("Bot.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.scoring, hardcoded_config.scoring);
        assert_eq!(file_config.leader_defense, hardcoded_config.leader_defense);
        assert_eq!(file_config.server, hardcoded_config.server);
        assert_eq!(file_config.ledger, hardcoded_config.ledger);
        assert_eq!(file_config.debug, hardcoded_config.debug);
        assert_eq!(file_config.identity, hardcoded_config.identity);
    }

    #[test]
    fn test_env_overrides_identity_and_uri() {
        let mut config = Config::default_hardcoded();
        config.apply_env_overrides(|key| match key {
            "BOT_TOKEN" => Some("secret".to_string()),
            "BOT_SERVER_URI" => Some("ws://example:1/ws".to_string()),
            _ => None,
        });

        assert_eq!(config.identity.token, "secret");
        assert_eq!(config.identity.name, "gold-grid-bot");
        assert_eq!(config.server.uri, "ws://example:1/ws");
    }

    #[test]
    fn test_identity_matches_name_or_token() {
        let identity = IdentityConfig {
            name: "knight".to_string(),
            token: "abc".to_string(),
        };
        assert!(identity.is_me("knight"));
        assert!(identity.is_me("abc"));
        assert!(!identity.is_me("rival"));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
