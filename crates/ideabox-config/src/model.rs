// SPDX-FileCopyrightText: 2026 Ideabox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model.
//!
//! Every struct denies unknown fields so a typo in `ideabox.toml` fails at
//! startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IdeaboxConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Hourly admission quotas.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Duplicate window, model budgets and prompt overrides.
    #[serde(default)]
    pub intake: IntakeConfig,

    /// Moderation HTTP API.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// trace, debug, info, warn or error. `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "ideabox".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token. `None` disables the Telegram transport.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Chat IDs the bot answers in. Empty means every chat.
    #[serde(default)]
    pub allowed_chats: Vec<i64>,

    #[serde(default = "default_min_idea_chars")]
    pub min_idea_chars: usize,

    #[serde(default = "default_max_idea_chars")]
    pub max_idea_chars: usize,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            allowed_chats: Vec::new(),
            min_idea_chars: default_min_idea_chars(),
            max_idea_chars: default_max_idea_chars(),
        }
    }
}

fn default_min_idea_chars() -> usize {
    10
}

fn default_max_idea_chars() -> usize {
    2000
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Falls back to `ANTHROPIC_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            api_version: default_api_version(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database file. The parent directory is created on open.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ideabox").join("ideas.db"))
        .unwrap_or_else(|| "ideas.db".into())
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Token-bucket quotas, in submissions per hour.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default = "default_per_user")]
    pub per_user: u32,

    #[serde(default = "default_global")]
    pub global: u32,

    /// How often idle per-submitter buckets are evicted.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_user: default_per_user(),
            global: default_global(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_per_user() -> u32 {
    5
}

fn default_global() -> u32 {
    50
}

fn default_sweep_interval_secs() -> u64 {
    3600
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IntakeConfig {
    /// Number of recent non-terminal ideas compared against a new submission.
    #[serde(default = "default_candidate_window")]
    pub candidate_window: usize,

    /// Wall-clock budget shared by the duplicate check and enrichment.
    #[serde(default = "default_llm_budget_secs")]
    pub llm_budget_secs: u64,

    #[serde(default = "default_enrich_max_tokens")]
    pub enrich_max_tokens: u32,

    #[serde(default = "default_duplicate_max_tokens")]
    pub duplicate_max_tokens: u32,

    /// Replaces the built-in analyst instructions. The JSON schema is always appended.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            candidate_window: default_candidate_window(),
            llm_budget_secs: default_llm_budget_secs(),
            enrich_max_tokens: default_enrich_max_tokens(),
            duplicate_max_tokens: default_duplicate_max_tokens(),
            system_prompt_file: None,
        }
    }
}

fn default_candidate_window() -> usize {
    100
}

fn default_llm_budget_secs() -> u64 {
    60
}

fn default_enrich_max_tokens() -> u32 {
    2000
}

fn default_duplicate_max_tokens() -> u32 {
    500
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// HTTP Basic credentials. Required when the gateway is enabled.
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Public URL used when linking to ideas from chat replies.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_gateway_host(),
            port: default_gateway_port(),
            username: None,
            password: None,
            base_url: default_base_url(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}
