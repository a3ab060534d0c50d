// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Parlor chat gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Parlor configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ParlorConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Messaging platform credentials and endpoints.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// TTL settings for the in-process cache.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Message pipeline settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Fallback AI settings used when a user has no stored override.
    #[serde(default)]
    pub ai: AiConfig,

    /// Fallback trigger keywords used when a user has no stored override.
    #[serde(default)]
    pub keywords: KeywordConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the webhook server to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind the webhook server to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Messaging platform credentials and endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PlatformConfig {
    /// Callback verification token shared with the platform console.
    #[serde(default)]
    pub token: String,

    /// 43-character base64 encoding key for the callback envelope.
    #[serde(default)]
    pub encoding_aes_key: String,

    /// Tenant (corp) identifier.
    #[serde(default)]
    pub corp_id: String,

    /// Application secret used to obtain access tokens.
    #[serde(default)]
    pub secret: String,

    /// Base URL of the platform HTTP API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            encoding_aes_key: String::new(),
            corp_id: String::new(),
            secret: String::new(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://qyapi.weixin.qq.com".to_string()
}

/// Storage backend configuration.
///
/// The database always runs in WAL mode; there is no switch for it.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("parlor").join("parlor.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("parlor.db"))
        .to_string_lossy()
        .into_owned()
}

/// TTL settings for the in-process cache.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Hours a processed message id stays in the dedup cache.
    #[serde(default = "default_dedup_ttl_hours")]
    pub dedup_ttl_hours: u64,

    /// Minutes of inactivity before a manual handoff session lapses.
    #[serde(default = "default_handoff_ttl_minutes")]
    pub handoff_ttl_minutes: u64,

    /// Seconds subtracted from the platform's token lifetime before refresh.
    #[serde(default = "default_token_refresh_margin_secs")]
    pub token_refresh_margin_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dedup_ttl_hours: default_dedup_ttl_hours(),
            handoff_ttl_minutes: default_handoff_ttl_minutes(),
            token_refresh_margin_secs: default_token_refresh_margin_secs(),
        }
    }
}

fn default_dedup_ttl_hours() -> u64 {
    48
}

fn default_handoff_ttl_minutes() -> u64 {
    30
}

fn default_token_refresh_margin_secs() -> u64 {
    120
}

/// Message pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Seconds a single handler may run before it is abandoned.
    #[serde(default = "default_handler_timeout_secs")]
    pub handler_timeout_secs: u64,

    /// Recent conversation turns loaded as AI context.
    #[serde(default = "default_history_turns")]
    pub history_turns: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            handler_timeout_secs: default_handler_timeout_secs(),
            history_turns: default_history_turns(),
        }
    }
}

fn default_handler_timeout_secs() -> u64 {
    30
}

fn default_history_turns() -> usize {
    10
}

/// Fallback AI settings.
///
/// A per-user row in storage overrides these, then the shared "default" row,
/// then this section.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AiConfig {
    /// OpenAI-compatible completion endpoint base URL.
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    /// API key for the completion endpoint. `None` disables the AI handler.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with every completion request.
    #[serde(default = "default_ai_model")]
    pub model: String,

    /// System prompt prepended to every conversation.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            api_key: None,
            model: default_ai_model(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_ai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_ai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful customer-service assistant.".to_string()
}

/// Fallback trigger keywords.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordConfig {
    /// Phrases that open a manual handoff session.
    #[serde(default = "default_handoff_enter")]
    pub handoff_enter: Vec<String>,

    /// Phrases that close a manual handoff session.
    #[serde(default = "default_handoff_exit")]
    pub handoff_exit: Vec<String>,

    /// Lottery game names answered with the latest draw.
    #[serde(default)]
    pub lottery: Vec<String>,
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            handoff_enter: default_handoff_enter(),
            handoff_exit: default_handoff_exit(),
            lottery: Vec::new(),
        }
    }
}

fn default_handoff_enter() -> Vec<String> {
    vec!["人工".to_string(), "转人工".to_string()]
}

fn default_handoff_exit() -> Vec<String> {
    vec!["退出人工".to_string()]
}
