// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as credential presence, the encoding key length, and
//! sane TTL values.

use crate::diagnostic::ConfigError;
use crate::model::ParlorConfig;

/// Length of the platform's encoding key (base64 with trailing `=` removed).
const ENCODING_KEY_LEN: usize = 43;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ParlorConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let addr = config.server.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "server.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    for (key, value) in [
        ("platform.token", &config.platform.token),
        ("platform.corp_id", &config.platform.corp_id),
        ("platform.secret", &config.platform.secret),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("{key} must not be empty"),
            });
        }
    }

    if config.platform.encoding_aes_key.len() != ENCODING_KEY_LEN {
        errors.push(ConfigError::Validation {
            message: format!(
                "platform.encoding_aes_key must be {ENCODING_KEY_LEN} characters, got {}",
                config.platform.encoding_aes_key.len()
            ),
        });
    }

    if !config.platform.api_base_url.starts_with("http://")
        && !config.platform.api_base_url.starts_with("https://")
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "platform.api_base_url `{}` must start with http:// or https://",
                config.platform.api_base_url
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.cache.dedup_ttl_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.dedup_ttl_hours must be at least 1".to_string(),
        });
    }

    if config.cache.handoff_ttl_minutes == 0 {
        errors.push(ConfigError::Validation {
            message: "cache.handoff_ttl_minutes must be at least 1".to_string(),
        });
    }

    if config.pipeline.handler_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "pipeline.handler_timeout_secs must be at least 1".to_string(),
        });
    }

    if config.keywords.handoff_enter.is_empty() {
        errors.push(ConfigError::Validation {
            message: "keywords.handoff_enter must list at least one phrase".to_string(),
        });
    }

    if config.keywords.handoff_exit.is_empty() {
        errors.push(ConfigError::Validation {
            message: "keywords.handoff_exit must list at least one phrase".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
