// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Parlor chat gateway.

use thiserror::Error;

/// The primary error type used across the Parlor pipeline and its adapters.
#[derive(Debug, Error)]
pub enum ParlorError {
    /// Webhook signature did not match. Drop the request, never retry.
    #[error("signature verification failed")]
    Auth,

    /// Malformed or undecryptable transport envelope.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Message ID already produced a reply. Benign; callers swallow it.
    #[error("duplicate message: {msg_id}")]
    Duplicate { msg_id: String },

    /// Platform API returned non-success or an unparseable body.
    #[error("upstream api error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An individual handler failed. Caught per handler by the dispatcher.
    #[error("handler `{name}` failed: {message}")]
    Handler { name: String, message: String },

    /// Outbound send failed. Logged, never retried automatically.
    #[error("delivery failed: {message}")]
    Delivery {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Durable store errors (connection, query, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// TTL cache errors.
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ParlorError {
    /// True for errors that mean "already handled" rather than "broken".
    pub fn is_benign_duplicate(&self) -> bool {
        matches!(self, ParlorError::Duplicate { .. })
    }
}
