// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities.
//!
//! Timestamps are stored as RFC 3339 strings so rows sort correctly with
//! plain text comparison.

/// One conversation turn, inbound or outbound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRecord {
    /// Platform message id. `None` for outbound replies.
    pub msg_id: Option<String>,
    /// External user the turn belongs to.
    pub user_id: String,
    /// `user` for inbound, `assistant` for outbound.
    pub role: String,
    /// Message kind (text, image, voice, video, file).
    pub kind: String,
    /// Text content, or a media reference for non-text turns.
    pub content: String,
    /// RFC 3339 creation time.
    pub created_at: String,
}

/// A pending or resolved manual handoff request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRequest {
    pub id: i64,
    pub user_id: String,
    pub opened_at: String,
    pub resolved: bool,
    pub resolved_at: Option<String>,
}

/// A fixed keyword-to-reply rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub user_id: String,
    pub keyword: String,
    pub reply_kind: String,
    pub reply_content: String,
}

/// A single per-user setting override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverride {
    pub user_id: String,
    pub key: String,
    pub value: String,
}
