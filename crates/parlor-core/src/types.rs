// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Parlor pipeline and its adapters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque reference to a media object held by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef(pub String);

impl MediaRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Wire-level message type, shared by inbound messages and outbound turns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Voice,
    Video,
    File,
}

/// A message pulled from the platform's sync API.
///
/// `msg_id` is the idempotency key for the whole pipeline: sync items
/// without one are non-message events and never reach dedup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformMessage {
    pub msg_id: String,
    pub from_user: String,
    /// Routing identifier of the service account the user wrote to.
    pub to_user: String,
    pub kind: MessageKind,
    pub content: String,
    pub received_at: DateTime<Utc>,
}

/// One page returned by the platform's cursor-based sync API.
#[derive(Debug, Clone, Default)]
pub struct SyncPage {
    pub messages: Vec<PlatformMessage>,
    /// Cursor to persist before the page is processed. `None` when the
    /// platform omits it.
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

/// The closed set of replies a handler may produce.
///
/// Every consumer matches exhaustively; adding a variant is a deliberate
/// compile-time ripple through the reply sender and its tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Image(MediaRef),
    Voice(MediaRef),
    Video(MediaRef),
    File(MediaRef),
}

impl Reply {
    /// The wire-level kind this reply is sent as.
    pub fn kind(&self) -> MessageKind {
        match self {
            Reply::Text(_) => MessageKind::Text,
            Reply::Image(_) => MessageKind::Image,
            Reply::Voice(_) => MessageKind::Voice,
            Reply::Video(_) => MessageKind::Video,
            Reply::File(_) => MessageKind::File,
        }
    }

    /// Content recorded in the conversation log for this reply.
    pub fn log_content(&self) -> String {
        match self {
            Reply::Text(content) => content.clone(),
            Reply::Image(m) | Reply::Voice(m) | Reply::Video(m) | Reply::File(m) => {
                format!("media_id: {}", m.as_str())
            }
        }
    }
}

/// A durable conversation log entry; one per inbound message and one per
/// outbound reply. `msg_id` is unique when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub msg_id: Option<String>,
    pub from_user: String,
    pub to_user: String,
    pub kind: MessageKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Resolved AI settings for one user, after the user -> "default" -> static
/// fallback chain has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiProfile {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub system_prompt: String,
}

/// Resolved trigger keywords for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordProfile {
    pub handoff_enter: Vec<String>,
    pub handoff_exit: Vec<String>,
    pub lottery: Vec<String>,
}
