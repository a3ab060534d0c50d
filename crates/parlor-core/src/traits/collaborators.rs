// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Narrow interfaces to external collaborators.
//!
//! Prompt content, lottery data, knowledge-base retrieval, vision and
//! speech transcription all live outside this repository; the pipeline
//! reaches them only through these traits.

use async_trait::async_trait;

use crate::error::ParlorError;
use crate::types::{AiProfile, ConversationTurn, PlatformMessage};

/// Chat completion backend for the catch-all AI handler.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Produces an assistant reply for the given conversation window.
    async fn complete(
        &self,
        profile: &AiProfile,
        history: &[ConversationTurn],
    ) -> Result<String, ParlorError>;
}

/// Lottery draw lookup for keyword-triggered queries.
#[async_trait]
pub trait LotteryLookup: Send + Sync {
    /// Latest draw result for the named game, formatted for display.
    async fn latest_draw(&self, game: &str) -> Result<String, ParlorError>;
}

/// Knowledge-base retrieval for question answering.
#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    /// Answers `query` from the user's knowledge base, or `None` when
    /// nothing relevant is stored.
    async fn answer(&self, user_id: &str, query: &str)
        -> Result<Option<String>, ParlorError>;
}

/// Normalizes non-text messages (image caption, voice transcript, file
/// text) so the handler chain only ever sees text.
#[async_trait]
pub trait MediaNormalizer: Send + Sync {
    /// Text rendition of the message, or `None` when the collaborator
    /// cannot produce one (the pipeline degrades to an apology reply).
    async fn to_text(&self, message: &PlatformMessage)
        -> Result<Option<String>, ParlorError>;
}

/// Live push channel toward human operators during manual handoff.
#[async_trait]
pub trait OperatorChannel: Send + Sync {
    /// Forwards one user message to whoever is on duty.
    async fn forward(&self, user_id: &str, content: &str) -> Result<(), ParlorError>;

    /// One-shot notification that a new handoff request was opened.
    async fn notify_new_request(&self, user_id: &str) -> Result<(), ParlorError>;
}
