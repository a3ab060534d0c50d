// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message handler trait for the prioritized dispatch chain.

use async_trait::async_trait;

use crate::error::ParlorError;
use crate::types::{ConversationTurn, Reply};

/// Borrowed view of one message being dispatched.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    /// External user the message came from.
    pub user_id: &'a str,
    /// Routing identifier of the service account the user wrote to.
    pub routing_id: &'a str,
    /// Normalized text content of the message.
    pub content: &'a str,
    /// Recent conversation window, oldest first.
    pub history: &'a [ConversationTurn],
}

/// A unit of business logic that may claim and answer a message.
///
/// The dispatcher walks handlers in ascending `priority` order and the
/// first one whose `can_handle` returns true owns the message; its result
/// is final even when it is `None` (no reply). Handler authors keep
/// `can_handle` predicates narrow so ownership does not silently depend on
/// registration order.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Stable name used in logs and error reports.
    fn name(&self) -> &str;

    /// Lower runs first. The catch-all AI handler sits at `i32::MAX`.
    fn priority(&self) -> i32;

    /// Whether this handler claims the message.
    async fn can_handle(&self, content: &str, user_id: &str) -> bool;

    /// Produce the reply for a claimed message, or `None` for a silent
    /// outcome (for example while a human operator owns the conversation).
    async fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Reply>, ParlorError>;
}
