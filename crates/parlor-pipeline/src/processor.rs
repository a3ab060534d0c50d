// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-message processing: dedup, logging, normalization, dispatch, reply.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parlor_core::{
    ConversationTurn, HandlerContext, MediaNormalizer, MessageKind, ParlorError,
    PlatformMessage, Reply,
};
use parlor_storage::{queries, Database, TurnRecord};
use tracing::{debug, warn};

use crate::dedup::DedupStore;
use crate::dispatcher::Dispatcher;
use crate::sender::ReplySender;

/// Sent when a media message cannot be normalized to text.
const NORMALIZE_APOLOGY: &str = "抱歉，暂时无法识别该消息内容，请用文字描述您的问题。";

/// Log content recorded for messages consumed without a reply.
const SEEN_MARKER: &str = "[auto-marked as read]";

pub struct MessageProcessor {
    dedup: DedupStore,
    db: Arc<Database>,
    normalizer: Arc<dyn MediaNormalizer>,
    dispatcher: Dispatcher,
    sender: ReplySender,
    history_turns: usize,
}

impl MessageProcessor {
    pub fn new(
        dedup: DedupStore,
        db: Arc<Database>,
        normalizer: Arc<dyn MediaNormalizer>,
        dispatcher: Dispatcher,
        sender: ReplySender,
        history_turns: usize,
    ) -> Self {
        Self {
            dedup,
            db,
            normalizer,
            dispatcher,
            sender,
            history_turns,
        }
    }

    /// Consume a message without replying: dedup mark plus a log turn.
    pub async fn mark_seen(&self, msg: &PlatformMessage) -> Result<(), ParlorError> {
        if self.dedup.is_processed(&msg.msg_id).await? {
            debug!(msg_id = %msg.msg_id, "already processed, skipping");
            return Ok(());
        }
        self.dedup.mark_processed(&msg.msg_id).await?;
        self.append_inbound(msg, SEEN_MARKER).await?;
        debug!(msg_id = %msg.msg_id, user_id = %msg.from_user, "marked seen without reply");
        Ok(())
    }

    /// Fully process one message through the handler chain.
    pub async fn process(&self, msg: &PlatformMessage) -> Result<(), ParlorError> {
        if self.dedup.is_processed(&msg.msg_id).await? {
            debug!(msg_id = %msg.msg_id, "already processed, skipping");
            return Ok(());
        }
        self.dedup.mark_processed(&msg.msg_id).await?;
        self.append_inbound(msg, &msg.content).await?;

        let content = match self.normalize(msg).await {
            Some(text) => text,
            None => {
                // Degrade rather than leaving the user without any answer.
                self.deliver_lossy(msg, &Reply::Text(NORMALIZE_APOLOGY.to_string()))
                    .await?;
                return Ok(());
            }
        };

        let history = self.history_window(&msg.from_user, &msg.to_user).await?;
        let reply = self
            .dispatcher
            .dispatch(HandlerContext {
                user_id: &msg.from_user,
                routing_id: &msg.to_user,
                content: &content,
                history: &history,
            })
            .await?;

        if let Some(reply) = reply {
            self.deliver_lossy(msg, &reply).await?;
        }
        Ok(())
    }

    /// Deliver a reply, treating a failed send as a warning.
    ///
    /// The message is already marked processed and logged at this point; a
    /// dropped reply must not abort the surrounding sync cycle. Storage and
    /// token errors still propagate.
    async fn deliver_lossy(
        &self,
        msg: &PlatformMessage,
        reply: &Reply,
    ) -> Result<(), ParlorError> {
        match self.sender.deliver(&msg.from_user, &msg.to_user, reply).await {
            Ok(()) => Ok(()),
            Err(e @ ParlorError::Delivery { .. }) => {
                warn!(
                    msg_id = %msg.msg_id,
                    user_id = %msg.from_user,
                    error = %e,
                    "reply delivery failed, dropping the reply"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Text rendition of the message, or `None` when it has to degrade.
    async fn normalize(&self, msg: &PlatformMessage) -> Option<String> {
        if msg.kind == MessageKind::Text {
            return Some(msg.content.clone());
        }
        match self.normalizer.to_text(msg).await {
            Ok(Some(text)) => Some(text),
            Ok(None) => {
                debug!(msg_id = %msg.msg_id, kind = %msg.kind, "no text rendition available");
                None
            }
            Err(e) => {
                warn!(msg_id = %msg.msg_id, kind = %msg.kind, error = %e, "normalization failed");
                None
            }
        }
    }

    async fn append_inbound(
        &self,
        msg: &PlatformMessage,
        content: &str,
    ) -> Result<(), ParlorError> {
        // append_turn returning false is the benign-duplicate backstop.
        queries::turns::append_turn(
            &self.db,
            &TurnRecord {
                msg_id: Some(msg.msg_id.clone()),
                user_id: msg.from_user.clone(),
                role: "user".to_string(),
                kind: msg.kind.to_string(),
                content: content.to_string(),
                created_at: msg.received_at.to_rfc3339(),
            },
        )
        .await?;
        Ok(())
    }

    async fn history_window(
        &self,
        user_id: &str,
        routing_id: &str,
    ) -> Result<Vec<ConversationTurn>, ParlorError> {
        let records =
            queries::turns::recent_for_user(&self.db, user_id, self.history_turns).await?;
        Ok(records
            .into_iter()
            .map(|r| {
                let (from_user, to_user) = if r.role == "assistant" {
                    (routing_id.to_string(), user_id.to_string())
                } else {
                    (user_id.to_string(), routing_id.to_string())
                };
                ConversationTurn {
                    msg_id: r.msg_id,
                    from_user,
                    to_user,
                    kind: MessageKind::from_str(&r.kind).unwrap_or(MessageKind::Text),
                    content: r.content,
                    timestamp: DateTime::parse_from_rfc3339(&r.created_at)
                        .map(|t| t.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                }
            })
            .collect())
    }
}
