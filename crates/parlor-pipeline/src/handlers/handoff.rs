// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manual-handoff handler, the head of the chain.
//!
//! Claims enter/exit trigger phrases and every message of a user whose
//! session is active. While a human owns the conversation, inbound
//! messages are forwarded and the session TTL refreshed; the automated
//! chain stays silent.

use std::sync::Arc;

use async_trait::async_trait;
use parlor_core::{ConfigResolver, HandlerContext, MessageHandler, ParlorError, Reply};
use tracing::warn;

use crate::handoff::HandoffManager;

const ENTER_REPLY: &str = "已为您转接人工客服，请稍候。发送\u{201c}退出人工\u{201d}可随时返回智能服务。";
const EXIT_REPLY: &str = "您已结束人工服务，现在将由智能小助手继续为您服务。";
const NOT_IN_SESSION_REPLY: &str = "您当前未在人工服务中，智能小助手将继续为您服务。";

pub struct HandoffHandler {
    manager: Arc<HandoffManager>,
    resolver: Arc<dyn ConfigResolver>,
}

impl HandoffHandler {
    pub fn new(manager: Arc<HandoffManager>, resolver: Arc<dyn ConfigResolver>) -> Self {
        Self { manager, resolver }
    }

    fn matches(phrases: &[String], content: &str) -> bool {
        let trimmed = content.trim();
        phrases.iter().any(|p| p == trimmed)
    }
}

#[async_trait]
impl MessageHandler for HandoffHandler {
    fn name(&self) -> &str {
        "manual-handoff"
    }

    fn priority(&self) -> i32 {
        0
    }

    async fn can_handle(&self, content: &str, user_id: &str) -> bool {
        match self.manager.is_active(user_id).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(e) => {
                warn!(user_id, error = %e, "handoff state check failed");
                return false;
            }
        }
        match self.resolver.resolve_keywords(user_id).await {
            Ok(keywords) => {
                Self::matches(&keywords.handoff_enter, content)
                    || Self::matches(&keywords.handoff_exit, content)
            }
            Err(e) => {
                warn!(user_id, error = %e, "keyword resolution failed");
                false
            }
        }
    }

    async fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Reply>, ParlorError> {
        let keywords = self.resolver.resolve_keywords(ctx.user_id).await?;
        let active = self.manager.is_active(ctx.user_id).await?;

        if Self::matches(&keywords.handoff_exit, ctx.content) {
            if active {
                self.manager.exit(ctx.user_id).await?;
                return Ok(Some(Reply::Text(EXIT_REPLY.to_string())));
            }
            return Ok(Some(Reply::Text(NOT_IN_SESSION_REPLY.to_string())));
        }

        if active {
            self.manager.forward(ctx.user_id, ctx.content).await?;
            return Ok(None);
        }

        if Self::matches(&keywords.handoff_enter, ctx.content) {
            self.manager.enter(ctx.user_id).await?;
            return Ok(Some(Reply::Text(ENTER_REPLY.to_string())));
        }

        Ok(None)
    }
}
