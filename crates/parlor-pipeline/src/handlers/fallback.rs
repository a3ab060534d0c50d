// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static catch-all used when no completion backend is configured.
//!
//! The chain must end in a handler that always claims, otherwise an
//! unmatched message gets no reply at all.

use async_trait::async_trait;
use parlor_core::{HandlerContext, MessageHandler, ParlorError, Reply};

const DEFAULT_REPLY: &str = "您好，请问有什么可以帮您？发送\u{201c}人工\u{201d}可转接人工客服。";

pub struct FallbackHandler {
    reply: String,
}

impl FallbackHandler {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

impl Default for FallbackHandler {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY)
    }
}

#[async_trait]
impl MessageHandler for FallbackHandler {
    fn name(&self) -> &str {
        "static-fallback"
    }

    fn priority(&self) -> i32 {
        i32::MAX
    }

    async fn can_handle(&self, _content: &str, _user_id: &str) -> bool {
        true
    }

    async fn handle(&self, _ctx: HandlerContext<'_>) -> Result<Option<Reply>, ParlorError> {
        Ok(Some(Reply::Text(self.reply.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn claims_everything_and_replies_with_the_fixed_text() {
        let handler = FallbackHandler::default();
        assert!(handler.can_handle("anything at all", "u1").await);

        let reply = handler
            .handle(HandlerContext {
                user_id: "u1",
                routing_id: "kf1",
                content: "anything at all",
                history: &[],
            })
            .await
            .unwrap();
        assert!(matches!(reply, Some(Reply::Text(t)) if t.contains("人工")));
    }
}
