// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI catch-all handler, the tail of the chain.
//!
//! Claims everything nothing else wanted. Completion failures degrade to a
//! fixed text instead of erroring, so the user always hears back.

use std::sync::Arc;

use async_trait::async_trait;
use parlor_core::{
    CompletionBackend, ConfigResolver, HandlerContext, MessageHandler, ParlorError, Reply,
};
use tracing::warn;

const COMPLETION_APOLOGY: &str = "抱歉，智能小助手暂时开小差了，请稍后再试。";

pub struct AiHandler {
    backend: Arc<dyn CompletionBackend>,
    resolver: Arc<dyn ConfigResolver>,
}

impl AiHandler {
    pub fn new(backend: Arc<dyn CompletionBackend>, resolver: Arc<dyn ConfigResolver>) -> Self {
        Self { backend, resolver }
    }
}

#[async_trait]
impl MessageHandler for AiHandler {
    fn name(&self) -> &str {
        "ai-catch-all"
    }

    fn priority(&self) -> i32 {
        i32::MAX
    }

    async fn can_handle(&self, _content: &str, _user_id: &str) -> bool {
        true
    }

    async fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Reply>, ParlorError> {
        let profile = self.resolver.resolve_ai(ctx.user_id).await?;
        match self.backend.complete(&profile, ctx.history).await {
            Ok(text) if !text.trim().is_empty() => Ok(Some(Reply::Text(text))),
            Ok(_) => {
                warn!(user_id = ctx.user_id, "empty completion, degrading");
                Ok(Some(Reply::Text(COMPLETION_APOLOGY.to_string())))
            }
            Err(e) => {
                warn!(user_id = ctx.user_id, error = %e, "completion failed, degrading");
                Ok(Some(Reply::Text(COMPLETION_APOLOGY.to_string())))
            }
        }
    }
}
