// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword rule handler: per-user canned replies out of storage.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use parlor_core::{
    HandlerContext, MediaRef, MessageHandler, MessageKind, ParlorError, Reply,
};
use parlor_storage::{queries, Database};
use tracing::warn;

pub struct KeywordRuleHandler {
    db: Arc<Database>,
}

impl KeywordRuleHandler {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// First rule whose keyword equals the trimmed content; user rows
    /// shadow the shared defaults.
    async fn matching_rule(
        &self,
        content: &str,
        user_id: &str,
    ) -> Result<Option<parlor_storage::KeywordRule>, ParlorError> {
        let trimmed = content.trim();
        let rules = queries::rules::effective_for_user(&self.db, user_id).await?;
        Ok(rules.into_iter().find(|r| r.keyword == trimmed))
    }
}

#[async_trait]
impl MessageHandler for KeywordRuleHandler {
    fn name(&self) -> &str {
        "keyword-rules"
    }

    fn priority(&self) -> i32 {
        1
    }

    async fn can_handle(&self, content: &str, user_id: &str) -> bool {
        match self.matching_rule(content, user_id).await {
            Ok(rule) => rule.is_some(),
            Err(e) => {
                warn!(user_id, error = %e, "keyword rule lookup failed");
                false
            }
        }
    }

    async fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Reply>, ParlorError> {
        let Some(rule) = self.matching_rule(ctx.content, ctx.user_id).await? else {
            return Ok(None);
        };
        let kind = MessageKind::from_str(&rule.reply_kind).map_err(|_| {
            ParlorError::Handler {
                name: self.name().to_string(),
                message: format!("unknown reply kind {:?}", rule.reply_kind),
            }
        })?;
        let reply = match kind {
            MessageKind::Text => Reply::Text(rule.reply_content),
            MessageKind::Image => Reply::Image(MediaRef(rule.reply_content)),
            MessageKind::Voice => Reply::Voice(MediaRef(rule.reply_content)),
            MessageKind::Video => Reply::Video(MediaRef(rule.reply_content)),
            MessageKind::File => Reply::File(MediaRef(rule.reply_content)),
        };
        Ok(Some(reply))
    }
}
