// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge-base handler: prefix-triggered question answering.

use std::sync::Arc;

use async_trait::async_trait;
use parlor_core::{HandlerContext, KnowledgeSearch, MessageHandler, ParlorError, Reply};

/// A message containing this phrase is treated as a knowledge-base query.
const TRIGGER: &str = "知识库";

const USAGE_HINT: &str = "请在\u{201c}知识库\u{201d}后面写上您想查询的问题。";
const NO_MATCH: &str = "知识库中没有找到相关内容，您可以换个问法试试。";

pub struct KnowledgeHandler {
    search: Arc<dyn KnowledgeSearch>,
}

impl KnowledgeHandler {
    pub fn new(search: Arc<dyn KnowledgeSearch>) -> Self {
        Self { search }
    }

    /// The question with the trigger phrase removed.
    fn extract_query(content: &str) -> Option<String> {
        let trimmed = content.trim();
        if !trimmed.contains(TRIGGER) {
            return None;
        }
        Some(trimmed.replacen(TRIGGER, "", 1).trim().to_string())
    }
}

#[async_trait]
impl MessageHandler for KnowledgeHandler {
    fn name(&self) -> &str {
        "knowledge-base"
    }

    fn priority(&self) -> i32 {
        5
    }

    async fn can_handle(&self, content: &str, _user_id: &str) -> bool {
        content.contains(TRIGGER)
    }

    async fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Reply>, ParlorError> {
        let Some(query) = Self::extract_query(ctx.content) else {
            return Ok(None);
        };
        if query.is_empty() {
            return Ok(Some(Reply::Text(USAGE_HINT.to_string())));
        }
        let reply = match self.search.answer(ctx.user_id, &query).await? {
            Some(answer) => answer,
            None => NO_MATCH.to_string(),
        };
        Ok(Some(Reply::Text(reply)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingSearch {
        answer: Option<&'static str>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl KnowledgeSearch for RecordingSearch {
        async fn answer(
            &self,
            _user_id: &str,
            query: &str,
        ) -> Result<Option<String>, ParlorError> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(self.answer.map(str::to_string))
        }
    }

    fn ctx<'a>(content: &'a str) -> HandlerContext<'a> {
        HandlerContext {
            user_id: "u1",
            routing_id: "kf1",
            content,
            history: &[],
        }
    }

    #[tokio::test]
    async fn trigger_phrase_is_stripped_from_the_query() {
        let search = Arc::new(RecordingSearch {
            answer: Some("退货在订单页发起，七天内有效。"),
            queries: Mutex::new(Vec::new()),
        });
        let handler = KnowledgeHandler::new(search.clone());

        assert!(handler.can_handle("知识库 如何退货", "u1").await);
        let reply = handler.handle(ctx("知识库 如何退货")).await.unwrap();

        assert!(matches!(reply, Some(Reply::Text(t)) if t.contains("退货")));
        assert_eq!(search.queries.lock().unwrap().as_slice(), ["如何退货"]);
    }

    #[tokio::test]
    async fn bare_trigger_gets_a_usage_hint() {
        let handler = KnowledgeHandler::new(Arc::new(RecordingSearch {
            answer: None,
            queries: Mutex::new(Vec::new()),
        }));

        let reply = handler.handle(ctx("知识库")).await.unwrap();
        assert!(matches!(reply, Some(Reply::Text(t)) if t.contains("问题")));
    }

    #[tokio::test]
    async fn no_stored_answer_says_so() {
        let handler = KnowledgeHandler::new(Arc::new(RecordingSearch {
            answer: None,
            queries: Mutex::new(Vec::new()),
        }));

        let reply = handler.handle(ctx("知识库 发票怎么开")).await.unwrap();
        assert!(matches!(reply, Some(Reply::Text(t)) if t.contains("没有找到")));
    }

    #[tokio::test]
    async fn untriggered_messages_are_not_claimed() {
        let handler = KnowledgeHandler::new(Arc::new(RecordingSearch {
            answer: None,
            queries: Mutex::new(Vec::new()),
        }));
        assert!(!handler.can_handle("如何退货", "u1").await);
    }
}
