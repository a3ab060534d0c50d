// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lottery draw handler: configured game names answered with the latest
//! draw from an external lookup.

use std::sync::Arc;

use async_trait::async_trait;
use parlor_core::{
    ConfigResolver, HandlerContext, LotteryLookup, MessageHandler, ParlorError, Reply,
};
use tracing::warn;

const LOOKUP_APOLOGY: &str = "抱歉，开奖信息暂时查询不到，请稍后再试。";

pub struct LotteryHandler {
    lookup: Arc<dyn LotteryLookup>,
    resolver: Arc<dyn ConfigResolver>,
}

impl LotteryHandler {
    pub fn new(lookup: Arc<dyn LotteryLookup>, resolver: Arc<dyn ConfigResolver>) -> Self {
        Self { lookup, resolver }
    }
}

#[async_trait]
impl MessageHandler for LotteryHandler {
    fn name(&self) -> &str {
        "lottery"
    }

    fn priority(&self) -> i32 {
        2
    }

    async fn can_handle(&self, content: &str, user_id: &str) -> bool {
        let trimmed = content.trim();
        match self.resolver.resolve_keywords(user_id).await {
            Ok(keywords) => keywords.lottery.iter().any(|g| g == trimmed),
            Err(e) => {
                warn!(user_id, error = %e, "keyword resolution failed");
                false
            }
        }
    }

    async fn handle(&self, ctx: HandlerContext<'_>) -> Result<Option<Reply>, ParlorError> {
        let game = ctx.content.trim();
        match self.lookup.latest_draw(game).await {
            Ok(text) => Ok(Some(Reply::Text(text))),
            Err(e) => {
                warn!(game, user_id = ctx.user_id, error = %e, "draw lookup failed");
                Ok(Some(Reply::Text(LOOKUP_APOLOGY.to_string())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_core::{AiProfile, KeywordProfile};

    struct StaticResolver;

    #[async_trait]
    impl ConfigResolver for StaticResolver {
        async fn resolve_ai(&self, _user_id: &str) -> Result<AiProfile, ParlorError> {
            unreachable!("not used by the lottery handler")
        }

        async fn resolve_keywords(
            &self,
            _user_id: &str,
        ) -> Result<KeywordProfile, ParlorError> {
            Ok(KeywordProfile {
                handoff_enter: vec![],
                handoff_exit: vec![],
                lottery: vec!["大乐透".into(), "双色球".into()],
            })
        }
    }

    struct FixedDraw(Option<&'static str>);

    #[async_trait]
    impl LotteryLookup for FixedDraw {
        async fn latest_draw(&self, game: &str) -> Result<String, ParlorError> {
            match self.0 {
                Some(numbers) => Ok(format!("{game} 最新开奖: {numbers}")),
                None => Err(ParlorError::Upstream {
                    message: "draw feed unavailable".into(),
                    source: None,
                }),
            }
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
    async fn configured_game_names_are_claimed() {
        let handler = LotteryHandler::new(
            Arc::new(FixedDraw(Some("01 05 12 23 34 + 02 11"))),
            Arc::new(StaticResolver),
        );

        assert!(handler.can_handle("大乐透", "u1").await);
        assert!(handler.can_handle(" 双色球 ", "u1").await);
        assert!(!handler.can_handle("大乐透怎么玩", "u1").await);

        let reply = handler.handle(ctx("大乐透")).await.unwrap();
        assert!(matches!(reply, Some(Reply::Text(t)) if t.contains("最新开奖")));
    }

    #[tokio::test]
    async fn lookup_failure_degrades_to_an_apology() {
        let handler = LotteryHandler::new(Arc::new(FixedDraw(None)), Arc::new(StaticResolver));

        let reply = handler.handle(ctx("双色球")).await.unwrap();
        assert!(matches!(reply, Some(Reply::Text(t)) if t.contains("抱歉")));
    }
}
