// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concrete collaborator implementations wired at startup.
//!
//! The completion backend talks to any OpenAI-compatible chat endpoint.
//! The remaining collaborators (lottery feed, knowledge base, vision and
//! speech normalization) are external systems; until one is integrated the
//! unconfigured stand-ins below keep the pipeline honest about degrading.

use std::time::Duration;

use async_trait::async_trait;
use parlor_core::{
    AiProfile, CompletionBackend, ConversationTurn, KnowledgeSearch, LotteryLookup,
    MediaNormalizer, ParlorError, PlatformMessage,
};
use serde::{Deserialize, Serialize};

/// Chat completion over the OpenAI-compatible wire shape.
pub struct OpenAiBackend {
    http: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl OpenAiBackend {
    pub fn new() -> Result<Self, ParlorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ParlorError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { http })
    }

    /// Map the history window onto chat roles.
    ///
    /// The window's last turn is always the current inbound message, so its
    /// sender identifies the user side of the conversation.
    fn to_messages(profile: &AiProfile, history: &[ConversationTurn]) -> Vec<ChatMessage> {
        let user_side = history.last().map(|t| t.from_user.clone());
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ChatMessage {
            role: "system".to_string(),
            content: profile.system_prompt.clone(),
        });
        for turn in history {
            let role = if Some(&turn.from_user) == user_side.as_ref() {
                "user"
            } else {
                "assistant"
            };
            messages.push(ChatMessage {
                role: role.to_string(),
                content: turn.content.clone(),
            });
        }
        messages
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn complete(
        &self,
        profile: &AiProfile,
        history: &[ConversationTurn],
    ) -> Result<String, ParlorError> {
        let url = format!(
            "{}/chat/completions",
            profile.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &profile.model,
            messages: Self::to_messages(profile, history),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&profile.api_key)
            .json(&request)
            .send()
            .await
            .map_err(upstream_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ParlorError::Upstream {
                message: format!("completion endpoint returned {status}: {body}"),
                source: None,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(upstream_err)?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ParlorError::Upstream {
                message: "completion response carried no choices".to_string(),
                source: None,
            })
    }
}

fn upstream_err(e: reqwest::Error) -> ParlorError {
    ParlorError::Upstream {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Stand-in for a lottery draw feed that is not yet integrated.
///
/// The handler degrades its error to an apology text.
pub struct UnconfiguredLottery;

#[async_trait]
impl LotteryLookup for UnconfiguredLottery {
    async fn latest_draw(&self, game: &str) -> Result<String, ParlorError> {
        Err(ParlorError::Upstream {
            message: format!("no lottery feed configured for {game}"),
            source: None,
        })
    }
}

/// Stand-in for a knowledge base that is not yet integrated.
pub struct UnconfiguredKnowledge;

#[async_trait]
impl KnowledgeSearch for UnconfiguredKnowledge {
    async fn answer(
        &self,
        _user_id: &str,
        _query: &str,
    ) -> Result<Option<String>, ParlorError> {
        Ok(None)
    }
}

/// Stand-in for vision/speech normalization that is not yet integrated.
///
/// Media messages degrade to the pipeline's apology reply.
pub struct UnconfiguredNormalizer;

#[async_trait]
impl MediaNormalizer for UnconfiguredNormalizer {
    async fn to_text(
        &self,
        _message: &PlatformMessage,
    ) -> Result<Option<String>, ParlorError> {
        Ok(None)
    }
}
