// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored-override config resolution.
//!
//! Each setting resolves per-user row, then the shared `default` row, then
//! the static configuration file. List-valued overrides are stored as JSON
//! arrays; a malformed row is logged and skipped rather than failing the
//! message that triggered the lookup.

use std::sync::Arc;

use async_trait::async_trait;
use parlor_config::{AiConfig, KeywordConfig};
use parlor_core::{AiProfile, ConfigResolver, KeywordProfile, ParlorError};
use parlor_storage::{queries, Database};
use tracing::warn;

pub struct StoredConfigResolver {
    db: Arc<Database>,
    ai: AiConfig,
    keywords: KeywordConfig,
}

impl StoredConfigResolver {
    pub fn new(db: Arc<Database>, ai: AiConfig, keywords: KeywordConfig) -> Self {
        Self { db, ai, keywords }
    }

    async fn lookup(&self, user_id: &str, key: &str) -> Result<Option<String>, ParlorError> {
        queries::overrides::get_with_default(&self.db, user_id, key).await
    }

    async fn lookup_list(
        &self,
        user_id: &str,
        key: &str,
        fallback: &[String],
    ) -> Result<Vec<String>, ParlorError> {
        match self.lookup(user_id, key).await? {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => Ok(list),
                Err(e) => {
                    warn!(user_id, key, error = %e, "malformed list override ignored");
                    Ok(fallback.to_vec())
                }
            },
            None => Ok(fallback.to_vec()),
        }
    }
}

#[async_trait]
impl ConfigResolver for StoredConfigResolver {
    async fn resolve_ai(&self, user_id: &str) -> Result<AiProfile, ParlorError> {
        let base_url = self
            .lookup(user_id, "ai.base_url")
            .await?
            .unwrap_or_else(|| self.ai.base_url.clone());
        let api_key = match self.lookup(user_id, "ai.api_key").await? {
            Some(key) => key,
            None => self.ai.api_key.clone().unwrap_or_default(),
        };
        let model = self
            .lookup(user_id, "ai.model")
            .await?
            .unwrap_or_else(|| self.ai.model.clone());
        let system_prompt = self
            .lookup(user_id, "ai.system_prompt")
            .await?
            .unwrap_or_else(|| self.ai.system_prompt.clone());
        Ok(AiProfile {
            base_url,
            api_key,
            model,
            system_prompt,
        })
    }

    async fn resolve_keywords(&self, user_id: &str) -> Result<KeywordProfile, ParlorError> {
        Ok(KeywordProfile {
            handoff_enter: self
                .lookup_list(user_id, "keywords.handoff_enter", &self.keywords.handoff_enter)
                .await?,
            handoff_exit: self
                .lookup_list(user_id, "keywords.handoff_exit", &self.keywords.handoff_exit)
                .await?,
            lottery: self
                .lookup_list(user_id, "keywords.lottery", &self.keywords.lottery)
                .await?,
        })
    }
}
