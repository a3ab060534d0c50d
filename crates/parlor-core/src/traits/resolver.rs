// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user configuration resolution.

use async_trait::async_trait;

use crate::error::ParlorError;
use crate::types::{AiProfile, KeywordProfile};

/// Resolves effective settings for a user.
///
/// The fallback chain (per-user row, then the shared "default" row, then
/// static configuration) lives entirely behind this trait; the dispatcher
/// and handlers only ever see the resolved result.
#[async_trait]
pub trait ConfigResolver: Send + Sync {
    /// Effective AI settings for `user_id`.
    async fn resolve_ai(&self, user_id: &str) -> Result<AiProfile, ParlorError>;

    /// Effective trigger keywords for `user_id`.
    async fn resolve_keywords(&self, user_id: &str) -> Result<KeywordProfile, ParlorError>;
}
