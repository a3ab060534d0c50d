// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound platform API abstraction (token, sync, send, media).

use async_trait::async_trait;

use crate::error::ParlorError;
use crate::types::{MediaRef, MessageKind, SyncPage};

/// Client for the messaging platform's HTTP API.
///
/// The webhook only carries a pointer; real message content is pulled
/// through `sync_messages`, and replies are pushed through the typed send
/// verbs. Implementations cache the access token internally.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Returns a valid access token, refreshing it when close to expiry.
    async fn access_token(&self) -> Result<String, ParlorError>;

    /// Pulls one page of queued messages.
    ///
    /// `cursor` is absent on the very first call; `token` is the one-shot
    /// credential the triggering webhook carried, when present.
    async fn sync_messages(
        &self,
        cursor: Option<&str>,
        token: Option<&str>,
    ) -> Result<SyncPage, ParlorError>;

    /// Sends a plain text message.
    async fn send_text(
        &self,
        to_user: &str,
        routing_id: &str,
        content: &str,
    ) -> Result<(), ParlorError>;

    /// Sends a media message. `kind` must not be [`MessageKind::Text`].
    async fn send_media(
        &self,
        to_user: &str,
        routing_id: &str,
        kind: MessageKind,
        media: &MediaRef,
    ) -> Result<(), ParlorError>;

    /// Uploads a temporary media object, returning its platform reference.
    async fn upload_media(
        &self,
        kind: MessageKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaRef, ParlorError>;

    /// Downloads a temporary media object.
    async fn download_media(&self, media: &MediaRef) -> Result<Vec<u8>, ParlorError>;
}
