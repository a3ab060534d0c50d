// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the WeCom customer-service API.
//!
//! Implements [`PlatformApi`]: access token caching with a refresh margin,
//! cursor-based message sync, typed send verbs, and temporary media
//! transfer. All calls go through a pooled reqwest client with a request
//! timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parlor_cache::keys;
use parlor_config::model::PlatformConfig;
use parlor_core::{
    MediaRef, MessageKind, ParlorError, PlatformApi, PlatformMessage, SyncPage, TtlCache,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::wire::{AckResponse, SyncMessage, SyncRequest, SyncResponse, TokenResponse, UploadResponse};

/// Page size requested from sync_msg. The platform caps this at 1000.
const SYNC_LIMIT: u32 = 1000;

/// Floor for the cached token lifetime after the margin is applied.
const MIN_TOKEN_TTL: Duration = Duration::from_secs(60);

/// WeCom customer-service API client.
pub struct WecomClient {
    http: reqwest::Client,
    base_url: String,
    corp_id: String,
    secret: String,
    cache: Arc<dyn TtlCache>,
    refresh_margin: Duration,
    // Collapses concurrent refreshes into a single gettoken call.
    token_lock: Mutex<()>,
}

impl WecomClient {
    /// Build a client from platform configuration.
    pub fn new(
        config: &PlatformConfig,
        cache: Arc<dyn TtlCache>,
        refresh_margin: Duration,
    ) -> Result<Self, ParlorError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ParlorError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            corp_id: config.corp_id.clone(),
            secret: config.secret.clone(),
            cache,
            refresh_margin,
            token_lock: Mutex::new(()),
        })
    }

    async fn fetch_token(&self) -> Result<String, ParlorError> {
        let url = format!(
            "{}/cgi-bin/gettoken?corpid={}&corpsecret={}",
            self.base_url, self.corp_id, self.secret
        );
        let response: TokenResponse = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(request_err)?
            .json()
            .await
            .map_err(request_err)?;

        if response.errcode != 0 {
            return Err(ParlorError::Upstream {
                message: format!(
                    "gettoken failed: errcode {} ({})",
                    response.errcode, response.errmsg
                ),
                source: None,
            });
        }
        let token = response.access_token.ok_or_else(|| ParlorError::Upstream {
            message: "gettoken succeeded without an access_token field".to_string(),
            source: None,
        })?;

        // Cache for less than the official lifetime so a token is never
        // handed out moments before it dies upstream.
        let lifetime = Duration::from_secs(response.expires_in.unwrap_or(7200));
        let ttl = lifetime
            .checked_sub(self.refresh_margin)
            .filter(|ttl| *ttl >= MIN_TOKEN_TTL)
            .unwrap_or(MIN_TOKEN_TTL);
        self.cache
            .set(&keys::access_token(&self.corp_id), &token, Some(ttl))
            .await?;
        debug!(ttl_secs = ttl.as_secs(), "access token refreshed");
        Ok(token)
    }

    async fn send_request(
        &self,
        to_user: &str,
        routing_id: &str,
        msgtype: &str,
        body: serde_json::Value,
    ) -> Result<(), ParlorError> {
        let token = self.access_token().await?;
        let url = format!("{}/cgi-bin/kf/send_msg?access_token={token}", self.base_url);
        let request = serde_json::json!({
            "touser": to_user,
            "open_kfid": routing_id,
            "msgtype": msgtype,
            msgtype: body,
        });

        let response: AckResponse = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(delivery_err)?
            .json()
            .await
            .map_err(delivery_err)?;

        if response.errcode != 0 {
            return Err(ParlorError::Delivery {
                message: format!(
                    "send_msg ({msgtype}) failed: errcode {} ({})",
                    response.errcode, response.errmsg
                ),
                source: None,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl PlatformApi for WecomClient {
    async fn access_token(&self) -> Result<String, ParlorError> {
        let key = keys::access_token(&self.corp_id);
        if let Some(token) = self.cache.get(&key).await? {
            return Ok(token);
        }
        let _guard = self.token_lock.lock().await;
        // A concurrent caller may have refreshed while we waited.
        if let Some(token) = self.cache.get(&key).await? {
            return Ok(token);
        }
        self.fetch_token().await
    }

    async fn sync_messages(
        &self,
        cursor: Option<&str>,
        token: Option<&str>,
    ) -> Result<SyncPage, ParlorError> {
        let access_token = self.access_token().await?;
        let url = format!(
            "{}/cgi-bin/kf/sync_msg?access_token={access_token}",
            self.base_url
        );
        let response: SyncResponse = self
            .http
            .post(&url)
            .json(&SyncRequest {
                cursor,
                token,
                limit: SYNC_LIMIT,
            })
            .send()
            .await
            .map_err(request_err)?
            .json()
            .await
            .map_err(request_err)?;

        if response.errcode != 0 {
            return Err(ParlorError::Upstream {
                message: format!(
                    "sync_msg failed: errcode {} ({})",
                    response.errcode, response.errmsg
                ),
                source: None,
            });
        }

        let messages = response
            .msg_list
            .into_iter()
            .filter_map(to_platform_message)
            .collect();

        Ok(SyncPage {
            messages,
            next_cursor: response.next_cursor,
            has_more: response.has_more == 1,
        })
    }

    async fn send_text(
        &self,
        to_user: &str,
        routing_id: &str,
        content: &str,
    ) -> Result<(), ParlorError> {
        self.send_request(
            to_user,
            routing_id,
            "text",
            serde_json::json!({ "content": content }),
        )
        .await
    }

    async fn send_media(
        &self,
        to_user: &str,
        routing_id: &str,
        kind: MessageKind,
        media: &MediaRef,
    ) -> Result<(), ParlorError> {
        if kind == MessageKind::Text {
            return Err(ParlorError::Delivery {
                message: "send_media cannot deliver a text message".to_string(),
                source: None,
            });
        }
        self.send_request(
            to_user,
            routing_id,
            &kind.to_string(),
            serde_json::json!({ "media_id": media.0 }),
        )
        .await
    }

    async fn upload_media(
        &self,
        kind: MessageKind,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<MediaRef, ParlorError> {
        if kind == MessageKind::Text {
            return Err(ParlorError::Upstream {
                message: "text has no media to upload".to_string(),
                source: None,
            });
        }
        let token = self.access_token().await?;
        let url = format!(
            "{}/cgi-bin/media/upload?access_token={token}&type={kind}",
            self.base_url
        );
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("media", part);

        let response: UploadResponse = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(request_err)?
            .json()
            .await
            .map_err(request_err)?;

        if response.errcode != 0 {
            return Err(ParlorError::Upstream {
                message: format!(
                    "media upload failed: errcode {} ({})",
                    response.errcode, response.errmsg
                ),
                source: None,
            });
        }
        response
            .media_id
            .map(MediaRef)
            .ok_or_else(|| ParlorError::Upstream {
                message: "media upload succeeded without a media_id field".to_string(),
                source: None,
            })
    }

    async fn download_media(&self, media: &MediaRef) -> Result<Vec<u8>, ParlorError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/cgi-bin/media/get?access_token={token}&media_id={}",
            self.base_url, media.0
        );
        let bytes = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(request_err)?
            .bytes()
            .await
            .map_err(request_err)?;

        // Error responses come back as a JSON body instead of raw media.
        if bytes.first() == Some(&b'{') {
            if let Ok(ack) = serde_json::from_slice::<AckResponse>(&bytes) {
                if ack.errcode != 0 {
                    return Err(ParlorError::Upstream {
                        message: format!(
                            "media download failed: errcode {} ({})",
                            ack.errcode, ack.errmsg
                        ),
                        source: None,
                    });
                }
            }
        }
        Ok(bytes.to_vec())
    }
}

/// Map one sync_msg entry into the pipeline's message type.
///
/// Events and unrecognized message kinds yield `None`; the poller treats
/// the page as if they were not there.
fn to_platform_message(entry: SyncMessage) -> Option<PlatformMessage> {
    if entry.msgtype == "event" {
        debug!(
            msg_id = %entry.msgid,
            event = ?entry.event.as_ref().and_then(|e| e.event_type.as_deref()),
            "skipping event entry"
        );
        return None;
    }

    let kind: MessageKind = match entry.msgtype.parse() {
        Ok(kind) => kind,
        Err(_) => {
            warn!(msg_id = %entry.msgid, msgtype = %entry.msgtype, "unsupported message type");
            return None;
        }
    };

    let content = match kind {
        MessageKind::Text => entry.text.map(|t| t.content),
        MessageKind::Image => entry.image.map(|m| m.media_id),
        MessageKind::Voice => entry.voice.map(|m| m.media_id),
        MessageKind::Video => entry.video.map(|m| m.media_id),
        MessageKind::File => entry.file.map(|m| m.media_id),
    };
    let content = match content {
        Some(content) => content,
        None => {
            warn!(msg_id = %entry.msgid, msgtype = %entry.msgtype, "message body missing");
            return None;
        }
    };

    let (from_user, to_user) = match (entry.external_userid, entry.open_kfid) {
        (Some(from), Some(to)) => (from, to),
        _ => {
            warn!(msg_id = %entry.msgid, "message without routing ids");
            return None;
        }
    };

    let received_at: DateTime<Utc> = entry
        .send_time
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);

    Some(PlatformMessage {
        msg_id: entry.msgid,
        from_user,
        to_user,
        kind,
        content,
        received_at,
    })
}

fn request_err(e: reqwest::Error) -> ParlorError {
    ParlorError::Upstream {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}

fn delivery_err(e: reqwest::Error) -> ParlorError {
    ParlorError::Delivery {
        message: format!("HTTP request failed: {e}"),
        source: Some(Box::new(e)),
    }
}
