// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the WeCom customer-service HTTP API.
//!
//! Every response carries `errcode`/`errmsg`; `errcode == 0` is success.
//! Unknown fields are tolerated since the platform adds fields without
//! notice.

use serde::{Deserialize, Serialize};

/// Response of `GET /cgi-bin/gettoken`.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
}

/// Body of `POST /cgi-bin/kf/sync_msg`.
#[derive(Debug, Serialize)]
pub struct SyncRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
    pub limit: u32,
}

/// Response of `POST /cgi-bin/kf/sync_msg`.
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    #[serde(default)]
    pub next_cursor: Option<String>,
    /// 1 when another page is queued.
    #[serde(default)]
    pub has_more: u8,
    #[serde(default)]
    pub msg_list: Vec<SyncMessage>,
}

/// One entry of `msg_list`. Events and messages share the envelope; the
/// `msgtype` discriminates which body field is present.
#[derive(Debug, Deserialize)]
pub struct SyncMessage {
    pub msgid: String,
    #[serde(default)]
    pub open_kfid: Option<String>,
    #[serde(default)]
    pub external_userid: Option<String>,
    #[serde(default)]
    pub send_time: Option<i64>,
    pub msgtype: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub image: Option<MediaBody>,
    #[serde(default)]
    pub voice: Option<MediaBody>,
    #[serde(default)]
    pub video: Option<MediaBody>,
    #[serde(default)]
    pub file: Option<MediaBody>,
    #[serde(default)]
    pub event: Option<EventBody>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct MediaBody {
    pub media_id: String,
}

/// Event payloads carry the routing ids one level down.
#[derive(Debug, Deserialize)]
pub struct EventBody {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub open_kfid: Option<String>,
    #[serde(default)]
    pub external_userid: Option<String>,
}

/// Generic errcode/errmsg acknowledgement.
#[derive(Debug, Deserialize)]
pub struct AckResponse {
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
}

/// Response of `POST /cgi-bin/media/upload`.
#[derive(Debug, Deserialize)]
pub struct UploadResponse {
    pub errcode: i64,
    #[serde(default)]
    pub errmsg: String,
    pub media_id: Option<String>,
}
