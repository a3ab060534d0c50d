// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook request handlers.
//!
//! The platform expects flat string bodies: the decrypted echo for the
//! verification handshake, "success"/"error" for event callbacks. Nothing
//! here may panic or leak internal detail to the caller; failures are
//! logged and collapse to the generic failure string.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::server::GatewayState;
use crate::xml;
use parlor_crypto::signature;

/// Event name that signals queued customer-service messages.
const SYNC_EVENT: &str = "kf_msg_or_event";

const SUCCESS: &str = "success";
const FAILURE: &str = "error";

/// Query string of the verification handshake.
#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub msg_signature: String,
    pub timestamp: String,
    pub nonce: String,
    pub echostr: String,
}

/// Query string of an event callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub msg_signature: String,
    pub timestamp: String,
    pub nonce: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339 time of the last successful cursor advance, if any.
    pub last_cursor_advance: Option<String>,
}

/// GET /webhook/callback
///
/// URL-ownership handshake: verify the signature over the encrypted
/// echostr, decrypt it, and echo the plaintext back.
pub async fn get_callback(
    State(state): State<GatewayState>,
    Query(q): Query<VerifyQuery>,
) -> String {
    if let Err(e) = signature::verify(
        &state.token,
        &q.timestamp,
        &q.nonce,
        &q.echostr,
        &q.msg_signature,
    ) {
        warn!(error = %e, "verification handshake rejected");
        return FAILURE.to_string();
    }
    match state.envelope_key.decrypt(&q.echostr) {
        Ok(envelope) => match String::from_utf8(envelope.message) {
            Ok(plain) => {
                info!("verification handshake accepted");
                plain
            }
            Err(e) => {
                warn!(error = %e, "echostr is not utf-8");
                FAILURE.to_string()
            }
        },
        Err(e) => {
            warn!(error = %e, "echostr decryption failed");
            FAILURE.to_string()
        }
    }
}

/// POST /webhook/callback
///
/// Event notification. The body only carries a pointer; a
/// `kf_msg_or_event` event spawns a sync cycle off the request task and
/// the response is returned immediately.
pub async fn post_callback(
    State(state): State<GatewayState>,
    Query(q): Query<CallbackQuery>,
    body: String,
) -> &'static str {
    let Some(encrypted) = xml::extract_element(&body, "Encrypt") else {
        warn!("callback body carries no Encrypt element");
        return FAILURE;
    };
    if let Err(e) = signature::verify(
        &state.token,
        &q.timestamp,
        &q.nonce,
        &encrypted,
        &q.msg_signature,
    ) {
        warn!(error = %e, "callback signature rejected");
        return FAILURE;
    }
    let inner = match state.envelope_key.decrypt(&encrypted) {
        Ok(envelope) => match String::from_utf8(envelope.message) {
            Ok(xml) => xml,
            Err(e) => {
                warn!(error = %e, "callback payload is not utf-8");
                return FAILURE;
            }
        },
        Err(e) => {
            warn!(error = %e, "callback decryption failed");
            return FAILURE;
        }
    };

    let event = xml::extract_element(&inner, "Event");
    match event.as_deref() {
        Some(SYNC_EVENT) => {
            let token = xml::extract_element(&inner, "Token");
            let poller = state.poller.clone();
            // The platform retries on slow responses; sync off-task.
            tokio::spawn(async move {
                if let Err(e) = poller.run_cycle(token.as_deref()).await {
                    warn!(error = %e, "sync cycle failed");
                }
            });
        }
        Some(other) => {
            debug!(event = other, "event ignored");
        }
        None => {
            debug!("callback without an Event element ignored");
        }
    }
    SUCCESS
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        last_cursor_advance: state.status.last_advance().map(|t| t.to_rfc3339()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_query_deserializes() {
        let q: VerifyQuery = serde_json::from_str(
            r#"{"msg_signature":"sig","timestamp":"1","nonce":"n","echostr":"e"}"#,
        )
        .unwrap();
        assert_eq!(q.echostr, "e");
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            last_cursor_advance: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"last_cursor_advance\":null"));
    }
}
