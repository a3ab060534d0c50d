// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use parlor_core::ParlorError;
use parlor_crypto::EnvelopeKey;
use parlor_pipeline::{PollStatus, SyncPoller};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Webhook verification token.
    pub token: String,
    /// Envelope key for callback payloads.
    pub envelope_key: EnvelopeKey,
    /// Poller spawned on `kf_msg_or_event`.
    pub poller: Arc<SyncPoller>,
    /// Health observation point.
    pub status: PollStatus,
}

/// Assemble the webhook router.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route(
            "/webhook/callback",
            get(handlers::get_callback).post(handlers::post_callback),
        )
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server(
    bind_address: &str,
    port: u16,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ParlorError> {
    let app = build_router(state);
    let addr = format!("{bind_address}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ParlorError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("webhook server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ParlorError::Internal(format!("webhook server error: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use parlor_cache::MemoryTtlCache;
    use parlor_core::{
        HandlerContext, MediaNormalizer, MediaRef, MessageHandler, MessageKind, ParlorError,
        PlatformApi, PlatformMessage, Reply, SyncPage,
    };
    use parlor_crypto::signature;
    use parlor_pipeline::{
        CursorStore, DedupStore, Dispatcher, MessageProcessor, ReplySender,
    };
    use parlor_storage::Database;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::ServiceExt;

    /// 43-char encoding key that decodes to 32 zero bytes.
    const ENCODING_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
    const TOKEN: &str = "webhook-token";

    struct ScriptedApi {
        pages: Mutex<Vec<SyncPage>>,
        sent: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PlatformApi for ScriptedApi {
        async fn access_token(&self) -> Result<String, ParlorError> {
            Ok("token".into())
        }

        async fn sync_messages(
            &self,
            _cursor: Option<&str>,
            _token: Option<&str>,
        ) -> Result<SyncPage, ParlorError> {
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                return Ok(SyncPage::default());
            }
            Ok(pages.remove(0))
        }

        async fn send_text(
            &self,
            to_user: &str,
            _routing_id: &str,
            content: &str,
        ) -> Result<(), ParlorError> {
            self.sent
                .lock()
                .unwrap()
                .push(format!("{to_user}:{content}"));
            Ok(())
        }

        async fn send_media(
            &self,
            _to_user: &str,
            _routing_id: &str,
            _kind: MessageKind,
            _media: &MediaRef,
        ) -> Result<(), ParlorError> {
            Ok(())
        }

        async fn upload_media(
            &self,
            _kind: MessageKind,
            _filename: &str,
            _bytes: Vec<u8>,
        ) -> Result<MediaRef, ParlorError> {
            Ok(MediaRef("m".into()))
        }

        async fn download_media(&self, _media: &MediaRef) -> Result<Vec<u8>, ParlorError> {
            Ok(Vec::new())
        }
    }

    struct EchoHandler;

    #[async_trait]
    impl MessageHandler for EchoHandler {
        fn name(&self) -> &str {
            "echo"
        }

        fn priority(&self) -> i32 {
            i32::MAX
        }

        async fn can_handle(&self, _content: &str, _user_id: &str) -> bool {
            true
        }

        async fn handle(
            &self,
            ctx: HandlerContext<'_>,
        ) -> Result<Option<Reply>, ParlorError> {
            Ok(Some(Reply::Text(format!("echo: {}", ctx.content))))
        }
    }

    struct NoMedia;

    #[async_trait]
    impl MediaNormalizer for NoMedia {
        async fn to_text(
            &self,
            _message: &PlatformMessage,
        ) -> Result<Option<String>, ParlorError> {
            Ok(None)
        }
    }

    async fn build_state(
        pages: Vec<SyncPage>,
    ) -> (GatewayState, Arc<ScriptedApi>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db = Arc::new(
            Database::open(dir.path().join("test.db").to_str().unwrap())
                .await
                .unwrap(),
        );
        let api = Arc::new(ScriptedApi {
            pages: Mutex::new(pages),
            sent: Mutex::new(Vec::new()),
        });
        let cache = Arc::new(MemoryTtlCache::new());
        let status = PollStatus::new();
        let processor = Arc::new(MessageProcessor::new(
            DedupStore::new(cache.clone(), db.clone(), Duration::from_secs(48 * 3600)),
            db.clone(),
            Arc::new(NoMedia),
            Dispatcher::new(
                vec![Arc::new(EchoHandler)],
                db.clone(),
                Duration::from_secs(5),
            ),
            ReplySender::new(api.clone(), db.clone()),
            10,
        ));
        let poller = Arc::new(SyncPoller::new(
            api.clone(),
            CursorStore::new(cache),
            processor,
            status.clone(),
        ));
        let state = GatewayState {
            token: TOKEN.to_string(),
            envelope_key: EnvelopeKey::from_encoding_key(ENCODING_KEY).unwrap(),
            poller,
            status,
        };
        (state, api, dir)
    }

    /// Percent-encode the base64 characters that are special in a query.
    fn query_encode(s: &str) -> String {
        s.replace('%', "%25")
            .replace('+', "%2B")
            .replace('/', "%2F")
            .replace('=', "%3D")
    }

    fn page_with(content: &str) -> SyncPage {
        SyncPage {
            messages: vec![PlatformMessage {
                msg_id: "m1".to_string(),
                from_user: "u1".to_string(),
                to_user: "kf1".to_string(),
                kind: MessageKind::Text,
                content: content.to_string(),
                received_at: Utc::now(),
            }],
            next_cursor: Some("c1".into()),
            has_more: false,
        }
    }

    fn event_body(key: &EnvelopeKey, event: &str) -> (String, String) {
        let inner = format!(
            "<xml><ToUserName><![CDATA[corp]]></ToUserName>\
             <Event><![CDATA[{event}]]></Event>\
             <Token><![CDATA[sync-token-1]]></Token></xml>"
        );
        let encrypted = key.encrypt(inner.as_bytes(), "corp").unwrap();
        let signature = signature::compute(TOKEN, "1700000000", "nonce1", &encrypted);
        let body = format!("<xml><Encrypt><![CDATA[{encrypted}]]></Encrypt></xml>");
        (body, signature)
    }

    #[tokio::test]
    async fn handshake_echoes_the_decrypted_plaintext() {
        let (state, _api, _dir) = build_state(vec![]).await;
        let echostr = state
            .envelope_key
            .encrypt(b"echo-plain-7531", "corp")
            .unwrap();
        let sig = signature::compute(TOKEN, "1700000000", "nonce1", &echostr);
        let uri = format!(
            "/webhook/callback?msg_signature={sig}&timestamp=1700000000&nonce=nonce1&echostr={}",
            query_encode(&echostr)
        );

        let response = build_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"echo-plain-7531");
    }

    #[tokio::test]
    async fn handshake_with_a_bad_signature_fails_generically() {
        let (state, _api, _dir) = build_state(vec![]).await;
        let echostr = state.envelope_key.encrypt(b"plain", "corp").unwrap();
        let uri = format!(
            "/webhook/callback?msg_signature=deadbeef&timestamp=1700000000&nonce=nonce1&echostr={}",
            query_encode(&echostr)
        );

        let response = build_router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"error");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn a_sync_event_triggers_the_poller() {
        let (state, api, _dir) = build_state(vec![page_with("hello")]).await;
        let (body, sig) = event_body(&state.envelope_key, "kf_msg_or_event");
        let uri = format!(
            "/webhook/callback?msg_signature={sig}&timestamp=1700000000&nonce=nonce1"
        );

        let response = build_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "text/xml")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let resp_body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&resp_body[..], b"success");

        // The sync cycle runs off the request task.
        for _ in 0..100 {
            if !api.sent.lock().unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(api.sent.lock().unwrap().as_slice(), ["u1:echo: hello"]);
        assert!(state.status.last_advance().is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn other_events_return_success_without_syncing() {
        let (state, api, _dir) = build_state(vec![page_with("never")]).await;
        let (body, sig) = event_body(&state.envelope_key, "enter_session");
        let uri = format!(
            "/webhook/callback?msg_signature={sig}&timestamp=1700000000&nonce=nonce1"
        );

        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        let resp_body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&resp_body[..], b"success");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(api.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn tampered_callback_bodies_fail_generically() {
        let (state, _api, _dir) = build_state(vec![]).await;
        let (_body, sig) = event_body(&state.envelope_key, "kf_msg_or_event");
        let uri = format!(
            "/webhook/callback?msg_signature={sig}&timestamp=1700000000&nonce=nonce1"
        );

        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .body(Body::from("<xml><Encrypt><![CDATA[dGFtcGVyZWQ=]]></Encrypt></xml>"))
                    .unwrap(),
            )
            .await
            .unwrap();

        let resp_body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&resp_body[..], b"error");
    }

    #[tokio::test]
    async fn health_reports_ok_before_any_sync() {
        let (state, _api, _dir) = build_state(vec![]).await;

        let response = build_router(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json["last_cursor_advance"].is_null());
    }
}
