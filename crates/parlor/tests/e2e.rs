// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end webhook tests: encrypted callback in, platform reply out.
//!
//! A wiremock server stands in for the platform API (gettoken, sync_msg,
//! send_msg); the webhook request is driven through the real axum router
//! with a real encrypted envelope.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use parlor_cache::MemoryTtlCache;
use parlor_config::model::{AiConfig, KeywordConfig, PlatformConfig};
use parlor_core::{
    AiProfile, CompletionBackend, ConversationTurn, KnowledgeSearch, LotteryLookup,
    MediaNormalizer, MessageHandler, ParlorError, PlatformMessage,
};
use parlor_crypto::{signature, EnvelopeKey};
use parlor_gateway::{build_router, GatewayState};
use parlor_pipeline::handlers::{
    AiHandler, HandoffHandler, KeywordRuleHandler, KnowledgeHandler, LotteryHandler,
};
use parlor_pipeline::{
    BroadcastOperatorChannel, CursorStore, DedupStore, Dispatcher, HandoffManager,
    MessageProcessor, PollStatus, ReplySender, StoredConfigResolver, SyncPoller,
};
use parlor_storage::{queries, Database, KeywordRule};
use parlor_wecom::WecomClient;
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 43-char encoding key decoding to 32 zero bytes.
const ENCODING_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
const TOKEN: &str = "cb-token";

struct CannedBackend;

#[async_trait]
impl CompletionBackend for CannedBackend {
    async fn complete(
        &self,
        _profile: &AiProfile,
        history: &[ConversationTurn],
    ) -> Result<String, ParlorError> {
        let question = history.last().map(|t| t.content.as_str()).unwrap_or("");
        Ok(format!("ai answer to: {question}"))
    }
}

struct FixedDrawFeed;

#[async_trait]
impl LotteryLookup for FixedDrawFeed {
    async fn latest_draw(&self, game: &str) -> Result<String, ParlorError> {
        Ok(format!("{game} 最新开奖: 03 07 16 22 31 + 05 09"))
    }
}

struct NoKnowledge;

#[async_trait]
impl KnowledgeSearch for NoKnowledge {
    async fn answer(
        &self,
        _user_id: &str,
        _query: &str,
    ) -> Result<Option<String>, ParlorError> {
        Ok(None)
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

struct TestStack {
    state: GatewayState,
    db: Arc<Database>,
    _dir: tempfile::TempDir,
}

async fn build_stack(platform: &MockServer) -> TestStack {
    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(
        Database::open(dir.path().join("e2e.db").to_str().unwrap())
            .await
            .unwrap(),
    );
    let cache = Arc::new(MemoryTtlCache::new());
    let envelope_key = EnvelopeKey::from_encoding_key(ENCODING_KEY).unwrap();

    let platform_config = PlatformConfig {
        token: TOKEN.to_string(),
        encoding_aes_key: ENCODING_KEY.to_string(),
        corp_id: "corp-1".to_string(),
        secret: "secret-1".to_string(),
        api_base_url: platform.uri(),
    };
    let api = Arc::new(
        WecomClient::new(&platform_config, cache.clone(), Duration::from_secs(120)).unwrap(),
    );

    let resolver = Arc::new(StoredConfigResolver::new(
        db.clone(),
        AiConfig {
            api_key: Some("sk-test".into()),
            ..AiConfig::default()
        },
        KeywordConfig {
            lottery: vec!["大乐透".into()],
            ..KeywordConfig::default()
        },
    ));
    let handoff = Arc::new(HandoffManager::new(
        cache.clone(),
        db.clone(),
        Duration::from_secs(1800),
        Arc::new(BroadcastOperatorChannel::new(16)),
    ));

    let handlers: Vec<Arc<dyn MessageHandler>> = vec![
        Arc::new(HandoffHandler::new(handoff, resolver.clone())),
        Arc::new(KeywordRuleHandler::new(db.clone())),
        Arc::new(LotteryHandler::new(Arc::new(FixedDrawFeed), resolver.clone())),
        Arc::new(KnowledgeHandler::new(Arc::new(NoKnowledge))),
        Arc::new(AiHandler::new(Arc::new(CannedBackend), resolver)),
    ];

    let processor = Arc::new(MessageProcessor::new(
        DedupStore::new(cache.clone(), db.clone(), Duration::from_secs(48 * 3600)),
        db.clone(),
        Arc::new(NoMedia),
        Dispatcher::new(handlers, db.clone(), Duration::from_secs(5)),
        ReplySender::new(api.clone(), db.clone()),
        10,
    ));

    let status = PollStatus::new();
    let poller = Arc::new(SyncPoller::new(
        api,
        CursorStore::new(cache),
        processor,
        status.clone(),
    ));

    TestStack {
        state: GatewayState {
            token: TOKEN.to_string(),
            envelope_key,
            poller,
            status,
        },
        db,
        _dir: dir,
    }
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cgi-bin/gettoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 0,
            "errmsg": "ok",
            "access_token": "AT-1",
            "expires_in": 7200
        })))
        .mount(server)
        .await;
}

fn sync_page(msg_id: &str, content: &str, cursor: &str) -> serde_json::Value {
    serde_json::json!({
        "errcode": 0,
        "errmsg": "ok",
        "next_cursor": cursor,
        "has_more": 0,
        "msg_list": [{
            "msgid": msg_id,
            "open_kfid": "kf1",
            "external_userid": "u1",
            "send_time": 1700000000,
            "msgtype": "text",
            "text": {"content": content}
        }]
    })
}

/// Build a signed, encrypted kf_msg_or_event POST.
fn webhook_request(key: &EnvelopeKey) -> Request<Body> {
    let inner = "<xml><ToUserName><![CDATA[corp-1]]></ToUserName>\
                 <Event><![CDATA[kf_msg_or_event]]></Event>\
                 <Token><![CDATA[one-shot-token]]></Token></xml>";
    let encrypted = key.encrypt(inner.as_bytes(), "corp-1").unwrap();
    let sig = signature::compute(TOKEN, "1700000000", "nonce1", &encrypted);
    let body = format!("<xml><Encrypt><![CDATA[{encrypted}]]></Encrypt></xml>");
    Request::builder()
        .method("POST")
        .uri(format!(
            "/webhook/callback?msg_signature={sig}&timestamp=1700000000&nonce=nonce1"
        ))
        .header("content-type", "text/xml")
        .body(Body::from(body))
        .unwrap()
}

async fn post_webhook(stack: &TestStack) {
    let response = build_router(stack.state.clone())
        .oneshot(webhook_request(&stack.state.envelope_key))
        .await
        .unwrap();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"success");
}

/// Wait until the platform has seen `n` send_msg calls.
async fn wait_for_sends(server: &MockServer, n: usize) -> Vec<serde_json::Value> {
    for _ in 0..200 {
        let sends = sent_bodies(server).await;
        if sends.len() >= n {
            return sends;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    sent_bodies(server).await
}

async fn sent_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/cgi-bin/kf/send_msg")
        .filter_map(|r| serde_json::from_slice(&r.body).ok())
        .collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn a_text_question_flows_to_the_ai_and_back() {
    let platform = MockServer::start().await;
    mount_token(&platform).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/sync_msg"))
        .and(body_partial_json(serde_json::json!({"token": "one-shot-token"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(sync_page("m1", "what are your hours?", "c1")),
        )
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/send_msg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"errcode": 0, "errmsg": "ok"})),
        )
        .mount(&platform)
        .await;

    let stack = build_stack(&platform).await;
    post_webhook(&stack).await;

    let sends = wait_for_sends(&platform, 1).await;
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0]["touser"], "u1");
    assert_eq!(sends[0]["open_kfid"], "kf1");
    assert_eq!(sends[0]["msgtype"], "text");
    assert_eq!(sends[0]["text"]["content"], "ai answer to: what are your hours?");

    // Both sides of the exchange are in the durable log.
    assert!(queries::turns::is_recorded(&stack.db, "m1").await.unwrap());
    assert!(stack.state.status.last_advance().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_lottery_keyword_answers_with_the_latest_draw() {
    let platform = MockServer::start().await;
    mount_token(&platform).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/sync_msg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_page("m2", "大乐透", "c1")))
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/send_msg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"errcode": 0, "errmsg": "ok"})),
        )
        .mount(&platform)
        .await;

    let stack = build_stack(&platform).await;
    post_webhook(&stack).await;

    let sends = wait_for_sends(&platform, 1).await;
    assert_eq!(sends.len(), 1);
    let content = sends[0]["text"]["content"].as_str().unwrap();
    assert!(content.starts_with("大乐透 最新开奖:"), "got {content}");
}

#[tokio::test(flavor = "multi_thread")]
async fn a_stored_keyword_rule_beats_the_ai() {
    let platform = MockServer::start().await;
    mount_token(&platform).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/sync_msg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_page("m3", "营业时间", "c1")))
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/send_msg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"errcode": 0, "errmsg": "ok"})),
        )
        .mount(&platform)
        .await;

    let stack = build_stack(&platform).await;
    queries::rules::upsert_rule(
        &stack.db,
        &KeywordRule {
            user_id: "u1".into(),
            keyword: "营业时间".into(),
            reply_kind: "text".into(),
            reply_content: "每天 9:00-18:00".into(),
        },
    )
    .await
    .unwrap();

    post_webhook(&stack).await;

    let sends = wait_for_sends(&platform, 1).await;
    assert_eq!(sends.len(), 1);
    assert_eq!(sends[0]["text"]["content"], "每天 9:00-18:00");
}

#[tokio::test(flavor = "multi_thread")]
async fn only_the_last_message_of_a_page_gets_a_reply() {
    let platform = MockServer::start().await;
    mount_token(&platform).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/sync_msg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "errcode": 0,
            "errmsg": "ok",
            "next_cursor": "c1",
            "has_more": 0,
            "msg_list": [
                {"msgid": "p1", "open_kfid": "kf1", "external_userid": "u1",
                 "send_time": 1700000000, "msgtype": "text", "text": {"content": "hi"}},
                {"msgid": "p2", "open_kfid": "kf1", "external_userid": "u1",
                 "send_time": 1700000001, "msgtype": "text", "text": {"content": "anyone there?"}},
                {"msgid": "p3", "open_kfid": "kf1", "external_userid": "u1",
                 "send_time": 1700000002, "msgtype": "text", "text": {"content": "大乐透"}}
            ]
        })))
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/send_msg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"errcode": 0, "errmsg": "ok"})),
        )
        .mount(&platform)
        .await;

    let stack = build_stack(&platform).await;
    post_webhook(&stack).await;

    // One reply, answering the page's last message.
    let sends = wait_for_sends(&platform, 1).await;
    assert_eq!(sends.len(), 1);
    assert!(sends[0]["text"]["content"]
        .as_str()
        .unwrap()
        .starts_with("大乐透 最新开奖:"));

    // The earlier messages were still consumed and logged.
    assert!(queries::turns::is_recorded(&stack.db, "p1").await.unwrap());
    assert!(queries::turns::is_recorded(&stack.db, "p2").await.unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn a_redelivered_webhook_produces_exactly_one_reply() {
    let platform = MockServer::start().await;
    mount_token(&platform).await;
    // The platform redelivers the same batch on both sync calls.
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/sync_msg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_page("m4", "hello", "c1")))
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/send_msg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"errcode": 0, "errmsg": "ok"})),
        )
        .expect(1)
        .mount(&platform)
        .await;

    let stack = build_stack(&platform).await;
    post_webhook(&stack).await;
    wait_for_sends(&platform, 1).await;

    post_webhook(&stack).await;
    // Give the second cycle time to (wrongly) reply before asserting.
    tokio::time::sleep(Duration::from_millis(200)).await;

    let sends = sent_bodies(&platform).await;
    assert_eq!(sends.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn a_handoff_keyword_silences_the_ai() {
    let platform = MockServer::start().await;
    mount_token(&platform).await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/sync_msg"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sync_page("m5", "转人工", "c1")))
        .up_to_n_times(1)
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/sync_msg"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(sync_page("m6", "my order is late", "c2")),
        )
        .mount(&platform)
        .await;
    Mock::given(method("POST"))
        .and(path("/cgi-bin/kf/send_msg"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"errcode": 0, "errmsg": "ok"})),
        )
        .mount(&platform)
        .await;

    let stack = build_stack(&platform).await;

    // First webhook: the enter keyword gets a confirmation reply.
    post_webhook(&stack).await;
    let sends = wait_for_sends(&platform, 1).await;
    assert!(sends[0]["text"]["content"]
        .as_str()
        .unwrap()
        .contains("人工客服"));
    assert!(queries::handoffs::has_open(&stack.db, "u1").await.unwrap());

    // Second webhook: the session is active, so no automated reply.
    post_webhook(&stack).await;
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(sent_bodies(&platform).await.len(), 1);
    assert!(queries::turns::is_recorded(&stack.db, "m6").await.unwrap());
}
