// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parlor serve` command implementation.
//!
//! Wires the full pipeline (cache, storage, platform client, handler
//! chain, poller) into the webhook server and runs until a shutdown
//! signal arrives.

use std::sync::Arc;
use std::time::Duration;

use parlor_cache::MemoryTtlCache;
use parlor_config::model::ParlorConfig;
use parlor_core::{MessageHandler, ParlorError};
use parlor_crypto::EnvelopeKey;
use parlor_gateway::GatewayState;
use parlor_pipeline::handlers::{
    AiHandler, FallbackHandler, HandoffHandler, KeywordRuleHandler, KnowledgeHandler,
    LotteryHandler,
};
use parlor_pipeline::{
    BroadcastOperatorChannel, CursorStore, DedupStore, Dispatcher, HandoffManager,
    MessageProcessor, PollStatus, ReplySender, StoredConfigResolver, SyncPoller,
};
use parlor_storage::Database;
use parlor_wecom::WecomClient;
use tracing::info;

use crate::collaborators::{
    OpenAiBackend, UnconfiguredKnowledge, UnconfiguredLottery, UnconfiguredNormalizer,
};
use crate::shutdown;

/// Runs the `parlor serve` command.
pub async fn run_serve(config: ParlorConfig) -> Result<(), ParlorError> {
    init_tracing(&config.server.log_level);

    info!("starting parlor serve");

    let (state, db) = build_gateway_state(&config).await?;

    let cancel = shutdown::install_signal_handler();
    parlor_gateway::start_server(
        &config.server.bind_address,
        config.server.port,
        state,
        cancel.cancelled_owned(),
    )
    .await?;

    info!("webhook server stopped, closing storage");
    db.close().await?;
    Ok(())
}

/// Assemble every pipeline component behind the webhook server.
pub async fn build_gateway_state(
    config: &ParlorConfig,
) -> Result<(GatewayState, Arc<Database>), ParlorError> {
    let db = Arc::new(Database::open(&config.storage.database_path).await?);
    let cache = Arc::new(MemoryTtlCache::new());
    let envelope_key = EnvelopeKey::from_encoding_key(&config.platform.encoding_aes_key)?;

    let api = Arc::new(WecomClient::new(
        &config.platform,
        cache.clone(),
        Duration::from_secs(config.cache.token_refresh_margin_secs),
    )?);

    let resolver = Arc::new(StoredConfigResolver::new(
        db.clone(),
        config.ai.clone(),
        config.keywords.clone(),
    ));
    let operators = Arc::new(BroadcastOperatorChannel::new(64));
    let handoff = Arc::new(HandoffManager::new(
        cache.clone(),
        db.clone(),
        Duration::from_secs(config.cache.handoff_ttl_minutes * 60),
        operators,
    ));

    let mut handlers: Vec<Arc<dyn MessageHandler>> = vec![
        Arc::new(HandoffHandler::new(handoff, resolver.clone())),
        Arc::new(KeywordRuleHandler::new(db.clone())),
        Arc::new(LotteryHandler::new(
            Arc::new(UnconfiguredLottery),
            resolver.clone(),
        )),
        Arc::new(KnowledgeHandler::new(Arc::new(UnconfiguredKnowledge))),
    ];
    // The chain always ends in a handler that claims everything.
    if config.ai.api_key.is_some() {
        handlers.push(Arc::new(AiHandler::new(
            Arc::new(OpenAiBackend::new()?),
            resolver,
        )));
    } else {
        info!("ai.api_key not set, using the static fallback reply");
        handlers.push(Arc::new(FallbackHandler::default()));
    }

    let dispatcher = Dispatcher::new(
        handlers,
        db.clone(),
        Duration::from_secs(config.pipeline.handler_timeout_secs),
    );
    let processor = Arc::new(MessageProcessor::new(
        DedupStore::new(
            cache.clone(),
            db.clone(),
            Duration::from_secs(config.cache.dedup_ttl_hours * 3600),
        ),
        db.clone(),
        Arc::new(UnconfiguredNormalizer),
        dispatcher,
        ReplySender::new(api.clone(), db.clone()),
        config.pipeline.history_turns,
    ));

    let status = PollStatus::new();
    let poller = Arc::new(SyncPoller::new(
        api,
        CursorStore::new(cache),
        processor,
        status.clone(),
    ));

    Ok((
        GatewayState {
            token: config.platform.token.clone(),
            envelope_key,
            poller,
            status,
        },
        db,
    ))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("parlor={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
