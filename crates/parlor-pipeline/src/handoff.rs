// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manual handoff state machine.
//!
//! A user is human-served exactly while their `manual_mode:{user}` cache
//! entry is alive. Entry creates an unresolved handoff-request row and
//! notifies operators; every forwarded message refreshes the TTL; exit
//! (keyword, operator action, or TTL lapse) returns the user to the
//! assistant.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use parlor_cache::keys;
use parlor_core::{OperatorChannel, ParlorError, TtlCache};
use parlor_storage::{queries, Database};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

pub struct HandoffManager {
    cache: Arc<dyn TtlCache>,
    db: Arc<Database>,
    ttl: Duration,
    operators: Arc<dyn OperatorChannel>,
}

impl HandoffManager {
    pub fn new(
        cache: Arc<dyn TtlCache>,
        db: Arc<Database>,
        ttl: Duration,
        operators: Arc<dyn OperatorChannel>,
    ) -> Self {
        Self {
            cache,
            db,
            ttl,
            operators,
        }
    }

    /// Whether the user is currently human-served.
    pub async fn is_active(&self, user_id: &str) -> Result<bool, ParlorError> {
        self.cache.exists(&keys::manual_mode(user_id)).await
    }

    /// Open a session: cache flag, durable request row, operator ping.
    pub async fn enter(&self, user_id: &str) -> Result<(), ParlorError> {
        self.cache
            .set(&keys::manual_mode(user_id), "1", Some(self.ttl))
            .await?;
        queries::handoffs::open_request(&self.db, user_id, &Utc::now().to_rfc3339()).await?;
        if let Err(e) = self.operators.notify_new_request(user_id).await {
            warn!(user_id, error = %e, "operator notification failed");
        }
        info!(user_id, ttl_secs = self.ttl.as_secs(), "manual handoff opened");
        Ok(())
    }

    /// Close the session and mark the user's open requests resolved.
    pub async fn exit(&self, user_id: &str) -> Result<(), ParlorError> {
        self.cache.delete(&keys::manual_mode(user_id)).await?;
        let resolved =
            queries::handoffs::resolve_for_user(&self.db, user_id, &Utc::now().to_rfc3339())
                .await?;
        info!(user_id, resolved, "manual handoff closed");
        Ok(())
    }

    /// Forward one user message to the operators and refresh the TTL.
    ///
    /// Activity from either side keeps the session alive.
    pub async fn forward(&self, user_id: &str, content: &str) -> Result<(), ParlorError> {
        if let Err(e) = self.operators.forward(user_id, content).await {
            warn!(user_id, error = %e, "operator forward failed");
        }
        self.refresh(user_id).await
    }

    /// Refresh the session TTL. A no-op when the session already lapsed.
    pub async fn refresh(&self, user_id: &str) -> Result<(), ParlorError> {
        let refreshed = self
            .cache
            .expire(&keys::manual_mode(user_id), self.ttl)
            .await?;
        if !refreshed {
            debug!(user_id, "refresh on lapsed handoff session ignored");
        }
        Ok(())
    }
}

/// Event published to connected operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorEvent {
    /// A user message forwarded during an active session.
    Message { user_id: String, content: String },
    /// A new handoff request was opened.
    NewRequest { user_id: String },
}

/// In-process operator push over a tokio broadcast channel.
///
/// Stands in for a live operator console feed; delivery is best-effort
/// and a missing subscriber is not an error.
pub struct BroadcastOperatorChannel {
    tx: broadcast::Sender<OperatorEvent>,
}

impl BroadcastOperatorChannel {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<OperatorEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl OperatorChannel for BroadcastOperatorChannel {
    async fn forward(&self, user_id: &str, content: &str) -> Result<(), ParlorError> {
        // send only fails when nobody is subscribed.
        let _ = self.tx.send(OperatorEvent::Message {
            user_id: user_id.to_string(),
            content: content.to_string(),
        });
        Ok(())
    }

    async fn notify_new_request(&self, user_id: &str) -> Result<(), ParlorError> {
        let _ = self.tx.send(OperatorEvent::NewRequest {
            user_id: user_id.to_string(),
        });
        Ok(())
    }
}
