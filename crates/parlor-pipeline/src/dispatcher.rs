// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prioritized handler chain.
//!
//! Handlers are walked in ascending priority order. The first handler that
//! claims the message owns it: its reply (or deliberate silence) is final.
//! A handler that fails or runs past the timeout is skipped and the walk
//! continues, so a broken specialist never blanks the catch-all.

use std::sync::Arc;
use std::time::Duration;

use parlor_core::{HandlerContext, MessageHandler, ParlorError, Reply};
use parlor_storage::{queries, Database};
use tracing::{debug, info, warn};

pub struct Dispatcher {
    handlers: Vec<Arc<dyn MessageHandler>>,
    db: Arc<Database>,
    handler_timeout: Duration,
}

impl Dispatcher {
    /// Handlers are sorted once at construction; ties keep insertion order.
    pub fn new(
        mut handlers: Vec<Arc<dyn MessageHandler>>,
        db: Arc<Database>,
        handler_timeout: Duration,
    ) -> Self {
        handlers.sort_by_key(|h| h.priority());
        Self {
            handlers,
            db,
            handler_timeout,
        }
    }

    /// Walk the chain for one normalized text message.
    ///
    /// `Ok(None)` means silence: blocked sender, no handler claimed the
    /// message, or the owning handler chose not to reply.
    pub async fn dispatch(
        &self,
        ctx: HandlerContext<'_>,
    ) -> Result<Option<Reply>, ParlorError> {
        if queries::blocklist::is_blocked(&self.db, ctx.user_id).await? {
            info!(user_id = ctx.user_id, "blocked sender, message dropped");
            return Ok(None);
        }

        for handler in &self.handlers {
            if !handler.can_handle(ctx.content, ctx.user_id).await {
                continue;
            }
            debug!(
                handler = handler.name(),
                priority = handler.priority(),
                user_id = ctx.user_id,
                "handler claimed message"
            );
            match tokio::time::timeout(self.handler_timeout, handler.handle(ctx)).await {
                Ok(Ok(reply)) => return Ok(reply),
                Ok(Err(e)) => {
                    warn!(
                        handler = handler.name(),
                        user_id = ctx.user_id,
                        error = %e,
                        "handler failed, trying next"
                    );
                }
                Err(_) => {
                    warn!(
                        handler = handler.name(),
                        user_id = ctx.user_id,
                        timeout_secs = self.handler_timeout.as_secs(),
                        "handler timed out, trying next"
                    );
                }
            }
        }

        debug!(user_id = ctx.user_id, "no handler claimed message");
        Ok(None)
    }
}
