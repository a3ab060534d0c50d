// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cursor-based sync poller.
//!
//! One cycle drains the platform's message queue: sync with the stored
//! cursor, persist `next_cursor` before touching the page, consume every
//! message but the last without replying, fully process the last, repeat
//! while the platform reports more. Advancing the cursor first means a
//! crash mid-page loses replies, never progress; dedup absorbs the overlap
//! when the platform redelivers.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use parlor_core::{ParlorError, PlatformApi};
use tracing::{debug, info, warn};

use crate::cursor::CursorStore;
use crate::processor::MessageProcessor;

/// Shared observation point for the health endpoint.
#[derive(Clone, Default)]
pub struct PollStatus {
    last_advance: Arc<RwLock<Option<DateTime<Utc>>>>,
}

impl PollStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_advance(&self) -> Option<DateTime<Utc>> {
        match self.last_advance.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn record_advance(&self) {
        let now = Some(Utc::now());
        match self.last_advance.write() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}

pub struct SyncPoller {
    api: Arc<dyn PlatformApi>,
    cursor: CursorStore,
    processor: Arc<MessageProcessor>,
    status: PollStatus,
}

impl SyncPoller {
    pub fn new(
        api: Arc<dyn PlatformApi>,
        cursor: CursorStore,
        processor: Arc<MessageProcessor>,
        status: PollStatus,
    ) -> Self {
        Self {
            api,
            cursor,
            processor,
            status,
        }
    }

    /// Drain the queue once. `webhook_token` is the one-shot credential the
    /// triggering webhook carried, when present.
    pub async fn run_cycle(&self, webhook_token: Option<&str>) -> Result<(), ParlorError> {
        let mut pages = 0usize;
        let mut total = 0usize;
        loop {
            let cursor = self.cursor.load().await?;
            let page = self
                .api
                .sync_messages(cursor.as_deref(), webhook_token)
                .await?;
            if let Some(next) = &page.next_cursor {
                self.cursor.store(next).await?;
                self.status.record_advance();
            }

            pages += 1;
            total += page.messages.len();
            debug!(
                page = pages,
                messages = page.messages.len(),
                has_more = page.has_more,
                "sync page received"
            );

            let last = page.messages.len().saturating_sub(1);
            for (i, msg) in page.messages.iter().enumerate() {
                if i < last {
                    // Only the newest message of a burst gets an answer.
                    if let Err(e) = self.processor.mark_seen(msg).await {
                        warn!(msg_id = %msg.msg_id, error = %e, "mark-seen failed");
                    }
                } else {
                    self.processor.process(msg).await?;
                }
            }

            if !page.has_more {
                break;
            }
        }
        info!(pages, messages = total, "sync cycle complete");
        Ok(())
    }
}
