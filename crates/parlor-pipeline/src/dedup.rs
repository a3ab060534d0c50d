// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-level message dedup.
//!
//! The TTL cache answers the common case; the durable conversation log
//! (UNIQUE on msg_id) backstops cache loss and concurrent poll cycles.

use std::sync::Arc;
use std::time::Duration;

use parlor_cache::keys;
use parlor_core::{ParlorError, TtlCache};
use parlor_storage::{queries, Database};

pub struct DedupStore {
    cache: Arc<dyn TtlCache>,
    db: Arc<Database>,
    ttl: Duration,
}

impl DedupStore {
    pub fn new(cache: Arc<dyn TtlCache>, db: Arc<Database>, ttl: Duration) -> Self {
        Self { cache, db, ttl }
    }

    /// Cache first, durable log second.
    pub async fn is_processed(&self, msg_id: &str) -> Result<bool, ParlorError> {
        if self.cache.exists(&keys::processed_msg(msg_id)).await? {
            return Ok(true);
        }
        queries::turns::is_recorded(&self.db, msg_id).await
    }

    pub async fn mark_processed(&self, msg_id: &str) -> Result<(), ParlorError> {
        self.cache
            .set(&keys::processed_msg(msg_id), "processed", Some(self.ttl))
            .await
    }
}
