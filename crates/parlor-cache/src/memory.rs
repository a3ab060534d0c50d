// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process TTL cache backed by a concurrent map.
//!
//! Expiry is lazy: an entry past its deadline is treated as absent and
//! removed on the next read that touches it. Deadlines use the tokio clock
//! so tests can drive expiry with `tokio::time::advance`.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use parlor_core::{ParlorError, TtlCache};
use tokio::time::Instant;

struct Entry {
    value: String,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }
}

/// Concurrent in-memory [`TtlCache`].
#[derive(Default)]
pub struct MemoryTtlCache {
    entries: DashMap<String, Entry>,
}

impl MemoryTtlCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TtlCache for MemoryTtlCache {
    async fn get(&self, key: &str) -> Result<Option<String>, ParlorError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        // Re-check under the removal lock so a concurrent set is not lost.
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        Ok(None)
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), ParlorError> {
        let deadline = ttl.map(|ttl| Instant::now() + ttl);
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline,
            },
        );
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, ParlorError> {
        let now = Instant::now();
        match self.entries.get_mut(key) {
            Some(mut entry) if !entry.is_expired(now) => {
                entry.deadline = Some(now + ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), ParlorError> {
        self.entries.remove(key);
        Ok(())
    }
}
