// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sync cursor persistence.
//!
//! The cursor lives in the cache without a TTL; losing it only means the
//! next sync starts from the platform's retained backlog, which dedup
//! absorbs.

use std::sync::Arc;

use parlor_cache::keys;
use parlor_core::{ParlorError, TtlCache};

#[derive(Clone)]
pub struct CursorStore {
    cache: Arc<dyn TtlCache>,
}

impl CursorStore {
    pub fn new(cache: Arc<dyn TtlCache>) -> Self {
        Self { cache }
    }

    pub async fn load(&self) -> Result<Option<String>, ParlorError> {
        self.cache.get(&keys::msg_cursor()).await
    }

    pub async fn store(&self, cursor: &str) -> Result<(), ParlorError> {
        self.cache.set(&keys::msg_cursor(), cursor, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_cache::MemoryTtlCache;

    #[tokio::test]
    async fn load_store_round_trip() {
        let store = CursorStore::new(Arc::new(MemoryTtlCache::new()));
        assert_eq!(store.load().await.unwrap(), None);
        store.store("cur-1").await.unwrap();
        store.store("cur-2").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("cur-2"));
    }
}
