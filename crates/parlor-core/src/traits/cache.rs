// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! TTL key-value cache abstraction.
//!
//! The dedup store, access-token cache, manual-session store, and sync
//! cursor all compose on this one small contract. Expiry is logical
//! deletion: an expired key reads as absent, never as an error.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ParlorError;

/// String key-value store with optional per-key time-to-live.
#[async_trait]
pub trait TtlCache: Send + Sync {
    /// Returns the live value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, ParlorError>;

    /// Sets `key` to `value`. `ttl = None` means the key never expires.
    async fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), ParlorError>;

    /// Resets the TTL of an existing key. Returns false if the key is
    /// absent or already expired.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, ParlorError>;

    /// Removes `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), ParlorError>;

    /// Convenience existence check.
    async fn exists(&self, key: &str) -> Result<bool, ParlorError> {
        Ok(self.get(key).await?.is_some())
    }
}
