// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user setting override operations.
//!
//! The resolution chain (user row, then the shared `default` row, then
//! static configuration) lives in the pipeline's resolver; this module only
//! does the row lookups.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::Database;

/// User id of the shared fallback override set.
pub const DEFAULT_USER: &str = "default";

/// Set (or replace) an override value.
pub async fn set(
    db: &Database,
    user_id: &str,
    key: &str,
    value: &str,
) -> Result<(), ParlorError> {
    let user_id = user_id.to_string();
    let key = key.to_string();
    let value = value.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO config_overrides (user_id, key, value) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, key) DO UPDATE SET value = ?3",
                params![user_id, key, value],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up one override value for an exact user id.
pub async fn get(db: &Database, user_id: &str, key: &str) -> Result<Option<String>, ParlorError> {
    let user_id = user_id.to_string();
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM config_overrides WHERE user_id = ?1 AND key = ?2",
                    params![user_id, key],
                    |row| row.get(0),
                )
                .map(Some)
                .or_else(|e| match e {
                    rusqlite::Error::QueryReturnedNoRows => Ok(None),
                    other => Err(other),
                })?;
            Ok(value)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a key for the user, falling back to the shared `default` row.
pub async fn get_with_default(
    db: &Database,
    user_id: &str,
    key: &str,
) -> Result<Option<String>, ParlorError> {
    if let Some(value) = get(db, user_id, key).await? {
        return Ok(Some(value));
    }
    get(db, DEFAULT_USER, key).await
}

/// Remove an override. Returns whether a row was removed.
pub async fn unset(db: &Database, user_id: &str, key: &str) -> Result<bool, ParlorError> {
    let user_id = user_id.to_string();
    let key = key.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "DELETE FROM config_overrides WHERE user_id = ?1 AND key = ?2",
                params![user_id, key],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
