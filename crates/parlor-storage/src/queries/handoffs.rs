// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Manual handoff request operations.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::Database;
use crate::models::HandoffRequest;

/// Record a new handoff request, returning its row id.
pub async fn open_request(
    db: &Database,
    user_id: &str,
    opened_at: &str,
) -> Result<i64, ParlorError> {
    let user_id = user_id.to_string();
    let opened_at = opened_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO handoff_requests (user_id, opened_at, resolved)
                 VALUES (?1, ?2, 0)",
                params![user_id, opened_at],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark every open request of a user resolved. Returns the number closed.
pub async fn resolve_for_user(
    db: &Database,
    user_id: &str,
    resolved_at: &str,
) -> Result<usize, ParlorError> {
    let user_id = user_id.to_string();
    let resolved_at = resolved_at.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "UPDATE handoff_requests SET resolved = 1, resolved_at = ?2
                 WHERE user_id = ?1 AND resolved = 0",
                params![user_id, resolved_at],
            )?;
            Ok(n)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether a user has an open request.
pub async fn has_open(db: &Database, user_id: &str) -> Result<bool, ParlorError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM handoff_requests
                 WHERE user_id = ?1 AND resolved = 0)",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All open requests, oldest first. The operator admin queue.
pub async fn list_open(db: &Database) -> Result<Vec<HandoffRequest>, ParlorError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, opened_at, resolved, resolved_at
                 FROM handoff_requests WHERE resolved = 0 ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(HandoffRequest {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    opened_at: row.get(2)?,
                    resolved: row.get::<_, i64>(3)? != 0,
                    resolved_at: row.get(4)?,
                })
            })?;
            let mut requests = Vec::new();
            for row in rows {
                requests.push(row?);
            }
            Ok(requests)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
