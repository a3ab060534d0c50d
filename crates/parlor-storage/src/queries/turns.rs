// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation turn operations.

use parlor_core::ParlorError;
use rusqlite::params;
use tracing::trace;

use crate::database::Database;
use crate::models::TurnRecord;

/// Append one turn.
///
/// Returns `false` when the turn's `msg_id` already exists: the UNIQUE
/// constraint is the durable backstop behind the dedup cache, and a hit
/// means a redelivered webhook raced us. That is not an error.
pub async fn append_turn(db: &Database, turn: &TurnRecord) -> Result<bool, ParlorError> {
    let turn = turn.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO turns (msg_id, user_id, role, kind, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    turn.msg_id,
                    turn.user_id,
                    turn.role,
                    turn.kind,
                    turn.content,
                    turn.created_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    trace!(msg_id = ?turn.msg_id, "duplicate turn insert ignored");
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether a message id has already been recorded.
pub async fn is_recorded(db: &Database, msg_id: &str) -> Result<bool, ParlorError> {
    let msg_id = msg_id.to_string();
    db.connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM turns WHERE msg_id = ?1)",
                params![msg_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent `limit` turns for a user, oldest first.
pub async fn recent_for_user(
    db: &Database,
    user_id: &str,
    limit: usize,
) -> Result<Vec<TurnRecord>, ParlorError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT msg_id, user_id, role, kind, content, created_at
                 FROM turns WHERE user_id = ?1
                 ORDER BY id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit as i64], |row| {
                Ok(TurnRecord {
                    msg_id: row.get(0)?,
                    user_id: row.get(1)?,
                    role: row.get(2)?,
                    kind: row.get(3)?,
                    content: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut turns = Vec::new();
            for row in rows {
                turns.push(row?);
            }
            // The query walks newest-first; callers want chronological order.
            turns.reverse();
            Ok(turns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
