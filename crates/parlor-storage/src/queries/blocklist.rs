// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blocklist operations.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::Database;

/// Block a user. Idempotent.
pub async fn block(
    db: &Database,
    user_id: &str,
    reason: Option<&str>,
    created_at: &str,
) -> Result<(), ParlorError> {
    let user_id = user_id.to_string();
    let reason = reason.map(str::to_string);
    let created_at = created_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO blocklist (user_id, reason, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id) DO UPDATE SET reason = ?2",
                params![user_id, reason, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Unblock a user. Returns whether a row was removed.
pub async fn unblock(db: &Database, user_id: &str) -> Result<bool, ParlorError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "DELETE FROM blocklist WHERE user_id = ?1",
                params![user_id],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Whether a user is blocked.
pub async fn is_blocked(db: &Database, user_id: &str) -> Result<bool, ParlorError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM blocklist WHERE user_id = ?1)",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn block_unblock_lifecycle() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        assert!(!is_blocked(&db, "user-1").await.unwrap());

        block(&db, "user-1", Some("spam"), "2026-01-01T00:00:00.000Z")
            .await
            .unwrap();
        assert!(is_blocked(&db, "user-1").await.unwrap());

        // Re-blocking is idempotent.
        block(&db, "user-1", None, "2026-01-01T00:00:01.000Z")
            .await
            .unwrap();

        assert!(unblock(&db, "user-1").await.unwrap());
        assert!(!is_blocked(&db, "user-1").await.unwrap());
        assert!(!unblock(&db, "user-1").await.unwrap());

        db.close().await.unwrap();
    }
}
