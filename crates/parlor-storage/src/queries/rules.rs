// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword rule operations.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::Database;
use crate::models::KeywordRule;

/// User id of the shared fallback rule set.
pub const DEFAULT_USER: &str = "default";

/// Insert or replace a rule for `(user_id, keyword)`.
pub async fn upsert_rule(db: &Database, rule: &KeywordRule) -> Result<(), ParlorError> {
    let rule = rule.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO keyword_rules (user_id, keyword, reply_kind, reply_content)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (user_id, keyword)
                 DO UPDATE SET reply_kind = ?3, reply_content = ?4",
                params![rule.user_id, rule.keyword, rule.reply_kind, rule.reply_content],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a rule. Returns whether a row was removed.
pub async fn delete_rule(
    db: &Database,
    user_id: &str,
    keyword: &str,
) -> Result<bool, ParlorError> {
    let user_id = user_id.to_string();
    let keyword = keyword.to_string();
    db.connection()
        .call(move |conn| {
            let n = conn.execute(
                "DELETE FROM keyword_rules WHERE user_id = ?1 AND keyword = ?2",
                params![user_id, keyword],
            )?;
            Ok(n > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Effective rules for a user: their own rows plus the shared defaults,
/// with the user's own rows first so they shadow defaults on a keyword tie.
pub async fn effective_for_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<KeywordRule>, ParlorError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, keyword, reply_kind, reply_content
                 FROM keyword_rules
                 WHERE user_id IN (?1, ?2)
                 ORDER BY CASE user_id WHEN ?1 THEN 0 ELSE 1 END, keyword",
            )?;
            let rows = stmt.query_map(params![user_id, DEFAULT_USER], |row| {
                Ok(KeywordRule {
                    user_id: row.get(0)?,
                    keyword: row.get(1)?,
                    reply_kind: row.get(2)?,
                    reply_content: row.get(3)?,
                })
            })?;
            let mut rules = Vec::new();
            for row in rows {
                rules.push(row?);
            }
            Ok(rules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
