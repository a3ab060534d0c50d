// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache key schema.
//!
//! Every cache consumer goes through these builders so the key layout has
//! a single point of truth.

/// Access token for a platform tenant.
pub fn access_token(corp_id: &str) -> String {
    format!("platform:access_token:{corp_id}")
}

/// Dedup marker for a processed message id.
pub fn processed_msg(msg_id: &str) -> String {
    format!("platform:processed_msgid:{msg_id}")
}

/// Manual handoff session flag for a user.
pub fn manual_mode(user_id: &str) -> String {
    format!("manual_mode:{user_id}")
}

/// Persisted sync cursor.
pub fn msg_cursor() -> String {
    "platform:msg_cursor".to_string()
}
