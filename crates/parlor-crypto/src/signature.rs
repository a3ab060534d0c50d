// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook signature computation and verification.
//!
//! The platform signs every callback with the SHA-1 hex digest of the four
//! participating strings sorted lexicographically and concatenated. The
//! comparison against the caller-supplied digest is constant-time so the
//! endpoint does not leak a byte-by-byte oracle.

use parlor_core::ParlorError;
use ring::constant_time::verify_slices_are_equal;
use sha1::{Digest, Sha1};

/// Compute the signature over `{token, timestamp, nonce, body}`.
///
/// The four parts are sorted by byte order, concatenated without a
/// separator, and hashed with SHA-1; the result is lowercase hex.
pub fn compute(token: &str, timestamp: &str, nonce: &str, body: &str) -> String {
    let mut parts = [token, timestamp, nonce, body];
    parts.sort_unstable();

    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Verify a caller-supplied signature.
///
/// Returns [`ParlorError::Auth`] on mismatch. The provided digest is
/// lowercased first so casing differences do not fail legitimate callers.
pub fn verify(
    token: &str,
    timestamp: &str,
    nonce: &str,
    body: &str,
    provided: &str,
) -> Result<(), ParlorError> {
    let expected = compute(token, timestamp, nonce, body);
    let provided = provided.to_ascii_lowercase();

    verify_slices_are_equal(expected.as_bytes(), provided.as_bytes())
        .map_err(|_| ParlorError::Auth)
}
