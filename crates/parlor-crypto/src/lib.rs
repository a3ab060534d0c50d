// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook crypto for Parlor: signature verification and the AES-256-CBC
//! payload envelope.

pub mod envelope;
pub mod signature;

pub use envelope::{Envelope, EnvelopeKey};
