// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process TTL cache for Parlor.
//!
//! Holds the short-lived state the pipeline consults on every message:
//! the platform access token, dedup markers, manual-handoff flags, and
//! the sync cursor. Key layout lives in [`keys`].

pub mod keys;
pub mod memory;

pub use memory::MemoryTtlCache;
