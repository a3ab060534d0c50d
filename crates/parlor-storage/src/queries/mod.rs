// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod blocklist;
pub mod handoffs;
pub mod overrides;
pub mod rules;
pub mod turns;
