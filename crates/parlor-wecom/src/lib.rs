// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WeCom customer-service API adapter for Parlor.
//!
//! Implements the [`parlor_core::PlatformApi`] trait over the WeCom HTTP
//! API: token management, message sync, typed sends, and media transfer.

pub mod client;
pub mod wire;

pub use client::WecomClient;
