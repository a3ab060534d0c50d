// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server: verification handshake, encrypted event callbacks,
//! and a health endpoint.

pub mod handlers;
pub mod server;
pub mod xml;

pub use server::{build_router, start_server, GatewayState};
