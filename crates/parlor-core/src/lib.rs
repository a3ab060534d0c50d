// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Parlor chat gateway.
//!
//! This crate provides the shared types, the error enum, and the trait
//! seams used throughout the Parlor workspace. The pipeline crates depend
//! on the traits defined here rather than on concrete adapters.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ParlorError;
pub use types::{
    AiProfile, ConversationTurn, KeywordProfile, MediaRef, MessageKind, PlatformMessage,
    Reply, SyncPage,
};

pub use traits::{
    CompletionBackend, ConfigResolver, HandlerContext, KnowledgeSearch, LotteryLookup,
    MediaNormalizer, MessageHandler, OperatorChannel, PlatformApi, TtlCache,
};
