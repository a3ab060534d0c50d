// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the pipeline and its collaborators.
//!
//! The pipeline never talks to Redis-style caches, the platform API, or
//! any AI/search/lottery backend directly; it goes through these traits so
//! every external dependency can be swapped or mocked.

pub mod cache;
pub mod collaborators;
pub mod handler;
pub mod platform;
pub mod resolver;

pub use cache::TtlCache;
pub use collaborators::{
    CompletionBackend, KnowledgeSearch, LotteryLookup, MediaNormalizer, OperatorChannel,
};
pub use handler::{HandlerContext, MessageHandler};
pub use platform::PlatformApi;
pub use resolver::ConfigResolver;
