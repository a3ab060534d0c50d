// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in message handlers.
//!
//! Priority order: manual handoff (0), keyword rules (1), lottery (2),
//! knowledge base (5), catch-all (`i32::MAX`). The catch-all is the AI
//! handler when a completion backend is configured, the static fallback
//! otherwise.

mod ai;
mod fallback;
mod handoff;
mod keyword;
mod knowledge;
mod lottery;

pub use ai::AiHandler;
pub use fallback::FallbackHandler;
pub use handoff::HandoffHandler;
pub use keyword::KeywordRuleHandler;
pub use knowledge::KnowledgeHandler;
pub use lottery::LotteryHandler;
