// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message pipeline: cursor-based sync, two-level dedup, prioritized
//! dispatch, manual handoff, and reply delivery.

pub mod cursor;
pub mod dedup;
pub mod dispatcher;
pub mod handlers;
pub mod handoff;
pub mod poller;
pub mod processor;
pub mod resolver;
pub mod sender;

pub use cursor::CursorStore;
pub use dedup::DedupStore;
pub use dispatcher::Dispatcher;
pub use handoff::{BroadcastOperatorChannel, HandoffManager, OperatorEvent};
pub use poller::{PollStatus, SyncPoller};
pub use processor::MessageProcessor;
pub use resolver::StoredConfigResolver;
pub use sender::ReplySender;
