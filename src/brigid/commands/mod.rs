//! # Operations
//!
//! One module per user-facing operation. Each exposes a `run` function that takes an
//! [`ApiClient`](crate::client::ApiClient) and an
//! [`EndpointDescriptor`](crate::resources::EndpointDescriptor) and returns a
//! [`CmdResult`]. Nothing here prints: records and messages flow back to the caller,
//! which decides how to render them.

use crate::model::Record;

pub mod create;
pub mod delete;
pub mod import;
pub mod list;
pub mod resolve;
pub mod retrieve;
pub mod sync;
pub mod update;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// Records returned by a listing.
    pub listed: Vec<Record>,
    /// Records fetched, created or changed by the operation.
    pub affected: Vec<Record>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_listed(mut self, records: Vec<Record>) -> Self {
        self.listed = records;
        self
    }

    pub fn with_affected(mut self, records: Vec<Record>) -> Self {
        self.affected = records;
        self
    }
}
