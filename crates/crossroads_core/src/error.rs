//! # Core Error Types

use thiserror::Error;

/// The mailbox was closed and holds no pending value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("mailbox closed")]
pub struct MailboxClosed;
