//! Error types for the ledger engine
//!
//! This module defines the infrastructure fault taxonomy. Domain rejections
//! (insufficient funds) and not-found lookups are *not* errors — they are
//! normal [`Response`](super::Response) payloads. Errors here mean a
//! command could not be processed at all.
//!
//! # Error Categories
//!
//! - **Storage Errors**: the log collaborator failed an append or read;
//!   never recoverable locally, and the entity's in-memory state is
//!   guaranteed unchanged.
//! - **Routing Errors**: an entity's mailbox or reply channel is gone;
//!   the command may or may not have been applied.

use super::account::AccountId;
use thiserror::Error;

/// Main error type for the ledger engine
///
/// Every variant carries the identifier it occurred under so callers and
/// log lines can attribute the fault without extra context.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// The log collaborator failed to append an event
    ///
    /// Fatal to the command being processed. The entity folds state only
    /// after a successful append, so in-memory state equals the persisted
    /// log when this error is returned.
    #[error("Failed to append event for account {account_id}: {message}")]
    AppendFailed {
        /// Identifier whose partition the append targeted
        account_id: AccountId,
        /// Description of the storage failure
        message: String,
    },

    /// The log collaborator failed to read an identifier's events
    ///
    /// Occurs on the recovery path; the entity is not materialized and no
    /// command is processed.
    #[error("Failed to read events for account {account_id}: {message}")]
    ReadFailed {
        /// Identifier whose partition the read targeted
        account_id: AccountId,
        /// Description of the storage failure
        message: String,
    },

    /// The entity's command mailbox is closed
    ///
    /// The worker task has stopped; the command was never enqueued.
    #[error("Mailbox closed for account {account_id}")]
    MailboxClosed {
        /// Identifier of the unreachable entity
        account_id: AccountId,
    },

    /// The entity dropped the reply channel without answering
    ///
    /// The worker task stopped between accepting the command and replying;
    /// whether the command's effect was applied is unknown to the caller.
    #[error("Reply channel dropped for account {account_id}")]
    ReplyDropped {
        /// Identifier of the entity that went away
        account_id: AccountId,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an AppendFailed error
    pub fn append_failed(account_id: impl Into<AccountId>, message: impl Into<String>) -> Self {
        LedgerError::AppendFailed {
            account_id: account_id.into(),
            message: message.into(),
        }
    }

    /// Create a ReadFailed error
    pub fn read_failed(account_id: impl Into<AccountId>, message: impl Into<String>) -> Self {
        LedgerError::ReadFailed {
            account_id: account_id.into(),
            message: message.into(),
        }
    }

    /// Create a MailboxClosed error
    pub fn mailbox_closed(account_id: impl Into<AccountId>) -> Self {
        LedgerError::MailboxClosed {
            account_id: account_id.into(),
        }
    }

    /// Create a ReplyDropped error
    pub fn reply_dropped(account_id: impl Into<AccountId>) -> Self {
        LedgerError::ReplyDropped {
            account_id: account_id.into(),
        }
    }
}
