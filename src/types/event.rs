//! Persisted domain events for the ledger engine
//!
//! Events are the only durable record in the system. They are immutable,
//! append-only, and ordered per account identifier; the in-memory account
//! state is always recomputed by folding them in commit order.

use super::account::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-identifier event sequence number
///
/// Assigned by the log collaborator; contiguous from 0 within one
/// identifier partition.
pub type SequenceNumber = u64;

/// Domain events persisted to the event log
///
/// The set is closed: the engine exhaustively matches on these variants and
/// there is no open extension point. Events never carry the post-state —
/// state is always derived by folding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountEvent {
    /// An account came into existence
    ///
    /// The first (and only first) event under an identifier. Carries the
    /// full initial description of the account; folding it replaces any
    /// prior state wholesale.
    AccountCreated {
        /// Identifier the account was created under
        account_id: AccountId,
        /// Name of the account owner
        owner: String,
        /// Currency code the account is denominated in
        currency: String,
        /// Opening balance
        initial_amount: Decimal,
    },

    /// The balance changed by a signed amount
    ///
    /// Positive delta is a credit, negative a debit. The entity only
    /// persists this event after validating that the resulting balance is
    /// non-negative, so replay never produces a negative balance.
    BalanceAdjusted {
        /// Signed balance change
        delta: Decimal,
    },
}

/// A persisted event record
///
/// The shape the log collaborator stores and returns: the event payload
/// plus its position in the identifier's partition. Replay folds the
/// payloads of an ordered sequence of these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedEvent {
    /// Position within the identifier's partition, contiguous from 0
    pub sequence: SequenceNumber,

    /// The event payload
    pub event: AccountEvent,
}
