//! Command and response types for the ledger engine
//!
//! Commands are the ephemeral inputs to an account entity; responses are
//! the ephemeral outputs. Neither is ever persisted — only events are.
//! Both sets are closed sum types, exhaustively matched by the entity.

use super::account::{Account, AccountId};
use rust_decimal::Decimal;

/// Commands an account entity can process
///
/// The target identifier is not part of the command payload: it travels as
/// the dispatch key on [`EntityRegistry::dispatch`], and the entity already
/// knows which identifier it owns.
///
/// [`EntityRegistry::dispatch`]: crate::core::EntityRegistry::dispatch
#[derive(Debug, Clone)]
pub enum Command {
    /// Create the account under the dispatched identifier
    ///
    /// Always succeeds: identifiers are freshly minted before the command
    /// is issued, so there is no duplicate detection in this model.
    CreateAccount {
        /// Name of the account owner
        owner: String,
        /// Currency code the account is denominated in
        currency: String,
        /// Opening balance, must be non-negative
        initial_amount: Decimal,
    },

    /// Change the balance by a signed amount
    ///
    /// Positive delta is a credit, negative a debit. Rejected without any
    /// side effect if the resulting balance would be negative.
    ///
    /// The `currency` field is accepted but not validated against the
    /// account's currency — a known limitation carried over from the
    /// original design rather than invented behavior.
    AdjustBalance {
        /// Currency code the caller believes the account is denominated in
        currency: String,
        /// Signed balance change
        delta: Decimal,
    },

    /// Read the current cached state
    ///
    /// Pure read; derives no event and never touches storage.
    GetAccount,
}

/// Outcome of an [`Command::AdjustBalance`]
#[derive(Debug, Clone, PartialEq)]
pub enum AdjustOutcome {
    /// The adjustment was accepted; carries the post-fold account state
    Updated(Account),

    /// The adjustment would have made the balance negative
    ///
    /// No event was persisted and the account state is unchanged. Carries
    /// the balance at rejection time and the offending delta.
    Rejected {
        /// Balance at the time the command was evaluated
        balance: Decimal,
        /// The delta that was refused
        delta: Decimal,
    },

    /// No account exists under the dispatched identifier
    NotFound,
}

/// Responses produced by an account entity
///
/// Domain rejections (insufficient funds) and not-found are normal
/// responses, not errors; only storage and routing faults surface as
/// [`LedgerError`].
///
/// [`LedgerError`]: crate::types::LedgerError
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Reply to [`Command::CreateAccount`], carrying the new identifier
    AccountCreated {
        /// Identifier the account was created under
        account_id: AccountId,
    },

    /// Reply to [`Command::AdjustBalance`]
    BalanceAdjusted(AdjustOutcome),

    /// Reply to [`Command::GetAccount`]
    ///
    /// `None` only in the degenerate case where the entity's cache is
    /// empty — an identifier that was dispatched to but never created.
    AccountQuery(Option<Account>),
}
