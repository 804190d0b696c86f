//! Per-account event-sourced state machine
//!
//! This module provides the `AccountEntity` struct, which owns one
//! account's command handling, event derivation, and in-memory state
//! cache. An entity processes commands strictly one at a time (the
//! mailbox in [`super::mailbox`] enforces this), so no locking is needed
//! around its state.
//!
//! # Command pipeline
//!
//! ```text
//! command -> validate -> derive event -> append to log -> fold -> response
//! ```
//!
//! The fold happens only after the append succeeds. A failed append is
//! fatal to that command and leaves the in-memory state exactly as it was,
//! which keeps the cache consistent with the persisted log at all times.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::store::EventLog;
use crate::types::{
    Account, AccountEvent, AccountId, AdjustOutcome, Command, LedgerError, Response,
    SequencedEvent,
};

/// Event-sourced state machine for a single account
///
/// The entity starts logically uninitialized (`state` is `None`) and
/// becomes live when an `AccountCreated` event is folded in — either from
/// a fresh `CreateAccount` command or during replay. It has no terminal
/// state; it lives as long as the process and its log partition do.
#[derive(Debug)]
pub struct AccountEntity {
    /// Identifier this entity owns; immutable once assigned
    account_id: AccountId,

    /// Cached account state, always equal to the fold of the persisted log
    ///
    /// Disposable: discarding it and replaying the log reproduces it
    /// exactly.
    state: Option<Account>,

    /// Durable log collaborator events are appended to
    log: Arc<dyn EventLog>,
}

impl AccountEntity {
    /// Create an entity with no prior history
    ///
    /// Used for identifiers the log has never seen. Equivalent to
    /// [`AccountEntity::from_replay`] with an empty record sequence.
    pub fn new(account_id: AccountId, log: Arc<dyn EventLog>) -> Self {
        Self {
            account_id,
            state: None,
            log,
        }
    }

    /// Reconstruct an entity by folding persisted records onto a base state
    ///
    /// This is the recovery path: `base` is `None` for a full replay or a
    /// snapshot state when only the tail of the log is being replayed.
    /// Records must be in commit order — order is the single source of
    /// truth for the derived state.
    ///
    /// # Arguments
    ///
    /// * `account_id` - Identifier the entity will own
    /// * `log` - Log collaborator for subsequent appends
    /// * `base` - State covered by a snapshot, or `None`
    /// * `records` - Persisted records to fold, in commit order
    pub fn from_replay(
        account_id: AccountId,
        log: Arc<dyn EventLog>,
        base: Option<Account>,
        records: &[SequencedEvent],
    ) -> Self {
        let state = Account::replay(base, records.iter().map(|record| &record.event));
        Self {
            account_id,
            state,
            log,
        }
    }

    /// The identifier this entity owns
    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    /// Current cached state, if the account exists
    pub fn state(&self) -> Option<&Account> {
        self.state.as_ref()
    }

    /// Process one command to completion
    ///
    /// The single public operation of the entity. Callers must never run
    /// two `handle` calls for the same identifier concurrently; the
    /// per-entity mailbox guarantees this in normal operation.
    ///
    /// # Returns
    ///
    /// * `Ok(Response)` - the command was evaluated; domain rejections and
    ///   not-found are carried inside the response, not as errors
    /// * `Err(LedgerError)` - the log collaborator failed; the in-memory
    ///   state is unchanged
    pub async fn handle(&mut self, command: Command) -> Result<Response, LedgerError> {
        match command {
            Command::CreateAccount {
                owner,
                currency,
                initial_amount,
            } => self.handle_create(owner, currency, initial_amount).await,
            Command::AdjustBalance { currency: _, delta } => self.handle_adjust(delta).await,
            Command::GetAccount => Ok(Response::AccountQuery(self.state.clone())),
        }
    }

    /// Process a CreateAccount command
    ///
    /// Always succeeds (barring storage failure): the identifier was
    /// freshly minted by the caller, so there is no duplicate to detect.
    async fn handle_create(
        &mut self,
        owner: String,
        currency: String,
        initial_amount: Decimal,
    ) -> Result<Response, LedgerError> {
        let event = AccountEvent::AccountCreated {
            account_id: self.account_id.clone(),
            owner,
            currency,
            initial_amount,
        };

        self.log.append(&self.account_id, event.clone()).await?;
        self.state = Account::fold(self.state.take(), &event);

        debug!(account_id = %self.account_id, %initial_amount, "account created");
        Ok(Response::AccountCreated {
            account_id: self.account_id.clone(),
        })
    }

    /// Process an AdjustBalance command
    ///
    /// Rejection is side-effect-free: no event is persisted and the state
    /// is untouched. Acceptance appends first and folds second, so a
    /// storage failure can never leave the cache ahead of the log.
    async fn handle_adjust(&mut self, delta: Decimal) -> Result<Response, LedgerError> {
        let Some(current) = self.state.clone() else {
            return Ok(Response::BalanceAdjusted(AdjustOutcome::NotFound));
        };

        let candidate = current.balance + delta;
        if candidate < Decimal::ZERO {
            debug!(
                account_id = %self.account_id,
                balance = %current.balance,
                %delta,
                "adjustment rejected, balance would go negative"
            );
            return Ok(Response::BalanceAdjusted(AdjustOutcome::Rejected {
                balance: current.balance,
                delta,
            }));
        }

        let event = AccountEvent::BalanceAdjusted { delta };
        self.log.append(&self.account_id, event).await?;

        let updated = current.adjusted(delta);
        self.state = Some(updated.clone());

        debug!(account_id = %self.account_id, balance = %updated.balance, "balance adjusted");
        Ok(Response::BalanceAdjusted(AdjustOutcome::Updated(updated)))
    }
}
