//! Account-related types for the ledger engine
//!
//! This module defines the Account structure and the pure fold function
//! that derives account state from persisted events.

use super::event::AccountEvent;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Account identifier
///
/// An opaque, globally-unique string. Freshly minted identifiers are
/// hyphenated UUID v4 strings, but the engine never inspects the contents;
/// any unique string routes correctly.
pub type AccountId = String;

/// Derived account state
///
/// Represents the current state of one account as the fold of all events
/// persisted under its identifier, in commit order. This value is a cache:
/// it can be discarded and rebuilt from the event log at any time without
/// loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// The account identifier, immutable once assigned
    pub account_id: AccountId,

    /// Name of the account owner
    pub owner: String,

    /// Currency code the account is denominated in (e.g. "USD")
    pub currency: String,

    /// Current balance with exact decimal precision
    ///
    /// The balance is never negative: any command whose effect would take
    /// it below zero is rejected before an event is derived.
    pub balance: Decimal,
}

impl Account {
    /// Fold one event into the current state
    ///
    /// This is the single state-derivation function of the engine. It is
    /// pure, total, and deterministic: folding the full ordered event
    /// sequence for an identifier from `None` always reproduces the exact
    /// cached state, which is what makes crash recovery and cache rebuild
    /// correct. Event order is the source of truth; the fold must never be
    /// applied in a reordered sequence.
    ///
    /// # Arguments
    ///
    /// * `state` - The state before the event; `None` for an account that
    ///   has no events yet
    /// * `event` - The persisted event to apply
    ///
    /// # Returns
    ///
    /// The state after the event. `AccountCreated` replaces any prior state
    /// wholesale; `BalanceAdjusted` on an empty state is a no-op (such a
    /// sequence is never persisted by the entity, but the fold stays total).
    pub fn fold(state: Option<Account>, event: &AccountEvent) -> Option<Account> {
        match event {
            AccountEvent::AccountCreated {
                account_id,
                owner,
                currency,
                initial_amount,
            } => Some(Account {
                account_id: account_id.clone(),
                owner: owner.clone(),
                currency: currency.clone(),
                balance: *initial_amount,
            }),
            AccountEvent::BalanceAdjusted { delta } => {
                state.map(|account| account.adjusted(*delta))
            }
        }
    }

    /// State after applying a signed balance change
    ///
    /// The single place balance arithmetic happens: both the fold and the
    /// entity's command handling go through it, so replayed and live state
    /// can never drift apart.
    pub fn adjusted(&self, delta: Decimal) -> Account {
        Account {
            balance: self.balance + delta,
            ..self.clone()
        }
    }

    /// Fold an ordered event sequence into a starting state
    ///
    /// Replays `events` in order. This is the recovery path used when an
    /// entity's in-memory cache is rebuilt from the log.
    ///
    /// # Arguments
    ///
    /// * `state` - Starting state; `None` for a full replay, or a snapshot
    ///   state when replaying only the tail of the log
    /// * `events` - Events in commit order
    pub fn replay<'a, I>(state: Option<Account>, events: I) -> Option<Account>
    where
        I: IntoIterator<Item = &'a AccountEvent>,
    {
        events.into_iter().fold(state, Account::fold)
    }
}
