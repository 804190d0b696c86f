//! Storage collaborator contracts
//!
//! The engine core does not own physical durability. It consumes two
//! narrow interfaces: an append-only, identifier-partitioned event log,
//! and an optional snapshot store that bounds replay cost. Write-ahead
//! logging, compaction, and snapshot *writing* policy all live behind
//! these traits.
//!
//! # Components
//!
//! - `EventLog` / `SnapshotStore` - the trait contracts consumed by the core
//! - `memory` - DashMap-backed in-memory reference implementations

use std::fmt::Debug;

use crate::types::{Account, AccountEvent, AccountId, LedgerError, SequenceNumber, SequencedEvent};
use async_trait::async_trait;

pub mod memory;

pub use memory::{InMemoryEventLog, InMemorySnapshotStore};

/// Append-only, identifier-partitioned event log
///
/// The one suspension point in command processing: an entity awaits
/// `append` before folding an event into its state. Implementations must
/// assign contiguous per-identifier sequence numbers in append order,
/// because event order is the single source of truth for replay.
#[async_trait]
pub trait EventLog: Send + Sync + Debug {
    /// Append one event to the identifier's partition
    ///
    /// # Arguments
    ///
    /// * `account_id` - Partition to append to
    /// * `event` - The event payload to persist
    ///
    /// # Returns
    ///
    /// * `Ok(SequencedEvent)` - the persisted record with its assigned
    ///   sequence number
    /// * `Err(LedgerError::AppendFailed)` - the event was not persisted;
    ///   the caller must not mutate derived state
    async fn append(
        &self,
        account_id: &AccountId,
        event: AccountEvent,
    ) -> Result<SequencedEvent, LedgerError>;

    /// Read the identifier's full event sequence in commit order
    ///
    /// Equivalent to `read_from(account_id, 0)`. The returned sequence is
    /// finite and replayable from the start; an empty vector means no
    /// account has ever been created under the identifier.
    async fn read_all(&self, account_id: &AccountId) -> Result<Vec<SequencedEvent>, LedgerError>;

    /// Read the identifier's events starting at a sequence number
    ///
    /// Used by the snapshot recovery path to replay only the tail of the
    /// log that a snapshot does not cover.
    ///
    /// # Arguments
    ///
    /// * `account_id` - Partition to read
    /// * `offset` - First sequence number to include
    async fn read_from(
        &self,
        account_id: &AccountId,
        offset: SequenceNumber,
    ) -> Result<Vec<SequencedEvent>, LedgerError>;
}

/// A point-in-time account state plus the log position it covers
///
/// `event_offset` is the sequence number of the first event *not* folded
/// into `state`: recovery replays `read_from(id, event_offset)` on top of
/// `state` to reach the current state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Account state as of the covered prefix of the log
    pub state: Account,

    /// Sequence number of the first event not covered by `state`
    pub event_offset: SequenceNumber,
}

/// Optional snapshot collaborator
///
/// Purely an optimization to bound replay cost on recovery — never
/// required for correctness. The core only ever calls `load_latest`;
/// `save` exists so tests and compaction tooling can seed snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load the most recent snapshot for an identifier, if any
    async fn load_latest(&self, account_id: &AccountId) -> Result<Option<Snapshot>, LedgerError>;

    /// Store a snapshot for an identifier, replacing any previous one
    async fn save(&self, account_id: &AccountId, snapshot: Snapshot) -> Result<(), LedgerError>;
}
