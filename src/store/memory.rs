//! In-memory storage collaborators
//!
//! This module provides DashMap-backed reference implementations of the
//! storage contracts. They are the default wiring for the server binary
//! and the test suites: identifier-partitioned, thread-safe, and ordered,
//! but with no durability across process restarts.
//!
//! # Thread Safety
//!
//! Both stores use `DashMap` for fine-grained per-identifier locking.
//! Appends to different identifiers never contend; appends to the same
//! identifier serialize on the partition entry, which preserves the
//! contiguous sequence numbering the replay contract requires.

use crate::store::{EventLog, Snapshot, SnapshotStore};
use crate::types::{AccountEvent, AccountId, LedgerError, SequenceNumber, SequencedEvent};
use async_trait::async_trait;
use dashmap::DashMap;

/// In-memory, identifier-partitioned event log
///
/// Each identifier maps to a vector of sequenced records; the vector index
/// equals the record's sequence number, so append order and commit order
/// coincide by construction.
#[derive(Debug, Default)]
pub struct InMemoryEventLog {
    /// Event partitions keyed by account identifier
    partitions: DashMap<AccountId, Vec<SequencedEvent>>,
}

impl InMemoryEventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self {
            partitions: DashMap::new(),
        }
    }

    /// Total number of persisted events across all partitions
    ///
    /// Test and diagnostics helper; not part of the `EventLog` contract.
    pub fn event_count(&self) -> usize {
        self.partitions.iter().map(|entry| entry.value().len()).sum()
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(
        &self,
        account_id: &AccountId,
        event: AccountEvent,
    ) -> Result<SequencedEvent, LedgerError> {
        let mut partition = self.partitions.entry(account_id.clone()).or_default();

        let record = SequencedEvent {
            sequence: partition.len() as SequenceNumber,
            event,
        };
        partition.push(record.clone());

        Ok(record)
    }

    async fn read_all(&self, account_id: &AccountId) -> Result<Vec<SequencedEvent>, LedgerError> {
        Ok(self
            .partitions
            .get(account_id)
            .map(|partition| partition.value().clone())
            .unwrap_or_default())
    }

    async fn read_from(
        &self,
        account_id: &AccountId,
        offset: SequenceNumber,
    ) -> Result<Vec<SequencedEvent>, LedgerError> {
        Ok(self
            .partitions
            .get(account_id)
            .map(|partition| {
                partition
                    .value()
                    .iter()
                    .filter(|record| record.sequence >= offset)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// In-memory snapshot store
///
/// Keeps at most one snapshot per identifier; `save` replaces any
/// previous snapshot.
#[derive(Debug, Default)]
pub struct InMemorySnapshotStore {
    /// Latest snapshot per account identifier
    snapshots: DashMap<AccountId, Snapshot>,
}

impl InMemorySnapshotStore {
    /// Create a new empty snapshot store
    pub fn new() -> Self {
        Self {
            snapshots: DashMap::new(),
        }
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn load_latest(&self, account_id: &AccountId) -> Result<Option<Snapshot>, LedgerError> {
        Ok(self
            .snapshots
            .get(account_id)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, account_id: &AccountId, snapshot: Snapshot) -> Result<(), LedgerError> {
        self.snapshots.insert(account_id.clone(), snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use rust_decimal::Decimal;

    fn created_event(account_id: &str) -> AccountEvent {
        AccountEvent::AccountCreated {
            account_id: account_id.to_string(),
            owner: "alice".to_string(),
            currency: "USD".to_string(),
            initial_amount: Decimal::new(10000, 2),
        }
    }

    fn adjusted_event(delta: i64) -> AccountEvent {
        AccountEvent::BalanceAdjusted {
            delta: Decimal::new(delta, 2),
        }
    }

    #[tokio::test]
    async fn test_append_assigns_contiguous_sequence_numbers() {
        let log = InMemoryEventLog::new();
        let id = "acct-1".to_string();

        let first = log.append(&id, created_event(&id)).await.unwrap();
        let second = log.append(&id, adjusted_event(100)).await.unwrap();
        let third = log.append(&id, adjusted_event(-50)).await.unwrap();

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(third.sequence, 2);
    }

    #[tokio::test]
    async fn test_read_all_returns_events_in_append_order() {
        let log = InMemoryEventLog::new();
        let id = "acct-1".to_string();

        log.append(&id, created_event(&id)).await.unwrap();
        log.append(&id, adjusted_event(100)).await.unwrap();

        let records = log.read_all(&id).await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].sequence, 0);
        assert_eq!(records[1].sequence, 1);
        assert!(matches!(
            records[0].event,
            AccountEvent::AccountCreated { .. }
        ));
    }

    #[tokio::test]
    async fn test_read_all_unknown_identifier_is_empty() {
        let log = InMemoryEventLog::new();

        let records = log.read_all(&"nonexistent-id".to_string()).await.unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_read_from_skips_covered_prefix() {
        let log = InMemoryEventLog::new();
        let id = "acct-1".to_string();

        log.append(&id, created_event(&id)).await.unwrap();
        log.append(&id, adjusted_event(100)).await.unwrap();
        log.append(&id, adjusted_event(200)).await.unwrap();

        let tail = log.read_from(&id, 1).await.unwrap();

        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].sequence, 1);
        assert_eq!(tail[1].sequence, 2);
    }

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let log = InMemoryEventLog::new();
        let first = "acct-1".to_string();
        let second = "acct-2".to_string();

        log.append(&first, created_event(&first)).await.unwrap();
        let record = log.append(&second, created_event(&second)).await.unwrap();

        // Sequence numbering restarts per identifier partition
        assert_eq!(record.sequence, 0);
        assert_eq!(log.read_all(&first).await.unwrap().len(), 1);
        assert_eq!(log.read_all(&second).await.unwrap().len(), 1);
        assert_eq!(log.event_count(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_appends_to_distinct_partitions() {
        use std::sync::Arc;

        let log = Arc::new(InMemoryEventLog::new());
        let mut tasks = Vec::new();

        for i in 0..10 {
            let log = Arc::clone(&log);
            tasks.push(tokio::spawn(async move {
                let id = format!("acct-{i}");
                log.append(&id, created_event(&id)).await.unwrap();
                log.append(&id, adjusted_event(100)).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        for i in 0..10 {
            let id = format!("acct-{i}");
            let records = log.read_all(&id).await.unwrap();
            assert_eq!(records.len(), 2);
            assert_eq!(records[0].sequence, 0);
            assert_eq!(records[1].sequence, 1);
        }
    }

    #[tokio::test]
    async fn test_snapshot_store_load_latest_roundtrip() {
        let store = InMemorySnapshotStore::new();
        let id = "acct-1".to_string();

        assert_eq!(store.load_latest(&id).await.unwrap(), None);

        let snapshot = Snapshot {
            state: Account {
                account_id: id.clone(),
                owner: "alice".to_string(),
                currency: "USD".to_string(),
                balance: Decimal::new(10000, 2),
            },
            event_offset: 3,
        };
        store.save(&id, snapshot.clone()).await.unwrap();

        assert_eq!(store.load_latest(&id).await.unwrap(), Some(snapshot));
    }

    #[tokio::test]
    async fn test_snapshot_store_save_replaces_previous() {
        let store = InMemorySnapshotStore::new();
        let id = "acct-1".to_string();

        let account = Account {
            account_id: id.clone(),
            owner: "alice".to_string(),
            currency: "USD".to_string(),
            balance: Decimal::new(10000, 2),
        };

        store
            .save(
                &id,
                Snapshot {
                    state: account.clone(),
                    event_offset: 1,
                },
            )
            .await
            .unwrap();
        store
            .save(
                &id,
                Snapshot {
                    state: account,
                    event_offset: 5,
                },
            )
            .await
            .unwrap();

        let latest = store.load_latest(&id).await.unwrap().unwrap();
        assert_eq!(latest.event_offset, 5);
    }
}
