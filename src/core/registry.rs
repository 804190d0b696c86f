//! Entity routing and lifecycle for the ledger engine
//!
//! This module provides the `EntityRegistry` struct, the single
//! addressable front door for all account entities. It owns the mapping
//! from account identifier to a live entity handle, creates entities
//! lazily (recovering their state from the event log), and forwards
//! commands by identifier.
//!
//! # Design
//!
//! The registry is an explicit, owned object passed by reference to all
//! callers — never ambient global state — so lifecycle and test isolation
//! stay explicit. It is stateless beyond the identifier→handle map: entry
//! creation is the only mutation, and entries are never removed (the map
//! is unbounded by design; eviction is a flagged scalability non-goal).
//!
//! # Thread Safety
//!
//! Lookups run concurrently through `DashMap`'s sharded reads; insertion
//! is mutually exclusive through its entry API. Recovery (snapshot load +
//! log replay) happens outside any map lock. Two callers may race to
//! recover the same identifier — replay is read-only, so both are safe;
//! the entry-API loser drops its handle and that worker exits when its
//! channel closes.

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::entity::AccountEntity;
use super::mailbox::{spawn_entity, EntityHandle};
use crate::store::{EventLog, SnapshotStore};
use crate::types::{AccountId, Command, LedgerError, Response};

/// Default per-entity mailbox depth
const DEFAULT_MAILBOX_CAPACITY: usize = 64;

/// Router multiplexing many account entities behind one front door
///
/// Commands enter through [`dispatch`](EntityRegistry::dispatch) with an
/// account identifier; the registry resolves or materializes the entity
/// for that identifier and forwards the command to its processing slot.
pub struct EntityRegistry {
    /// Live entity handles keyed by account identifier
    ///
    /// DashMap gives lock-free concurrent lookups and mutually exclusive
    /// insertion without a global lock across entities.
    entities: DashMap<AccountId, EntityHandle>,

    /// Durable log collaborator shared by all entities
    log: Arc<dyn EventLog>,

    /// Optional snapshot collaborator bounding replay cost on recovery
    snapshots: Option<Arc<dyn SnapshotStore>>,

    /// Mailbox depth for newly spawned entities
    mailbox_capacity: usize,
}

impl EntityRegistry {
    /// Create a registry over a log collaborator
    ///
    /// # Arguments
    ///
    /// * `log` - The event log all entities append to and recover from
    pub fn new(log: Arc<dyn EventLog>) -> Self {
        Self {
            entities: DashMap::new(),
            log,
            snapshots: None,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }

    /// Attach a snapshot collaborator
    ///
    /// Recovery will consult it for a `(state, offset)` pair and replay
    /// only the log tail past the offset. Purely an optimization; replay
    /// from the start is always correct without it.
    pub fn with_snapshot_store(mut self, snapshots: Arc<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(snapshots);
        self
    }

    /// Override the per-entity mailbox depth
    ///
    /// Zero falls back to the default.
    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        if capacity > 0 {
            self.mailbox_capacity = capacity;
        }
        self
    }

    /// Mint a fresh, globally-unique account identifier
    pub fn mint_identifier() -> AccountId {
        Uuid::new_v4().to_string()
    }

    /// Number of live entities currently materialized
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Create an account under a freshly minted identifier
    ///
    /// Minting is the registry's responsibility when the caller does not
    /// supply an identifier; once minted, the identifier is routed exactly
    /// like any other.
    ///
    /// # Arguments
    ///
    /// * `owner` - Name of the account owner
    /// * `currency` - Currency code the account is denominated in
    /// * `initial_amount` - Opening balance
    pub async fn create_account(
        &self,
        owner: String,
        currency: String,
        initial_amount: Decimal,
    ) -> Result<Response, LedgerError> {
        let account_id = Self::mint_identifier();
        self.dispatch(
            &account_id,
            Command::CreateAccount {
                owner,
                currency,
                initial_amount,
            },
        )
        .await
    }

    /// Route one command to the entity owning an identifier
    ///
    /// If no live entity exists for `account_id`, one is constructed
    /// first, its state recovered by replaying the events persisted under
    /// the identifier. Dispatching a non-create command to an unknown
    /// identifier is not an error at this layer: the (empty) entity is
    /// still materialized and reports not-found through its response.
    ///
    /// # Returns
    ///
    /// * `Ok(Response)` - the entity's reply, in FIFO order per identifier
    /// * `Err(LedgerError)` - storage failure during recovery or append,
    ///   or the entity worker is unreachable
    pub async fn dispatch(
        &self,
        account_id: &AccountId,
        command: Command,
    ) -> Result<Response, LedgerError> {
        let handle = self.resolve(account_id).await?;
        handle.send(command).await
    }

    /// Look up the handle for an identifier, materializing it if needed
    async fn resolve(&self, account_id: &AccountId) -> Result<EntityHandle, LedgerError> {
        if let Some(handle) = self.entities.get(account_id) {
            return Ok(handle.clone());
        }

        // Recover outside the map lock: snapshot load and replay are
        // read-only, so a racing resolver doing the same work is harmless.
        let entity = self.recover(account_id).await?;
        let handle = spawn_entity(entity, self.mailbox_capacity);

        // A racing resolver may have inserted first; the entry API keeps
        // the winner, and the loser's worker exits once its unclaimed
        // handle drops and the mailbox closes.
        Ok(self
            .entities
            .entry(account_id.clone())
            .or_insert_with(|| handle)
            .clone())
    }

    /// Rebuild an entity's state from the snapshot store and event log
    async fn recover(&self, account_id: &AccountId) -> Result<AccountEntity, LedgerError> {
        let (base, offset) = match &self.snapshots {
            Some(snapshots) => match snapshots.load_latest(account_id).await? {
                Some(snapshot) => (Some(snapshot.state), snapshot.event_offset),
                None => (None, 0),
            },
            None => (None, 0),
        };

        let tail = self.log.read_from(account_id, offset).await?;
        if !tail.is_empty() || base.is_some() {
            info!(
                %account_id,
                replayed = tail.len(),
                from_snapshot = base.is_some(),
                "recovered entity from log"
            );
        }

        Ok(AccountEntity::from_replay(
            account_id.clone(),
            Arc::clone(&self.log),
            base,
            &tail,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::{InMemoryEventLog, InMemorySnapshotStore};
    use crate::store::Snapshot;
    use crate::types::{Account, AdjustOutcome};

    fn registry() -> (EntityRegistry, Arc<InMemoryEventLog>) {
        let log = Arc::new(InMemoryEventLog::new());
        (EntityRegistry::new(log.clone()), log)
    }

    fn adjust_command(delta: i64) -> Command {
        Command::AdjustBalance {
            currency: "USD".to_string(),
            delta: Decimal::new(delta, 2),
        }
    }

    async fn create(registry: &EntityRegistry, amount: i64) -> AccountId {
        let response = registry
            .create_account(
                "alice".to_string(),
                "USD".to_string(),
                Decimal::new(amount, 2),
            )
            .await
            .unwrap();
        match response {
            Response::AccountCreated { account_id } => account_id,
            other => panic!("Expected AccountCreated, got {other:?}"),
        }
    }

    #[test]
    fn test_minted_identifiers_are_unique() {
        let first = EntityRegistry::mint_identifier();
        let second = EntityRegistry::mint_identifier();

        assert_ne!(first, second);
        assert!(!first.is_empty());
    }

    #[tokio::test]
    async fn test_create_account_mints_identifier_and_materializes_entity() {
        let (registry, log) = registry();

        let account_id = create(&registry, 10000).await;

        assert_eq!(registry.entity_count(), 1);
        assert_eq!(log.read_all(&account_id).await.unwrap().len(), 1);
    }

    async fn balance_of(registry: &EntityRegistry, account_id: &AccountId) -> Decimal {
        match registry
            .dispatch(account_id, Command::GetAccount)
            .await
            .unwrap()
        {
            Response::AccountQuery(Some(account)) => account.balance,
            other => panic!("Expected populated query, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_routes_to_the_right_entity() {
        let (registry, _log) = registry();

        let first = create(&registry, 10000).await;
        let second = create(&registry, 50000).await;

        registry
            .dispatch(&first, adjust_command(-2500))
            .await
            .unwrap();

        assert_eq!(balance_of(&registry, &first).await, Decimal::new(7500, 2));
        assert_eq!(balance_of(&registry, &second).await, Decimal::new(50000, 2));
    }

    #[tokio::test]
    async fn test_dispatch_query_to_unknown_identifier_reports_not_found() {
        let (registry, _log) = registry();

        let response = registry
            .dispatch(&"nonexistent-id".to_string(), Command::GetAccount)
            .await
            .unwrap();

        assert_eq!(response, Response::AccountQuery(None));
        // The (empty) entity was still materialized, per the routing contract
        assert_eq!(registry.entity_count(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_adjust_to_unknown_identifier_reports_not_found() {
        let (registry, log) = registry();

        let response = registry
            .dispatch(&"nonexistent-id".to_string(), adjust_command(100))
            .await
            .unwrap();

        assert_eq!(response, Response::BalanceAdjusted(AdjustOutcome::NotFound));
        assert_eq!(log.event_count(), 0);
    }

    #[tokio::test]
    async fn test_recovery_rebuilds_state_from_shared_log() {
        let log = Arc::new(InMemoryEventLog::new());
        let registry = EntityRegistry::new(log.clone());

        let account_id = create(&registry, 10000).await;
        registry
            .dispatch(&account_id, adjust_command(2000))
            .await
            .unwrap();
        registry
            .dispatch(&account_id, adjust_command(-500))
            .await
            .unwrap();

        // A fresh registry over the same log must converge on the same
        // state: the cache is disposable
        let recovered = EntityRegistry::new(log.clone());
        match recovered
            .dispatch(&account_id, Command::GetAccount)
            .await
            .unwrap()
        {
            Response::AccountQuery(Some(account)) => {
                assert_eq!(account.balance, Decimal::new(11500, 2));
                assert_eq!(account.owner, "alice");
            }
            other => panic!("Expected populated query, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_recovery_uses_snapshot_and_replays_tail() {
        let log = Arc::new(InMemoryEventLog::new());
        let snapshots = Arc::new(InMemorySnapshotStore::new());
        let registry = EntityRegistry::new(log.clone());

        let account_id = create(&registry, 10000).await;
        registry
            .dispatch(&account_id, adjust_command(2000))
            .await
            .unwrap();
        registry
            .dispatch(&account_id, adjust_command(-700))
            .await
            .unwrap();

        // Snapshot deliberately covers only the first two events (balance
        // 120.00); the tail event must still be replayed on top of it
        snapshots
            .save(
                &account_id,
                Snapshot {
                    state: Account {
                        account_id: account_id.clone(),
                        owner: "alice".to_string(),
                        currency: "USD".to_string(),
                        balance: Decimal::new(12000, 2),
                    },
                    event_offset: 2,
                },
            )
            .await
            .unwrap();

        let recovered = EntityRegistry::new(log.clone())
            .with_snapshot_store(snapshots);
        match recovered
            .dispatch(&account_id, Command::GetAccount)
            .await
            .unwrap()
        {
            Response::AccountQuery(Some(account)) => {
                assert_eq!(account.balance, Decimal::new(11300, 2));
            }
            other => panic!("Expected populated query, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_repeated_dispatch_reuses_the_entity() {
        let (registry, _log) = registry();

        let account_id = create(&registry, 10000).await;
        for _ in 0..5 {
            registry
                .dispatch(&account_id, Command::GetAccount)
                .await
                .unwrap();
        }

        assert_eq!(registry.entity_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_dispatch_across_identifiers() {
        let (registry, _log) = registry();
        let registry = Arc::new(registry);

        let mut ids = Vec::new();
        for _ in 0..8 {
            ids.push(create(&registry, 10000).await);
        }

        // Fan out interleaved adjustments across all accounts
        let tasks = ids.iter().cloned().map(|id| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry.dispatch(&id, adjust_command(2000)).await.unwrap();
                registry.dispatch(&id, adjust_command(-1000)).await.unwrap();
            })
        });
        futures::future::join_all(tasks).await;

        for id in ids {
            match registry.dispatch(&id, Command::GetAccount).await.unwrap() {
                Response::AccountQuery(Some(account)) => {
                    assert_eq!(account.balance, Decimal::new(11000, 2));
                }
                other => panic!("Expected populated query, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_resolution_of_the_same_identifier() {
        let log = Arc::new(InMemoryEventLog::new());
        let registry = EntityRegistry::new(log.clone());
        let account_id = create(&registry, 10000).await;

        // A second registry over the same log, hit concurrently for one id:
        // whichever racer loses entity creation must still see consistent
        // responses through the surviving handle
        let fresh = Arc::new(EntityRegistry::new(log.clone()));
        let tasks = (0..8).map(|_| {
            let fresh = Arc::clone(&fresh);
            let id = account_id.clone();
            tokio::spawn(async move { fresh.dispatch(&id, Command::GetAccount).await.unwrap() })
        });

        for result in futures::future::join_all(tasks).await {
            match result.unwrap() {
                Response::AccountQuery(Some(account)) => {
                    assert_eq!(account.balance, Decimal::new(10000, 2));
                }
                other => panic!("Expected populated query, got {other:?}"),
            }
        }
        assert_eq!(fresh.entity_count(), 1);
    }
}
