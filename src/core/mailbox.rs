//! Per-entity command mailbox
//!
//! This module implements the at-most-one-in-flight-per-identifier
//! guarantee: each entity owns a single-consumer command queue drained by
//! exactly one worker task. Commands for one identifier are therefore
//! strictly serialized without any locking around entity state, while
//! entities for different identifiers run in parallel.
//!
//! # Architecture
//!
//! ```text
//! EntityHandle (cloneable)
//!     └── mpsc::Sender<Envelope> ──> worker task ──> AccountEntity
//!                                        │
//!               oneshot reply <──────────┘
//! ```
//!
//! Replies travel over per-command oneshot channels. A caller that stops
//! waiting (timeout, disconnect) merely drops its receiver; the worker
//! still finishes the command, so a durable effect is never half-applied
//! because a caller went away.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::entity::AccountEntity;
use crate::types::{AccountId, Command, LedgerError, Response};

/// A command paired with its reply channel
struct Envelope {
    command: Command,
    reply: oneshot::Sender<Result<Response, LedgerError>>,
}

/// Cheaply cloneable handle to one entity's mailbox
///
/// The registry hands out clones of this handle; any number of callers
/// may send through it concurrently, and the single worker behind it
/// serializes their commands in arrival order (FIFO per entity).
#[derive(Debug, Clone)]
pub struct EntityHandle {
    /// Identifier of the entity behind this handle
    account_id: AccountId,

    /// Sending side of the entity's command queue
    sender: mpsc::Sender<Envelope>,
}

impl EntityHandle {
    /// Send one command and await its response
    ///
    /// Enqueues the command and waits for the worker's reply. Responses
    /// for a given identifier are observed in the same order commands were
    /// enqueued.
    ///
    /// # Returns
    ///
    /// * `Ok(Response)` - the entity evaluated the command
    /// * `Err(LedgerError::MailboxClosed)` - the worker is gone and the
    ///   command was never enqueued
    /// * `Err(LedgerError::ReplyDropped)` - the worker stopped after
    ///   accepting the command; whether its effect applied is unknown
    /// * `Err(..)` - storage failures forwarded from the entity
    pub async fn send(&self, command: Command) -> Result<Response, LedgerError> {
        let (reply, receiver) = oneshot::channel();

        self.sender
            .send(Envelope { command, reply })
            .await
            .map_err(|_| LedgerError::mailbox_closed(self.account_id.clone()))?;

        receiver
            .await
            .map_err(|_| LedgerError::reply_dropped(self.account_id.clone()))?
    }
}

/// Spawn the worker task for an entity and return its handle
///
/// The worker drains the queue one envelope at a time and exits when the
/// last handle is dropped. Reply sends are allowed to fail: that only
/// means the caller stopped waiting, and the command's effect stands.
///
/// # Arguments
///
/// * `entity` - The entity the worker takes ownership of
/// * `capacity` - Mailbox depth; senders back-pressure when it is full
pub fn spawn_entity(entity: AccountEntity, capacity: usize) -> EntityHandle {
    let (sender, mut receiver) = mpsc::channel::<Envelope>(capacity);
    let account_id = entity.account_id().clone();

    tokio::spawn(async move {
        let mut entity = entity;
        while let Some(Envelope { command, reply }) = receiver.recv().await {
            let response = entity.handle(command).await;
            let _ = reply.send(response);
        }
        debug!(account_id = %entity.account_id(), "mailbox closed, entity worker exiting");
    });

    EntityHandle { account_id, sender }
}
