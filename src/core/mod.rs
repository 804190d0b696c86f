//! Core engine module
//!
//! This module contains the two engine components:
//! - `entity` - the per-account event-sourced state machine
//! - `mailbox` - the single-consumer command queue serializing each entity
//! - `registry` - the router multiplexing entities behind one front door

pub mod entity;
pub mod mailbox;
pub mod registry;

pub use entity::AccountEntity;
pub use mailbox::EntityHandle;
pub use registry::EntityRegistry;
