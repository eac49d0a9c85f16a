//! State management module
//!
//! Tracks per-list task cursors so repeated runs only fetch what changed.
//!
//! # Overview
//!
//! - `State` - serializable stream and partition cursors
//! - `StateManager` - shared handle with optional file persistence
//!
//! Cursors are checkpointed after each list is fully read.

mod manager;
mod types;

pub use manager::StateManager;
pub use types::{PartitionState, State, StreamState};
