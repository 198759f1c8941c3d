//! Intermediate Representation (IR) for host action sets
//!
//! This module provides the descriptor records for host actions, the
//! resolution of check types and defaults, and the block specs every
//! emitter works from.

pub mod types;
pub mod action;
pub mod resolve;
pub mod block;
pub mod inventory;

pub use types::*;
pub use action::*;
pub use resolve::*;
pub use block::*;
pub use inventory::*;
