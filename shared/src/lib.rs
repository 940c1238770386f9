//! Shared types for the kitchen screen
//!
//! Types exchanged between the POS (waiter) side and the kitchen display:
//! order snapshots, kitchen display records, bus messages and the
//! boundary validation error.

pub mod error;
pub mod message;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::MessageError;
pub use message::{BusMessage, Channel, KitchenNotice, NotificationLevel};
pub use order::{
    CompletionNotice, DiffLine, DisplayOrder, KitchenState, OrderSnapshot, PosOrder, PosOrderLine,
    SnapshotLine,
};
