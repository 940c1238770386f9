//! Kitchen order types
//!
//! - Snapshots: full line list of a POS order at a point in time (inbound)
//! - Display orders: per-revision diff records shown on the kitchen screen
//! - POS orders: the host platform's order, as the waiter station sees it

pub mod display;
pub mod pos;
pub mod snapshot;

// Re-exports
pub use display::{CompletionNotice, DiffLine, DisplayOrder, KitchenState};
pub use pos::{PosOrder, PosOrderLine};
pub use snapshot::{OrderSnapshot, SnapshotLine, coerce_quantity};
