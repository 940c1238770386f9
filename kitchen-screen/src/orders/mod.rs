//! Kitchen order aggregation
//!
//! - **reference**: POS reference normalization and `CANCELLED:` tag handling
//! - **diff**: per-revision diff of a snapshot against stored history
//! - **store**: display order list and dashboard counters
//!
//! # Data Flow
//!
//! ```text
//! OrderSnapshot → OrderStateStore::apply
//!                     ├─ compute_diff(history, snapshot)
//!                     ├─ empty? → NoChange
//!                     └─ append DisplayOrder, draft_count += 1
//! ```

pub mod diff;
pub mod reference;
pub mod store;

// Re-exports
pub use diff::{AggregateEntry, aggregate_history, compute_diff, merge_lines};
pub use reference::{
    CANCELLED_TAG, cancelled_label, is_cancelled_name, normalize_pos_reference,
    strip_cancelled_prefixes,
};
pub use store::{ApplyOutcome, KitchenCounters, OrderStateStore};

pub use shared::order::{
    CompletionNotice, DiffLine, DisplayOrder, KitchenState, OrderSnapshot, SnapshotLine,
};
