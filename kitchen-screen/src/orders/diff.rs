//! Order diff engine
//!
//! Computes what changed in a POS order since the kitchen last saw it.
//!
//! # Algorithm
//!
//! ```text
//! history (DisplayOrder[])            incoming (OrderSnapshot)
//!        │ same normalized reference          │
//!        ▼                                    ▼
//!   prev: Σ signed qty per product       new: Σ qty per product
//!   (CANCELLED: lines subtract)          (absolute totals)
//!        └──────────────┬─────────────────────┘
//!                       ▼
//!         per product: new - prev
//!           > 0 → added line
//!           < 0 → "CANCELLED: ..." line
//!           = 0 → nothing
//! ```
//!
//! History entries are themselves diffs (cancellations tagged by name),
//! while the incoming snapshot is an absolute line list. Folding the
//! history with signs reconstructs the last known absolute state.

use std::collections::{BTreeMap, BTreeSet};

use shared::order::{DiffLine, DisplayOrder, OrderSnapshot};

use super::reference::{
    cancelled_label, is_cancelled_name, normalize_pos_reference, strip_cancelled_prefixes,
};

/// Aggregated prior state of one product
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateEntry {
    pub qty: f64,
    /// Most recent non-empty name with cancellation tags removed
    pub last_sanitized_name: String,
    /// Most recent non-empty raw name
    pub last_raw_name: String,
}

/// Incoming total of one product
#[derive(Debug, Clone, Default, PartialEq)]
struct IncomingEntry {
    qty: f64,
    last_raw_name: String,
}

/// Fold every stored display order belonging to `normalized_ref` into
/// per-product signed totals.
pub fn aggregate_history(
    history: &[DisplayOrder],
    normalized_ref: &str,
) -> BTreeMap<i64, AggregateEntry> {
    let mut prev: BTreeMap<i64, AggregateEntry> = BTreeMap::new();

    for order in history
        .iter()
        .filter(|o| normalize_pos_reference(&o.pos_reference) == normalized_ref)
    {
        for line in &order.lines {
            let raw_name = line.product_name.as_str();
            let sanitized = strip_cancelled_prefixes(raw_name);
            let qty = finite_or_zero(line.qty);

            let entry = prev.entry(line.product_id).or_default();
            if is_cancelled_name(raw_name) {
                entry.qty -= qty;
            } else {
                entry.qty += qty;
            }
            if !sanitized.is_empty() {
                entry.last_sanitized_name = sanitized.to_string();
            }
            if !raw_name.is_empty() {
                entry.last_raw_name = raw_name.to_string();
            }
        }
    }

    prev
}

fn aggregate_incoming(incoming: &OrderSnapshot) -> BTreeMap<i64, IncomingEntry> {
    let mut new: BTreeMap<i64, IncomingEntry> = BTreeMap::new();

    for line in &incoming.lines {
        let entry = new.entry(line.product_id).or_default();
        entry.qty += finite_or_zero(line.qty);
        if !line.product_name.is_empty() {
            entry.last_raw_name = line.product_name.clone();
        }
    }

    new
}

/// Compute the diff lines of `incoming` against the stored history
///
/// An empty result means nothing observable changed and no display order
/// should be created. Lines are sorted by product id.
pub fn compute_diff(history: &[DisplayOrder], incoming: &OrderSnapshot) -> Vec<DiffLine> {
    let normalized_ref = normalize_pos_reference(&incoming.pos_reference);

    let prev = aggregate_history(history, &normalized_ref);
    let new = aggregate_incoming(incoming);

    let product_ids: BTreeSet<i64> = prev.keys().chain(new.keys()).copied().collect();
    let empty_prev = AggregateEntry::default();
    let empty_new = IncomingEntry::default();

    let mut lines = Vec::new();
    for product_id in product_ids {
        let prev_entry = prev.get(&product_id).unwrap_or(&empty_prev);
        let new_entry = new.get(&product_id).unwrap_or(&empty_new);

        let prev_qty = finite_or_zero(prev_entry.qty);
        let new_qty = finite_or_zero(new_entry.qty);
        let incoming_name = new_entry.last_raw_name.trim();

        if new_qty > prev_qty {
            let name = first_non_empty(&[incoming_name, prev_entry.last_sanitized_name.as_str()]);
            lines.push(DiffLine::new(product_id, name, new_qty - prev_qty));
        } else if new_qty < prev_qty {
            let base = first_non_empty(&[
                incoming_name,
                prev_entry.last_raw_name.as_str(),
                prev_entry.last_sanitized_name.as_str(),
            ]);
            lines.push(DiffLine::new(product_id, cancelled_label(base), prev_qty - new_qty));
        }
    }

    let lines = merge_lines(lines);

    tracing::debug!(
        pos_reference = %incoming.pos_reference,
        normalized_ref = %normalized_ref,
        diff_lines = lines.len(),
        "Computed order diff"
    );

    lines
}

/// Merge lines sharing a product id into one, summing quantities
///
/// The first occurrence keeps its position and name.
pub fn merge_lines(lines: Vec<DiffLine>) -> Vec<DiffLine> {
    let mut merged: Vec<DiffLine> = Vec::with_capacity(lines.len());

    for line in lines {
        let qty = finite_or_zero(line.qty);
        match merged.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.qty += qty,
            None => merged.push(DiffLine { qty, ..line }),
        }
    }

    merged
}

fn finite_or_zero(qty: f64) -> f64 {
    if qty.is_finite() { qty } else { 0.0 }
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|s| !s.is_empty())
        .unwrap_or("")
}
