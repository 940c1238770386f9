//! OrderStateStore - kitchen display state for one shop
//!
//! Owns the ordered list of [`DisplayOrder`]s for the current kitchen session
//! together with the dashboard counters. Callers only ever get clones.
//!
//! # Counters
//!
//! | Counter | Changes on |
//! |---------|-----------|
//! | draft_count | +1 on append, -1 on completion |
//! | ready_count | +1 on completion |
//! | waiting_count | set by the caller |

use serde::{Deserialize, Serialize};
use shared::order::{CompletionNotice, DiffLine, DisplayOrder, KitchenState, OrderSnapshot};

use super::diff::compute_diff;

/// Dashboard counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenCounters {
    pub draft_count: u64,
    pub waiting_count: u64,
    pub ready_count: u64,
}

/// Result of feeding one snapshot into the store
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    /// A new display order was appended
    Appended(DisplayOrder),
    /// Nothing changed since the last known state of this order
    NoChange,
    /// Snapshot belongs to another shop
    ForeignShop { config_id: i64 },
}

/// 厨房订单状态存储
#[derive(Debug)]
pub struct OrderStateStore {
    shop_id: i64,
    orders: Vec<DisplayOrder>,
    counters: KitchenCounters,
}

impl OrderStateStore {
    pub fn new(shop_id: i64) -> Self {
        Self {
            shop_id,
            orders: Vec::new(),
            counters: KitchenCounters::default(),
        }
    }

    pub fn shop_id(&self) -> i64 {
        self.shop_id
    }

    /// Diff a snapshot against the stored history and append the result
    ///
    /// Reading the history and appending happen under the same `&mut self`
    /// borrow, so callers sharing the store behind a lock get one critical
    /// section per snapshot.
    pub fn apply(&mut self, snapshot: &OrderSnapshot) -> ApplyOutcome {
        if snapshot.config_id != self.shop_id {
            return ApplyOutcome::ForeignShop {
                config_id: snapshot.config_id,
            };
        }

        let lines = compute_diff(&self.orders, snapshot);
        if lines.is_empty() {
            tracing::debug!(pos_reference = %snapshot.pos_reference, "No change in order, skipping");
            return ApplyOutcome::NoChange;
        }

        ApplyOutcome::Appended(self.append(snapshot, lines))
    }

    /// Append a display order built from `snapshot` metadata and `lines`
    ///
    /// Assigns `kitchen_order_id = len + 1`.
    pub fn append(&mut self, snapshot: &OrderSnapshot, lines: Vec<DiffLine>) -> DisplayOrder {
        let order = DisplayOrder {
            kitchen_order_id: self.orders.len() as u64 + 1,
            config_id: snapshot.config_id,
            pos_reference: snapshot.pos_reference.clone(),
            date_order: snapshot.date_order.clone(),
            from: snapshot.from.clone(),
            pos_state: snapshot.state.clone(),
            floor: snapshot.floor.clone(),
            table: snapshot.table.clone(),
            lines,
            state: KitchenState::Draft,
            received_at: chrono::Utc::now().timestamp_millis(),
        };

        self.orders.push(order.clone());
        self.counters.draft_count += 1;

        tracing::info!(
            kitchen_order_id = order.kitchen_order_id,
            pos_reference = %order.pos_reference,
            lines = order.lines.len(),
            "Kitchen order added"
        );

        order
    }

    /// Mark a display order as completed
    ///
    /// Returns `None` (and changes nothing) when the id is unknown or the
    /// order is already completed.
    pub fn mark_completed(&mut self, kitchen_order_id: u64) -> Option<CompletionNotice> {
        let Some(order) = self
            .orders
            .iter_mut()
            .find(|o| o.kitchen_order_id == kitchen_order_id)
        else {
            tracing::debug!(kitchen_order_id, "Complete requested for unknown kitchen order");
            return None;
        };

        if order.is_completed() {
            tracing::debug!(kitchen_order_id, "Kitchen order already completed");
            return None;
        }

        order.state = KitchenState::Completed;
        self.counters.ready_count += 1;
        self.counters.draft_count = self.counters.draft_count.saturating_sub(1);

        tracing::info!(
            kitchen_order_id,
            pos_reference = %order.pos_reference,
            "Kitchen order completed"
        );

        Some(order.completion_notice())
    }

    pub fn set_waiting_count(&mut self, waiting_count: u64) {
        self.counters.waiting_count = waiting_count;
    }

    pub fn counters(&self) -> KitchenCounters {
        self.counters
    }

    /// All display orders, oldest first
    pub fn orders(&self) -> &[DisplayOrder] {
        &self.orders
    }

    /// Display orders currently in `stage`
    pub fn orders_in_stage(&self, stage: KitchenState) -> Vec<DisplayOrder> {
        self.orders
            .iter()
            .filter(|o| o.state == stage)
            .cloned()
            .collect()
    }

    pub fn get(&self, kitchen_order_id: u64) -> Option<&DisplayOrder> {
        self.orders
            .iter()
            .find(|o| o.kitchen_order_id == kitchen_order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::SnapshotLine;

    fn snapshot(reference: &str, lines: Vec<(i64, &str, f64)>) -> OrderSnapshot {
        OrderSnapshot {
            config_id: 1,
            pos_reference: reference.to_string(),
            date_order: Some("2025-03-01 12:00:00".to_string()),
            from: Some("waiter".to_string()),
            state: Some("draft".to_string()),
            floor: Some("Main".to_string()),
            table: Some("7".to_string()),
            lines: lines
                .into_iter()
                .map(|(id, name, qty)| SnapshotLine::new(id, name, qty))
                .collect(),
        }
    }

    fn appended(outcome: ApplyOutcome) -> DisplayOrder {
        match outcome {
            ApplyOutcome::Appended(order) => order,
            other => panic!("expected Appended, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_assigns_sequential_ids_and_passthrough() {
        let mut store = OrderStateStore::new(1);

        let first = appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 1.0)])));
        let second = appended(store.apply(&snapshot("Order 2", vec![(2, "Tea", 1.0)])));

        assert_eq!(first.kitchen_order_id, 1);
        assert_eq!(second.kitchen_order_id, 2);
        assert_eq!(first.pos_reference, "Order 1");
        assert_eq!(first.table.as_deref(), Some("7"));
        assert_eq!(first.floor.as_deref(), Some("Main"));
        assert_eq!(first.pos_state.as_deref(), Some("draft"));
        assert_eq!(first.state, KitchenState::Draft);
        assert_eq!(store.len(), 2);
        assert_eq!(store.counters().draft_count, 2);
    }

    #[test]
    fn test_apply_skips_unchanged_and_foreign() {
        let mut store = OrderStateStore::new(1);
        let snap = snapshot("Order 1", vec![(1, "Coke", 2.0)]);

        appended(store.apply(&snap));
        assert_eq!(store.apply(&snap), ApplyOutcome::NoChange);

        let mut foreign = snapshot("Order 9", vec![(1, "Coke", 1.0)]);
        foreign.config_id = 2;
        assert_eq!(store.apply(&foreign), ApplyOutcome::ForeignShop { config_id: 2 });

        assert_eq!(store.len(), 1);
        assert_eq!(store.counters().draft_count, 1);
    }

    #[test]
    fn test_revisions_only_carry_changes() {
        let mut store = OrderStateStore::new(1);

        appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 2.0), (2, "Fries", 1.0)])));
        let revision = appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 1.0), (2, "Fries", 2.0)])));

        assert_eq!(
            revision.lines,
            vec![DiffLine::new(1, "CANCELLED: Coke", 1.0), DiffLine::new(2, "Fries", 1.0)]
        );

        // Back to the first state
        let back = appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 2.0), (2, "Fries", 1.0)])));
        assert_eq!(
            back.lines,
            vec![DiffLine::new(1, "Coke", 1.0), DiffLine::new(2, "CANCELLED: Fries", 1.0)]
        );
    }

    #[test]
    fn test_mark_completed_updates_counters() {
        let mut store = OrderStateStore::new(1);
        appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 1.0), (3, "Pizza", 1.0)])));
        appended(store.apply(&snapshot("Order 2", vec![(2, "Tea", 1.0)])));

        let notice = store.mark_completed(1).unwrap();
        assert_eq!(notice.kitchen_order_id, 1);
        assert_eq!(notice.table.as_deref(), Some("7"));
        assert_eq!(notice.lines, vec!["Coke".to_string(), "Pizza".to_string()]);

        assert_eq!(
            store.counters(),
            KitchenCounters {
                draft_count: 1,
                waiting_count: 0,
                ready_count: 1,
            }
        );
        assert!(store.get(1).unwrap().is_completed());
        assert_eq!(store.orders_in_stage(KitchenState::Completed).len(), 1);
        assert_eq!(store.orders_in_stage(KitchenState::Draft)[0].kitchen_order_id, 2);
    }

    #[test]
    fn test_mark_completed_unknown_or_repeated_is_noop() {
        let mut store = OrderStateStore::new(1);
        appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 1.0)])));

        assert!(store.mark_completed(42).is_none());
        assert!(store.mark_completed(1).is_some());
        assert!(store.mark_completed(1).is_none());

        assert_eq!(store.counters().ready_count, 1);
        assert_eq!(store.counters().draft_count, 0);
    }

    #[test]
    fn test_counter_invariant() {
        let mut store = OrderStateStore::new(1);
        let n = 10u64;
        for i in 0..n {
            let reference = format!("Order {}", i);
            appended(store.apply(&snapshot(&reference, vec![(1, "Coke", 1.0)])));
        }

        let completed = [2u64, 4, 5, 9];
        for id in completed {
            store.mark_completed(id);
        }

        let counters = store.counters();
        let m = completed.len() as u64;
        assert_eq!(counters.draft_count, n - m);
        assert_eq!(counters.ready_count, m);
    }

    #[test]
    fn test_waiting_count_is_caller_owned() {
        let mut store = OrderStateStore::new(1);
        store.set_waiting_count(3);
        appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 1.0)])));
        store.mark_completed(1);
        assert_eq!(store.counters().waiting_count, 3);
    }

    #[test]
    fn test_completed_history_still_counts_for_diff() {
        let mut store = OrderStateStore::new(1);
        appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 1.0)])));
        store.mark_completed(1);

        let next = appended(store.apply(&snapshot("Order 1", vec![(1, "Coke", 1.0), (2, "Cake", 1.0)])));
        assert_eq!(next.lines, vec![DiffLine::new(2, "Cake", 1.0)]);
        assert_eq!(next.kitchen_order_id, 2);
    }
}
