use kitchen_screen::{Channel, KitchenScreen, MessageBus, UserNotifier, WaiterStation};
use parking_lot::Mutex;
use serde_json::json;
use shared::message::NotificationLevel;
use shared::order::{DiffLine, KitchenState, PosOrder, PosOrderLine};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<(NotificationLevel, String)>>,
}

impl UserNotifier for RecordingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.seen.lock().push((level, message.to_string()));
    }
}

/// Poll `check` until it holds or ~2s pass
async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if check() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    check()
}

fn line(product_id: i64, name: &str, qty: f64) -> PosOrderLine {
    PosOrderLine {
        product_id,
        product_name: name.to_string(),
        qty,
        price_unit: 0.0,
        price_subtotal: 0.0,
        price_subtotal_incl: 0.0,
        discount: 0.0,
        note: None,
    }
}

fn pos_order(reference: &str, lines: Vec<PosOrderLine>) -> PosOrder {
    PosOrder {
        pos_reference: reference.to_string(),
        date_order: Some("2025-03-01 19:30:00".to_string()),
        state: Some("draft".to_string()),
        table_number: Some("5".to_string()),
        floor_name: Some("Main".to_string()),
        lines,
    }
}

#[tokio::test]
async fn test_waiter_to_kitchen_and_back() {
    let bus = MessageBus::with_capacity(64);
    let kitchen_notes = Arc::new(RecordingNotifier::default());
    let waiter_notes = Arc::new(RecordingNotifier::default());

    let mut screen = KitchenScreen::new(1, bus.clone(), kitchen_notes.clone());
    let mut waiter = WaiterStation::new(1, bus.clone(), waiter_notes.clone());
    screen.start();
    waiter.start();

    // First send, then a revision that drops one Coke and adds Fries
    waiter
        .send_order_in_preparation(&pos_order("Order 00001-001-0001", vec![line(1, "Coke", 2.0)]))
        .unwrap();
    assert!(wait_until(|| screen.orders().len() == 1).await);

    waiter
        .send_order_in_preparation(&pos_order(
            "00001-001-0001",
            vec![line(1, "Coke", 1.0), line(2, "Fries", 1.0)],
        ))
        .unwrap();
    assert!(wait_until(|| screen.orders().len() == 2).await);

    let orders = screen.orders();
    assert_eq!(orders[0].lines, vec![DiffLine::new(1, "Coke", 2.0)]);
    assert_eq!(
        orders[1].lines,
        vec![DiffLine::new(1, "CANCELLED: Coke", 1.0), DiffLine::new(2, "Fries", 1.0)]
    );
    assert_eq!(orders[1].kitchen_order_id, 2);

    // Identical resend changes nothing
    waiter
        .send_order_in_preparation(&pos_order(
            "Order 00001-001-0001",
            vec![line(1, "Coke", 1.0), line(2, "Fries", 1.0)],
        ))
        .unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(screen.orders().len(), 2);

    // Completion reaches the waiter side
    let notice = screen.complete_order(2).unwrap();
    assert_eq!(notice.table.as_deref(), Some("5"));
    assert!(wait_until(|| !waiter_notes.seen.lock().is_empty()).await);

    {
        let seen = waiter_notes.seen.lock();
        assert_eq!(seen[0].0, NotificationLevel::Info);
        assert_eq!(
            seen[0].1,
            "Order Completed\nTable: 5\n Products:CANCELLED: Coke,Fries"
        );
    }

    let counters = screen.counters();
    assert_eq!(counters.draft_count, 1);
    assert_eq!(counters.ready_count, 1);

    screen.select_stage(KitchenState::Completed);
    assert_eq!(screen.visible_orders().len(), 1);
    assert!(kitchen_notes.seen.lock().is_empty());

    waiter.stop().await;
    screen.stop().await;
}

#[tokio::test]
async fn test_other_shops_and_garbage_are_ignored() {
    let bus = MessageBus::with_capacity(64);
    let mut screen = KitchenScreen::new(7, bus.clone(), Arc::new(RecordingNotifier::default()));
    screen.start();

    bus.publish_to(&Channel::Waiter(7), &json!("just a string")).unwrap();
    bus.publish_to(&Channel::Waiter(7), &json!({"pos_reference": "Order 1"})).unwrap();
    bus.publish_to(
        &Channel::Waiter(7),
        &json!({
            "config_id": 8,
            "pos_reference": "Order 1",
            "lines": [{"product_id": 1, "product_name": "Coke", "qty": 1}]
        }),
    )
    .unwrap();
    bus.publish_to(
        &Channel::Waiter(7),
        &json!({
            "config_id": 7,
            "pos_reference": "Order 2",
            "lines": [
                {"product_id": 3, "product_name": "Soup", "qty": "2"},
                {"productId": "4", "product_name": "Bread", "qty": null}
            ]
        }),
    )
    .unwrap();

    assert!(wait_until(|| screen.orders().len() == 1).await);
    sleep(Duration::from_millis(50)).await;

    let orders = screen.orders();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].pos_reference, "Order 2");
    // Bread has quantity 0 on both sides and produces no line
    assert_eq!(orders[0].lines, vec![DiffLine::new(3, "Soup", 2.0)]);

    screen.stop().await;
    assert!(!screen.is_running());

    // State survives stop
    assert_eq!(screen.orders().len(), 1);
}

#[tokio::test]
async fn test_stopped_screen_receives_nothing() {
    let bus = MessageBus::with_capacity(64);
    let mut screen = KitchenScreen::new(1, bus.clone(), Arc::new(RecordingNotifier::default()));
    screen.start();
    screen.stop().await;

    let _rx = bus.subscribe();
    bus.publish_to(
        &Channel::Waiter(1),
        &json!({
            "config_id": 1,
            "pos_reference": "Order 1",
            "lines": [{"product_id": 1, "product_name": "Coke", "qty": 1}]
        }),
    )
    .unwrap();

    sleep(Duration::from_millis(50)).await;
    assert!(screen.orders().is_empty());
}
