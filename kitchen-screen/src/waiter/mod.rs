//! Waiter Station (POS 端)
//!
//! 把送厨订单以快照形式发布到 `waiter-{config}`，并把 `kitchen-{config}`
//! 上的厨房通知展示给服务员。

use std::sync::Arc;

use serde_json::Value;
use shared::message::{BusMessage, Channel, NotificationLevel};
use shared::order::PosOrder;

use crate::forward::{ApiForwarder, ForwardOutcome};
use crate::message::{MessageBus, Subscription};
use crate::notify::UserNotifier;
use crate::utils::AppResult;

/// Sender tag on snapshots published by the POS side
pub const WAITER_SENDER: &str = "waiter";

/// Extract display text from a kitchen notice body
///
/// Uses `message`, then `text`, then the whole JSON body.
pub fn notice_text(body: &Value) -> String {
    ["message", "text"]
        .into_iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// 服务员端
pub struct WaiterStation {
    config_id: i64,
    bus: MessageBus,
    notifier: Arc<dyn UserNotifier>,
    forwarder: Option<ApiForwarder>,
    subscription: Option<Subscription>,
}

impl WaiterStation {
    pub fn new(config_id: i64, bus: MessageBus, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            config_id,
            bus,
            notifier,
            forwarder: None,
            subscription: None,
        }
    }

    /// 启用外部 API 转发
    pub fn with_forwarder(mut self, forwarder: ApiForwarder) -> Self {
        self.forwarder = Some(forwarder);
        self
    }

    pub fn config_id(&self) -> i64 {
        self.config_id
    }

    /// 开始监听 `kitchen-{config}` 频道
    pub fn start(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let notifier = self.notifier.clone();
        let channel = Channel::Kitchen(self.config_id);
        self.subscription = Some(Subscription::spawn(&self.bus, channel, move |msg| {
            on_kitchen_notice(notifier.as_ref(), msg);
        }));
    }

    pub async fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.stop().await;
        }
    }

    /// 发送订单到厨房
    ///
    /// 快照同步发布；启用转发时外部 API 请求在后台执行，结果通过通知报告。
    /// 转发需要在 tokio 运行时内调用。
    pub fn send_order_in_preparation(&self, order: &PosOrder) -> AppResult<()> {
        let snapshot = order.to_snapshot(self.config_id, WAITER_SENDER);
        self.bus
            .publish_to(&Channel::Waiter(self.config_id), &snapshot)?;

        tracing::info!(
            config_id = self.config_id,
            pos_reference = %order.pos_reference,
            lines = snapshot.lines.len(),
            "Order sent to kitchen"
        );

        if let Some(forwarder) = self.forwarder.as_ref().filter(|f| f.is_enabled()) {
            let forwarder = forwarder.clone();
            let notifier = self.notifier.clone();
            let order = order.clone();
            tokio::spawn(async move {
                match forwarder.send(&order).await {
                    Ok(ForwardOutcome::Sent { .. }) => notifier.notify(
                        NotificationLevel::Info,
                        &format!("Order sent to external API: {}", order.pos_reference),
                    ),
                    Ok(ForwardOutcome::Skipped) => {}
                    Err(e) => {
                        tracing::error!(pos_reference = %order.pos_reference, error = %e, "Forwarding failed");
                        notifier.notify(
                            NotificationLevel::Error,
                            &format!("Error sending order to external API: {}", e),
                        );
                    }
                }
            });
        }

        Ok(())
    }
}

fn on_kitchen_notice(notifier: &dyn UserNotifier, msg: &BusMessage) {
    let text = match msg.parse_payload::<Value>() {
        Ok(body) => {
            // 自己发出的消息不提示
            if body.get("from").and_then(Value::as_str) == Some(WAITER_SENDER) {
                return;
            }
            notice_text(&body)
        }
        Err(e) => {
            tracing::debug!(request_id = %msg.request_id, error = %e, "Kitchen notice is not JSON");
            String::from_utf8_lossy(&msg.payload).into_owned()
        }
    };
    notifier.notify(NotificationLevel::Info, &text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;
    use shared::message::KitchenNotice;
    use shared::order::{OrderSnapshot, PosOrderLine};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingNotifier {
        seen: Mutex<Vec<(NotificationLevel, String)>>,
    }

    impl UserNotifier for RecordingNotifier {
        fn notify(&self, level: NotificationLevel, message: &str) {
            self.seen.lock().push((level, message.to_string()));
        }
    }

    #[test]
    fn test_notice_text_fallbacks() {
        assert_eq!(notice_text(&json!({"message": "ready", "text": "x"})), "ready");
        assert_eq!(notice_text(&json!({"text": "hello"})), "hello");
        assert_eq!(notice_text(&json!({"other": 1})), r#"{"other":1}"#);
    }

    #[tokio::test]
    async fn test_send_order_publishes_snapshot() {
        let bus = MessageBus::with_capacity(16);
        let mut rx = bus.subscribe();
        let station = WaiterStation::new(3, bus.clone(), Arc::new(RecordingNotifier::default()));

        let order = PosOrder {
            pos_reference: "Order 00003-001-0001".into(),
            date_order: None,
            state: Some("draft".into()),
            table_number: Some("12".into()),
            floor_name: Some("Terrace".into()),
            lines: vec![PosOrderLine {
                product_id: 9,
                product_name: "Salad".into(),
                qty: 1.0,
                price_unit: 0.0,
                price_subtotal: 0.0,
                price_subtotal_incl: 0.0,
                discount: 0.0,
                note: None,
            }],
        };
        station.send_order_in_preparation(&order).unwrap();

        let msg = rx.recv().await.unwrap();
        assert!(msg.is_on(&Channel::Waiter(3)));
        let snapshot = OrderSnapshot::from_slice(&msg.payload).unwrap();
        assert_eq!(snapshot.config_id, 3);
        assert_eq!(snapshot.from.as_deref(), Some("waiter"));
        assert_eq!(snapshot.table.as_deref(), Some("12"));
        assert_eq!(snapshot.floor.as_deref(), Some("Terrace"));
        assert_eq!(snapshot.lines.len(), 1);
    }

    #[tokio::test]
    async fn test_listener_skips_own_messages() {
        let bus = MessageBus::with_capacity(16);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut station = WaiterStation::new(1, bus.clone(), notifier.clone());
        station.start();

        bus.publish_to(&Channel::Kitchen(1), &KitchenNotice::new("waiter", "echo"))
            .unwrap();
        bus.publish_to(&Channel::Kitchen(2), &KitchenNotice::new("kitchen", "other shop"))
            .unwrap();
        bus.publish_to(&Channel::Kitchen(1), &KitchenNotice::new("kitchen", "Order Completed"))
            .unwrap();

        for _ in 0..100 {
            if !notifier.seen.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        station.stop().await;

        let seen = notifier.seen.lock();
        assert_eq!(
            *seen,
            vec![(NotificationLevel::Info, "Order Completed".to_string())]
        );
    }
}
