//! Kitchen Screen
//!
//! 厨房显示端：监听 `waiter-{shop}` 频道上的订单快照，计算差异后追加显示单；
//! 出餐时在 `kitchen-{shop}` 频道上广播确认。
//!
//! # 消息流
//!
//! ```text
//! waiter-{shop} ──▶ handle_payload ──▶ OrderStateStore::apply ──▶ DisplayOrder
//!
//! complete_order(id) ──▶ mark_completed ──▶ KitchenNotice ──▶ kitchen-{shop}
//!                                                │ 失败
//!                                                └──▶ UserNotifier (error)
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use shared::message::{BusMessage, Channel, KitchenNotice, NotificationLevel};
use shared::order::{CompletionNotice, DisplayOrder, KitchenState, OrderSnapshot};

use crate::message::{MessageBus, Subscription};
use crate::notify::UserNotifier;
use crate::orders::{ApplyOutcome, KitchenCounters, OrderStateStore};
use crate::utils::AppResult;

/// Sender tag used on kitchen notices
pub const KITCHEN_SENDER: &str = "kitchen";

/// Format the completion broadcast text
pub fn completion_message(notice: &CompletionNotice) -> String {
    format!(
        "Order Completed\nTable: {}\n Products:{}",
        notice.table.as_deref().unwrap_or_default(),
        notice.lines.join(",")
    )
}

/// 监听任务与 API 共用的状态
struct ScreenInner {
    shop_id: i64,
    bus: MessageBus,
    store: Mutex<OrderStateStore>,
    notifier: Arc<dyn UserNotifier>,
}

impl ScreenInner {
    fn handle_payload(&self, payload: &[u8]) -> AppResult<ApplyOutcome> {
        let value: Value = serde_json::from_slice(payload).map_err(shared::MessageError::from)?;

        // 其他店铺的消息不做校验直接忽略
        if let Some(config_id) = value.get("config_id").and_then(Value::as_i64)
            && config_id != self.shop_id
        {
            tracing::debug!(config_id, shop_id = self.shop_id, "Ignoring snapshot for another shop");
            return Ok(ApplyOutcome::ForeignShop { config_id });
        }

        let snapshot = OrderSnapshot::from_value(&value)?;
        Ok(self.store.lock().apply(&snapshot))
    }

    fn on_message(&self, msg: &BusMessage) {
        match self.handle_payload(&msg.payload) {
            Ok(ApplyOutcome::Appended(order)) => {
                tracing::debug!(
                    request_id = %msg.request_id,
                    kitchen_order_id = order.kitchen_order_id,
                    "Snapshot applied"
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(request_id = %msg.request_id, error = %e, "Dropping malformed snapshot");
            }
        }
    }

    fn complete_order(&self, kitchen_order_id: u64) -> Option<CompletionNotice> {
        // 先修改状态，锁在广播前释放
        let notice = self.store.lock().mark_completed(kitchen_order_id)?;

        let ack = KitchenNotice::new(KITCHEN_SENDER, completion_message(&notice));
        if let Err(e) = self.bus.publish_to(&Channel::Kitchen(self.shop_id), &ack) {
            tracing::error!(kitchen_order_id, error = %e, "Failed to broadcast completion");
            self.notifier.notify(
                NotificationLevel::Error,
                &format!("Failed to notify waiters for order {}: {}", kitchen_order_id, e),
            );
        }

        Some(notice)
    }
}

/// 厨房屏幕
pub struct KitchenScreen {
    inner: Arc<ScreenInner>,
    subscription: Option<Subscription>,
    stage: KitchenState,
}

impl KitchenScreen {
    pub fn new(shop_id: i64, bus: MessageBus, notifier: Arc<dyn UserNotifier>) -> Self {
        Self {
            inner: Arc::new(ScreenInner {
                shop_id,
                bus,
                store: Mutex::new(OrderStateStore::new(shop_id)),
                notifier,
            }),
            subscription: None,
            stage: KitchenState::Draft,
        }
    }

    pub fn shop_id(&self) -> i64 {
        self.inner.shop_id
    }

    /// 开始监听 `waiter-{shop}` 频道 (重复调用无效果)
    pub fn start(&mut self) {
        if self.subscription.is_some() {
            return;
        }
        let inner = self.inner.clone();
        let channel = Channel::Waiter(inner.shop_id);
        self.subscription = Some(Subscription::spawn(&self.inner.bus, channel, move |msg| {
            inner.on_message(msg);
        }));
        tracing::info!(shop_id = self.inner.shop_id, "Kitchen screen started");
    }

    /// 停止监听并等待监听任务退出；已有状态保留
    pub async fn stop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.stop().await;
            tracing::info!(shop_id = self.inner.shop_id, "Kitchen screen stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.as_ref().is_some_and(Subscription::is_active)
    }

    /// 处理一条原始快照载荷
    ///
    /// 格式错误时返回错误且不修改状态。
    pub fn handle_payload(&self, payload: &[u8]) -> AppResult<ApplyOutcome> {
        self.inner.handle_payload(payload)
    }

    /// 标记出餐并广播确认
    ///
    /// 未知或已完成的编号返回 `None`，不做任何广播。
    pub fn complete_order(&self, kitchen_order_id: u64) -> Option<CompletionNotice> {
        self.inner.complete_order(kitchen_order_id)
    }

    /// 切换显示的阶段
    pub fn select_stage(&mut self, stage: KitchenState) {
        self.stage = stage;
    }

    pub fn stage(&self) -> KitchenState {
        self.stage
    }

    /// 当前阶段的显示单
    pub fn visible_orders(&self) -> Vec<DisplayOrder> {
        self.inner.store.lock().orders_in_stage(self.stage)
    }

    pub fn orders(&self) -> Vec<DisplayOrder> {
        self.inner.store.lock().orders().to_vec()
    }

    pub fn order(&self, kitchen_order_id: u64) -> Option<DisplayOrder> {
        self.inner.store.lock().get(kitchen_order_id).cloned()
    }

    pub fn counters(&self) -> KitchenCounters {
        self.inner.store.lock().counters()
    }

    pub fn set_waiting_count(&self, waiting_count: u64) {
        self.inner.store.lock().set_waiting_count(waiting_count);
    }
}
