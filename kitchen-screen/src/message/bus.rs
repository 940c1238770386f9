//! 消息总线核心实现
//!
//! # 架构
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                  MessageBus                   │
//! │  ┌────────────────────────────────────────┐  │
//! │  │  broadcast::Sender<BusMessage>         │  │
//! │  └────────────────────────────────────────┘  │
//! └──────────────────────┬───────────────────────┘
//!                        │  所有频道共用一个广播通道，
//!            ┌───────────┴───────────┐ 订阅方按频道名过滤
//!            ▼                       ▼
//!     KitchenScreen            WaiterStation
//!     (waiter-{id})            (kitchen-{id})
//! ```

use serde::Serialize;
use shared::message::{BusMessage, Channel};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::utils::{AppError, AppResult};

/// Default capacity of the broadcast channel
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// 消息总线 - 负责频道消息的发布与订阅
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl MessageBus {
    /// 创建默认容量的消息总线
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// 创建指定容量的消息总线
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布消息到所有订阅者
    ///
    /// # 错误
    ///
    /// 总线已关闭或当前没有任何订阅者
    pub fn publish(&self, msg: BusMessage) -> AppResult<()> {
        if self.shutdown_token.is_cancelled() {
            return Err(AppError::bus("message bus is shut down"));
        }
        self.tx
            .send(msg)
            .map_err(|e| AppError::bus(format!("no subscriber for {}", e.0.channel)))?;
        Ok(())
    }

    /// 序列化载荷并发布到指定频道
    pub fn publish_to<T: Serialize>(&self, channel: &Channel, payload: &T) -> AppResult<()> {
        let msg = BusMessage::notification(channel, payload)?;
        tracing::debug!(channel = %channel, request_id = %msg.request_id, "Publishing bus message");
        self.publish(msg)
    }

    /// 订阅总线上的所有消息
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// 获取关闭令牌 (用于监控关闭信号)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 关闭消息总线
    ///
    /// 所有监听任务随之退出；已经应用的状态不受影响
    pub fn shutdown(&self) {
        tracing::info!("Shutting down message bus");
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::KitchenNotice;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = MessageBus::with_capacity(16);
        let mut rx = bus.subscribe();

        bus.publish_to(&Channel::Kitchen(1), &KitchenNotice::new("kitchen", "ready"))
            .unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.channel, "kitchen-1");
        let notice: KitchenNotice = msg.parse_payload().unwrap();
        assert_eq!(notice.message, "ready");
    }

    #[test]
    fn test_publish_without_subscriber_fails() {
        let bus = MessageBus::new();
        let result = bus.publish_to(&Channel::Waiter(1), &serde_json::json!({}));
        assert!(matches!(result, Err(AppError::Bus(_))));
    }

    #[test]
    fn test_publish_after_shutdown_fails() {
        let bus = MessageBus::new();
        let _rx = bus.subscribe();
        bus.shutdown();
        let result = bus.publish_to(&Channel::Waiter(1), &serde_json::json!({}));
        assert!(matches!(result, Err(AppError::Bus(_))));
    }
}
