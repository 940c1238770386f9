//! Channel subscription with deterministic teardown
//!
//! A [`Subscription`] owns one background listener task that receives every
//! bus message, keeps the ones posted on its channel and hands their
//! payload to a handler. `stop()` cancels the task and waits for it; dropping
//! the subscription cancels it as well.

use shared::message::{BusMessage, Channel};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::MessageBus;

/// 频道订阅
#[derive(Debug)]
pub struct Subscription {
    channel: Channel,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// 订阅频道并启动监听任务
    ///
    /// 订阅在返回前完成，之后发布的消息都不会丢失。
    pub fn spawn<F>(bus: &MessageBus, channel: Channel, handler: F) -> Self
    where
        F: Fn(&BusMessage) + Send + 'static,
    {
        let receiver = bus.subscribe();
        // 总线关闭时一并退出
        let token = bus.shutdown_token().child_token();
        let handle = tokio::spawn(listen(receiver, channel, token.clone(), handler));

        tracing::info!(channel = %channel, "Subscribed to channel");

        Self {
            channel,
            token,
            handle: Some(handle),
        }
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
            && self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 取消订阅并等待监听任务退出
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            tracing::warn!(channel = %self.channel, error = %e, "Listener task ended abnormally");
        }
        tracing::info!(channel = %self.channel, "Unsubscribed from channel");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn listen<F>(
    mut receiver: broadcast::Receiver<BusMessage>,
    channel: Channel,
    token: CancellationToken,
    handler: F,
) where
    F: Fn(&BusMessage),
{
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(channel = %channel, "Listener received shutdown signal");
                break;
            }
            msg_result = receiver.recv() => {
                match msg_result {
                    Ok(msg) => {
                        if msg.is_on(&channel) {
                            handler(&msg);
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(channel = %channel, skipped, "Listener lagged, messages skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!(channel = %channel, "Bus channel closed");
                        break;
                    }
                }
            }
        }
    }
}
