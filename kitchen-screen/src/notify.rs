//! 用户通知
//!
//! 核心逻辑只通过 [`UserNotifier`] 向操作员报告结果，具体展示方式由宿主决定。

use shared::message::NotificationLevel;

/// 向操作员展示通知
pub trait UserNotifier: Send + Sync {
    fn notify(&self, level: NotificationLevel, message: &str);
}

/// 把通知写入日志的默认实现
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl UserNotifier for TracingNotifier {
    fn notify(&self, level: NotificationLevel, message: &str) {
        match level {
            NotificationLevel::Info => tracing::info!(target: "notify", "{}", message),
            NotificationLevel::Warning => tracing::warn!(target: "notify", "{}", message),
            NotificationLevel::Error => tracing::error!(target: "notify", "{}", message),
        }
    }
}
