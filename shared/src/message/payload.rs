use serde::{Deserialize, Serialize};
use std::fmt;

// ==================== Notification Level ====================

/// 通知级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// 普通信息
    Info,
    /// 警告
    Warning,
    /// 错误
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// ==================== Kitchen Notice ====================

/// 厨房通知载荷 (厨房 -> POS)
///
/// 出餐确认等自由文本通知，`from` 标记发送方 ("kitchen" / "waiter")。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenNotice {
    pub from: String,
    pub message: String,
}

impl KitchenNotice {
    pub fn new(from: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            message: message.into(),
        }
    }
}
