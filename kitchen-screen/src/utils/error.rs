//! 统一错误处理
//!
//! 核心逻辑中的错误都不是致命的：调用方记录日志后继续处理下一条消息。

use shared::error::MessageError;
use thiserror::Error;

/// 应用错误
#[derive(Debug, Error)]
pub enum AppError {
    /// 入站消息格式错误 (丢弃，不修改状态)
    #[error("Malformed message: {0}")]
    Malformed(#[from] MessageError),

    /// 消息总线错误
    #[error("Bus error: {0}")]
    Bus(String),

    /// 外部 API 请求失败
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 外部 API 返回非 2xx
    #[error("API returned status {status}: {body}")]
    ApiStatus { status: u16, body: String },

    /// 配置错误
    #[error("Config error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn bus(msg: impl Into<String>) -> Self {
        Self::Bus(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
