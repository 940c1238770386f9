//! 进程内消息总线
//!
//! - [`MessageBus`] - 基于 tokio broadcast 的频道总线
//! - [`Subscription`] - 单频道监听任务，支持确定性取消

pub mod bus;
pub mod subscription;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, MessageBus};
pub use subscription::Subscription;

pub use shared::message::{BusMessage, Channel, KitchenNotice, NotificationLevel};
