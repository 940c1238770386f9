//! 消息总线消息类型定义
//!
//! 这些类型在 POS 端 (waiter) 和厨房屏幕之间共享。
//! 每条消息都投递到一个具名频道上：
//!
//! ```text
//! waiter-{config_id}   POS ──▶ Kitchen   (订单快照)
//! kitchen-{config_id}  Kitchen ──▶ POS   (出餐通知)
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

pub mod payload;
pub use payload::*;

/// 总线频道
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// POS 端发往厨房的订单快照 (`waiter-{config_id}`)
    Waiter(i64),
    /// 厨房发往 POS 端的通知 (`kitchen-{config_id}`)
    Kitchen(i64),
}

impl Channel {
    pub fn config_id(&self) -> i64 {
        match self {
            Channel::Waiter(id) | Channel::Kitchen(id) => *id,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Waiter(id) => write!(f, "waiter-{}", id),
            Channel::Kitchen(id) => write!(f, "kitchen-{}", id),
        }
    }
}

impl FromStr for Channel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, id) = s.split_once('-').ok_or(())?;
        let id: i64 = id.parse().map_err(|_| ())?;
        match prefix {
            "waiter" => Ok(Channel::Waiter(id)),
            "kitchen" => Ok(Channel::Kitchen(id)),
            _ => Err(()),
        }
    }
}

/// 消息总线消息体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    /// 频道名 (例如 "waiter-1")
    pub channel: String,
    /// JSON 编码的业务数据
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(channel: &Channel, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            channel: channel.to_string(),
            payload,
        }
    }

    /// 创建通知消息
    pub fn notification<T: Serialize>(
        channel: &Channel,
        payload: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(channel, serde_json::to_vec(payload)?))
    }

    /// 是否投递在指定频道上
    pub fn is_on(&self, channel: &Channel) -> bool {
        self.channel.parse::<Channel>().ok().as_ref() == Some(channel)
    }

    /// 解析业务数据
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}
