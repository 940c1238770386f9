//! Kitchen display records

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 差异行 - 单个商品相对上一版本的数量变化
///
/// `qty` 恒为正数；净减少时 `product_name` 带 "CANCELLED: " 前缀。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffLine {
    pub product_id: i64,
    pub product_name: String,
    pub qty: f64,
}

impl DiffLine {
    pub fn new(product_id: i64, product_name: impl Into<String>, qty: f64) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            qty,
        }
    }
}

/// 厨房状态 (draft → completed，单向)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KitchenState {
    /// 制作中
    #[default]
    Draft,
    /// 已出餐
    Completed,
}

impl fmt::Display for KitchenState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KitchenState::Draft => write!(f, "draft"),
            KitchenState::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for KitchenState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(KitchenState::Draft),
            "completed" => Ok(KitchenState::Completed),
            other => Err(format!("unknown kitchen state: {}", other)),
        }
    }
}

/// 厨房显示单 - 每条入站消息对应一条，只包含差异行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayOrder {
    /// 本地顺序编号 (从 1 开始，无间隙)
    pub kitchen_order_id: u64,
    pub config_id: i64,
    /// 原始形式的 POS 单号
    pub pos_reference: String,
    pub date_order: Option<String>,
    pub from: Option<String>,
    /// POS 端订单状态 (透传)
    pub pos_state: Option<String>,
    pub floor: Option<String>,
    pub table: Option<String>,
    pub lines: Vec<DiffLine>,
    /// 厨房状态
    pub state: KitchenState,
    /// 接收时间 (Unix 毫秒)
    pub received_at: i64,
}

impl DisplayOrder {
    pub fn is_completed(&self) -> bool {
        self.state == KitchenState::Completed
    }

    /// 出餐确认内容
    pub fn completion_notice(&self) -> CompletionNotice {
        CompletionNotice {
            kitchen_order_id: self.kitchen_order_id,
            table: self.table.clone(),
            lines: self.lines.iter().map(|l| l.product_name.clone()).collect(),
        }
    }
}

/// 出餐确认 (交给调用方格式化并广播)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionNotice {
    pub kitchen_order_id: u64,
    pub table: Option<String>,
    pub lines: Vec<String>,
}
