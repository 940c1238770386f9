//! POS order as seen by the waiter station

use serde::{Deserialize, Serialize};

use super::snapshot::{OrderSnapshot, SnapshotLine};

/// POS 订单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosOrder {
    pub pos_reference: String,
    #[serde(default)]
    pub date_order: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub floor_name: Option<String>,
    #[serde(default)]
    pub lines: Vec<PosOrderLine>,
}

/// POS 订单行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosOrderLine {
    pub product_id: i64,
    pub product_name: String,
    pub qty: f64,
    #[serde(default)]
    pub price_unit: f64,
    #[serde(default)]
    pub price_subtotal: f64,
    #[serde(default)]
    pub price_subtotal_incl: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl PosOrder {
    /// 构建发往厨房的快照
    ///
    /// 缺失的桌号/楼层以空字符串发送。
    pub fn to_snapshot(&self, config_id: i64, from: &str) -> OrderSnapshot {
        OrderSnapshot {
            config_id,
            pos_reference: self.pos_reference.clone(),
            date_order: self.date_order.clone(),
            from: Some(from.to_string()),
            state: self.state.clone(),
            floor: Some(self.floor_name.clone().unwrap_or_default()),
            table: Some(self.table_number.clone().unwrap_or_default()),
            lines: self
                .lines
                .iter()
                .map(|line| SnapshotLine {
                    product_id: line.product_id,
                    product_name: line.product_name.clone(),
                    qty: line.qty,
                    price_unit: Some(line.price_unit),
                    price_subtotal: Some(line.price_subtotal),
                    price_subtotal_incl: Some(line.price_subtotal_incl),
                    discount: Some(line.discount),
                    note: line.note.clone().unwrap_or_default(),
                })
                .collect(),
        }
    }
}
