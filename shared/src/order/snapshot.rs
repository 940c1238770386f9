//! Order snapshot - validated inbound order notification
//!
//! A snapshot carries the *absolute* line list of a POS order. Payloads
//! arrive as loosely-typed JSON from the bus and are validated exactly once
//! here: either a well-formed [`OrderSnapshot`] comes out, or a
//! [`MessageError`] describing why the message was dropped.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MessageError;

/// Order snapshot (one inbound message)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSnapshot {
    /// POS config (shop) the order belongs to
    pub config_id: i64,
    /// POS reference as sent, e.g. "Order 00012-001-0001"
    pub pos_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_order: Option<String>,
    /// Sender tag ("waiter")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// POS order state ("draft", "paid", ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub lines: Vec<SnapshotLine>,
}

/// Snapshot line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotLine {
    pub product_id: i64,
    /// Raw product name, may carry one or more "CANCELLED:" tags
    pub product_name: String,
    /// Always finite
    pub qty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_unit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_subtotal_incl: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    pub note: String,
}

impl SnapshotLine {
    pub fn new(product_id: i64, product_name: impl Into<String>, qty: f64) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            qty,
            price_unit: None,
            price_subtotal: None,
            price_subtotal_incl: None,
            discount: None,
            note: String::new(),
        }
    }

    /// Parse one entry of `lines[]`
    ///
    /// Returns `None` for entries that are not objects or have no usable
    /// product id; such entries are skipped rather than failing the message.
    fn from_value(value: &Value) -> Option<Self> {
        let line = value.as_object()?;

        let product_id = match non_null(line, "product_id").or_else(|| non_null(line, "productId")) {
            Some(Value::Number(n)) => n.as_i64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        };
        let Some(product_id) = product_id else {
            tracing::debug!(line = %value, "Skipping snapshot line without product id");
            return None;
        };

        Some(Self {
            product_id,
            product_name: text_field(line, "product_name").unwrap_or_default(),
            qty: coerce_quantity(line.get("qty")),
            price_unit: line.get("price_unit").and_then(Value::as_f64),
            price_subtotal: line.get("price_subtotal").and_then(Value::as_f64),
            price_subtotal_incl: line.get("price_subtotal_incl").and_then(Value::as_f64),
            discount: line.get("discount").and_then(Value::as_f64),
            note: text_field(line, "note").unwrap_or_default(),
        })
    }
}

impl OrderSnapshot {
    /// Parse and validate raw bus payload bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MessageError> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(&value)
    }

    /// Validate an already-decoded JSON value
    pub fn from_value(value: &Value) -> Result<Self, MessageError> {
        let map = value.as_object().ok_or(MessageError::NotAnObject)?;

        let config_id = match non_null(map, "config_id") {
            None => return Err(MessageError::MissingConfigId),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| MessageError::invalid("config_id", format!("expected integer, got {}", v)))?,
        };

        let pos_reference = match non_null(map, "pos_reference") {
            None => return Err(MessageError::MissingPosReference),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(v) => {
                return Err(MessageError::invalid(
                    "pos_reference",
                    format!("expected string, got {}", v),
                ));
            }
        };

        let lines = match map.get("lines") {
            Some(Value::Array(items)) => items.iter().filter_map(SnapshotLine::from_value).collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            config_id,
            pos_reference,
            date_order: text_field(map, "date_order"),
            from: text_field(map, "from"),
            state: text_field(map, "state"),
            floor: text_field(map, "floor"),
            table: text_field(map, "table"),
            lines,
        })
    }
}

impl TryFrom<&Value> for OrderSnapshot {
    type Error = MessageError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

/// Coerce a JSON quantity into a finite number
///
/// Numbers pass through, numeric strings are parsed, booleans count as 1/0,
/// `null` and empty strings are 0. Anything that ends up non-finite or
/// unparseable (including a missing field) becomes 0.
pub fn coerce_quantity(value: Option<&Value>) -> f64 {
    let qty = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse().unwrap_or(f64::NAN)
            }
        }
        Some(Value::Bool(true)) => 1.0,
        Some(Value::Bool(false)) | Some(Value::Null) => 0.0,
        _ => f64::NAN,
    };

    if qty.is_finite() {
        qty
    } else {
        tracing::debug!(raw = ?value, "Non-finite quantity coerced to 0");
        0.0
    }
}

fn non_null<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
