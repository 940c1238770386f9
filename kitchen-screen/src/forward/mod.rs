//! External API forwarder
//!
//! Posts each order sent to the kitchen to a configurable HTTP endpoint.

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use shared::order::{PosOrder, PosOrderLine};

use crate::core::Config;
use crate::utils::{AppError, AppResult};

/// Request body for the external API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardPayload {
    pub pos_reference: String,
    pub date_order: Option<String>,
    pub state: Option<String>,
    pub lines: Vec<ForwardLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardLine {
    pub product_id: i64,
    pub product_name: String,
    pub qty: f64,
    pub price_unit: f64,
    pub price_subtotal: f64,
    pub price_subtotal_incl: f64,
    pub discount: f64,
    pub note: String,
}

impl From<&PosOrderLine> for ForwardLine {
    fn from(line: &PosOrderLine) -> Self {
        Self {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            qty: line.qty,
            price_unit: line.price_unit,
            price_subtotal: line.price_subtotal,
            price_subtotal_incl: line.price_subtotal_incl,
            discount: line.discount,
            note: line.note.clone().unwrap_or_default(),
        }
    }
}

impl From<&PosOrder> for ForwardPayload {
    fn from(order: &PosOrder) -> Self {
        Self {
            pos_reference: order.pos_reference.clone(),
            date_order: order.date_order.clone(),
            state: order.state.clone(),
            lines: order.lines.iter().map(ForwardLine::from).collect(),
        }
    }
}

/// Result of a forward attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardOutcome {
    Sent { status: u16 },
    /// Forwarding is turned off
    Skipped,
}

/// 外部 API 转发器
#[derive(Debug, Clone)]
pub struct ApiForwarder {
    client: Client,
    endpoint: String,
    enabled: bool,
}

impl ApiForwarder {
    pub fn from_config(config: &Config) -> AppResult<Self> {
        if config.api_enabled && config.api_endpoint.trim().is_empty() {
            return Err(AppError::config("API_ENDPOINT is empty while API_ENABLED=true"));
        }
        let client = Client::builder().timeout(config.api_timeout()).build()?;
        Ok(Self {
            client,
            endpoint: config.api_endpoint.trim().to_string(),
            enabled: config.api_enabled,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// POST the order as JSON
    ///
    /// # Errors
    ///
    /// Transport failures and timeouts map to [`AppError::Http`]; a non-2xx
    /// reply maps to [`AppError::ApiStatus`] carrying the response body.
    pub async fn send(&self, order: &PosOrder) -> AppResult<ForwardOutcome> {
        if !self.enabled {
            return Ok(ForwardOutcome::Skipped);
        }

        let payload = ForwardPayload::from(order);
        tracing::debug!(
            pos_reference = %payload.pos_reference,
            endpoint = %self.endpoint,
            "Forwarding order to external API"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ApiStatus {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(pos_reference = %payload.pos_reference, status = status.as_u16(), "Order forwarded");
        Ok(ForwardOutcome::Sent {
            status: status.as_u16(),
        })
    }
}
