use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde_json::Value;
use tracing::{instrument, warn};

use super::{ErpExportAck, ErpTransport, ErpTransportError, InventorySnapshot};

/// HTTP implementation of [`ErpTransport`] with a bounded request timeout
/// and optional bearer authentication.
pub struct HttpErpTransport {
    base_url: String,
    http: reqwest::Client,
}

impl HttpErpTransport {
    pub fn new(
        base_url: &str,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ErpTransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            let value = HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| ErpTransportError(format!("invalid ERP API key: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ErpTransportError(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }
}

#[async_trait]
impl ErpTransport for HttpErpTransport {
    #[instrument(skip(self, snapshot), fields(entries = snapshot.entries.len()))]
    async fn send_snapshot(
        &self,
        snapshot: &InventorySnapshot,
    ) -> Result<ErpExportAck, ErpTransportError> {
        let url = format!("{}/inventory/sync", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(snapshot)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ErpTransportError(e.to_string()))?;

        // Remote acknowledgement body is optional and loosely shaped.
        let body: Value = response.json().await.unwrap_or(Value::Null);
        Ok(ErpExportAck {
            transmitted: body
                .get("transmitted")
                .and_then(Value::as_u64)
                .map(|n| n as usize),
            message: body
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
        })
    }

    #[instrument(skip(self))]
    async fn fetch_open_orders(&self) -> Result<Vec<Value>, ErpTransportError> {
        let url = format!("{}/purchase-orders/open", self.base_url);
        let payload: Value = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ErpTransportError(e.to_string()))?
            .json()
            .await
            .map_err(|e| ErpTransportError(e.to_string()))?;

        match payload {
            Value::Array(orders) => Ok(orders),
            Value::Object(mut map) => match map.remove("orders") {
                Some(Value::Array(orders)) => Ok(orders),
                _ => {
                    warn!("unexpected ERP response structure, treating as empty");
                    Ok(Vec::new())
                }
            },
            other => {
                warn!(payload = %other, "unexpected ERP response type, treating as empty");
                Ok(Vec::new())
            }
        }
    }
}
