use std::time::Duration;

use alloy_primitives::Bytes;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use dalink_config::DaServerConfig;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::*;

use crate::{errors::DaTransportError, traits::DaTransport};

/// Path of the store route, relative to the server endpoint.
const STORE_PATH: &str = "store";

#[derive(Debug, Serialize)]
struct StoreRequest {
    /// Base64 (standard alphabet) encoding of the blob.
    data: String,
}

/// [`DaTransport`] over plain HTTP.
#[derive(Debug, Clone)]
pub struct HttpDaTransport {
    client: Client,
    store_timeout: Duration,
    fetch_timeout: Duration,
}

impl HttpDaTransport {
    pub fn new(config: &DaServerConfig) -> Result<Self, DaTransportError> {
        let client = Client::builder()
            .build()
            .map_err(DaTransportError::Client)?;
        Ok(Self {
            client,
            store_timeout: config.store_timeout(),
            fetch_timeout: config.fetch_timeout(),
        })
    }

    fn store_url(endpoint: &str) -> String {
        format!("{}/{STORE_PATH}", endpoint.trim_end_matches('/'))
    }
}

async fn status_error(url: &str, resp: reqwest::Response) -> DaTransportError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    DaTransportError::Status {
        url: url.to_owned(),
        status,
        body,
    }
}

#[async_trait]
impl DaTransport for HttpDaTransport {
    async fn store(&self, endpoint: &str, blob: &[u8]) -> Result<String, DaTransportError> {
        let url = Self::store_url(endpoint);
        let body = StoreRequest {
            data: STANDARD.encode(blob),
        };

        debug!(%url, len = blob.len(), "storing blob on da server");
        let resp = self
            .client
            .post(&url)
            .timeout(self.store_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| DaTransportError::from_send(&url, e))?;

        if resp.status() != StatusCode::OK {
            return Err(status_error(&url, resp).await);
        }

        let locator = resp
            .text()
            .await
            .map_err(|e| DaTransportError::from_send(&url, e))?;
        let locator = locator.trim().to_owned();
        info!(%url, %locator, "blob stored on da server");
        Ok(locator)
    }

    async fn fetch(&self, url: &str) -> Result<Bytes, DaTransportError> {
        trace!(%url, "fetching from da server");
        let resp = self
            .client
            .get(url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| DaTransportError::from_send(url, e))?;

        if resp.status() != StatusCode::OK {
            return Err(status_error(url, resp).await);
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| DaTransportError::from_send(url, e))?;
        Ok(Bytes::from(body))
    }
}
