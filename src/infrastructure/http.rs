use crate::domain::ports::{CheckoutClient, PaymentStatusClient};
use crate::domain::request::{PaymentDetailsRequest, PaymentsRequest};
use crate::domain::response::PaymentsResponse;
use crate::domain::status::PaymentStatus;
use crate::error::{Result, TransportError};
use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;
use url::Url;

pub const API_KEY_HEADER: &str = "x-API-key";
pub const DEFAULT_STATUS_PATH: &str = "status";

/// Checkout API client over HTTPS.
///
/// Non-success statuses are transport errors carrying the response body;
/// nothing is retried.
#[derive(Clone)]
pub struct HttpCheckoutClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    status_path: String,
}

impl HttpCheckoutClient {
    pub fn new(mut base_url: Url, api_key: impl Into<String>) -> Self {
        // `Url::join` replaces the last segment unless the path ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
        }
    }

    pub fn with_status_path(mut self, status_path: impl Into<String>) -> Self {
        self.status_path = status_path.into();
        self
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Vec<u8>> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::Other(format!("invalid request path {path}: {e}")))?;
        debug!(%url, "posting checkout request");

        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(TransportError::from)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(TransportError::from)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }
            .into());
        }
        Ok(bytes.to_vec())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest<'a> {
    payment_data: &'a str,
}

#[async_trait]
impl CheckoutClient for HttpCheckoutClient {
    async fn payments(&self, request: PaymentsRequest) -> Result<PaymentsResponse> {
        let body = self.post(PaymentsRequest::PATH, &request).await?;
        PaymentsResponse::decode(&body)
    }

    async fn payment_details(&self, request: PaymentDetailsRequest) -> Result<PaymentsResponse> {
        let body = self.post(PaymentDetailsRequest::PATH, &request).await?;
        PaymentsResponse::decode(&body)
    }
}

#[async_trait]
impl PaymentStatusClient for HttpCheckoutClient {
    async fn status(&self, payment_data: &str) -> Result<PaymentStatus> {
        let body = self
            .post(&self.status_path, &StatusRequest { payment_data })
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
