use crate::domain::ports::CheckoutClient;
use crate::domain::request::{PaymentDetailsRequest, PaymentsRequest};
use crate::domain::response::PaymentsResponse;
use crate::error::{PaymentError, Result, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, oneshot};

/// A canned answer for the next checkout call.
#[derive(Debug)]
pub enum ScriptedReply {
    /// Raw response body, decoded like a real server response.
    Json(String),
    /// The call fails at the transport level.
    TransportFailure(String),
    /// Waits until `release` fires (or its sender is dropped), then replies.
    Held {
        release: oneshot::Receiver<()>,
        then: Box<ScriptedReply>,
    },
}

impl ScriptedReply {
    pub fn json(body: &Value) -> Self {
        ScriptedReply::Json(body.to_string())
    }
}

/// A request the scripted client received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub path: &'static str,
    pub body: Value,
}

/// A checkout client answering from a fixed script.
///
/// Clones share the script and the request log, so a test can keep one clone
/// to inspect what the flow sent.
#[derive(Default, Clone)]
pub struct ScriptedCheckoutClient {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<RwLock<Vec<RecordedRequest>>>,
}

impl ScriptedCheckoutClient {
    pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            requests: Arc::default(),
        }
    }

    /// Builds a script from a JSON array of response bodies.
    pub fn from_json_array(script: &str) -> Result<Self> {
        let bodies: Vec<Value> = serde_json::from_str(script)?;
        Ok(Self::new(bodies.iter().map(ScriptedReply::json)))
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().await.clone()
    }

    async fn reply(&self, path: &'static str, body: Value) -> Result<PaymentsResponse> {
        self.requests.write().await.push(RecordedRequest { path, body });

        let next = self.replies.lock().await.pop_front();
        let mut reply = next.ok_or_else(|| {
            TransportError::Other(format!("no scripted reply left for {path}"))
        })?;

        loop {
            match reply {
                ScriptedReply::Json(body) => return PaymentsResponse::decode(body.as_bytes()),
                ScriptedReply::TransportFailure(message) => {
                    return Err(TransportError::Other(message).into());
                }
                ScriptedReply::Held { release, then } => {
                    let _ = release.await;
                    reply = *then;
                }
            }
        }
    }
}

fn to_body<T: serde::Serialize>(request: &T) -> Result<Value> {
    serde_json::to_value(request).map_err(PaymentError::from)
}

#[async_trait]
impl CheckoutClient for ScriptedCheckoutClient {
    async fn payments(&self, request: PaymentsRequest) -> Result<PaymentsResponse> {
        self.reply(PaymentsRequest::PATH, to_body(&request)?).await
    }

    async fn payment_details(&self, request: PaymentDetailsRequest) -> Result<PaymentsResponse> {
        self.reply(PaymentDetailsRequest::PATH, to_body(&request)?).await
    }
}
