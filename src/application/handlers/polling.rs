use crate::domain::action::AwaitAction;
use crate::domain::event::ActionReporter;
use crate::domain::payment::ActionComponentData;
use crate::domain::ports::{ActionHandler, PaymentStatusClient};
use crate::error::ActionError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Polls the payment status until it leaves `pending`, for at most
/// `max_attempts` polls spaced `interval` apart.
pub struct AwaitPoller {
    client: Arc<dyn PaymentStatusClient>,
    interval: Duration,
    max_attempts: u32,
}

impl AwaitPoller {
    pub fn new(client: Arc<dyn PaymentStatusClient>, interval: Duration, max_attempts: u32) -> Self {
        Self {
            client,
            interval,
            max_attempts: max_attempts.max(1),
        }
    }
}

#[async_trait]
impl ActionHandler<AwaitAction> for AwaitPoller {
    async fn handle(&self, action: AwaitAction, reporter: ActionReporter) {
        for attempt in 1..=self.max_attempts {
            let status = match self.client.status(&action.payment_data).await {
                Ok(status) => status,
                Err(error) => {
                    reporter.fail(error);
                    return;
                }
            };

            if !status.is_pending() {
                debug!(
                    flow_id = %reporter.flow_id(),
                    attempt,
                    status = ?status.result_code,
                    "awaited payment left pending"
                );
                let Some(payload) = status.payload else {
                    reporter.fail(ActionError::Collaborator(
                        "status response carried no payload".to_string(),
                    ));
                    return;
                };
                let mut details = Map::new();
                details.insert("payload".to_string(), Value::String(payload));
                reporter.provide(ActionComponentData::new(
                    details,
                    Some(action.payment_data),
                ));
                return;
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.interval).await;
            }
        }

        reporter.fail(ActionError::PollingTimedOut {
            attempts: self.max_attempts,
        });
    }
}
