use crate::domain::action::{ThreeDs2ChallengeAction, ThreeDs2FingerprintAction};
use crate::domain::event::ActionReporter;
use crate::domain::payment::ActionComponentData;
use crate::domain::ports::{ActionHandler, ThreeDs2Service};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const FINGERPRINT_DETAILS_KEY: &str = "threeds2.fingerprint";
pub const CHALLENGE_DETAILS_KEY: &str = "threeds2.challengeResult";

/// Resolves both 3D Secure 2 steps through the device SDK.
///
/// The authorisation token, when present, is forwarded to the SDK as is.
pub struct ThreeDs2Handler {
    service: Arc<dyn ThreeDs2Service>,
}

impl ThreeDs2Handler {
    pub fn new(service: Arc<dyn ThreeDs2Service>) -> Self {
        Self { service }
    }
}

fn single_detail(key: &str, value: String) -> Map<String, Value> {
    let mut details = Map::new();
    details.insert(key.to_string(), Value::String(value));
    details
}

#[async_trait]
impl ActionHandler<ThreeDs2FingerprintAction> for ThreeDs2Handler {
    async fn handle(&self, action: ThreeDs2FingerprintAction, reporter: ActionReporter) {
        let fingerprint = self
            .service
            .fingerprint(&action.token, action.authorisation_token.as_deref())
            .await;

        match fingerprint {
            Ok(fingerprint) => reporter.provide(ActionComponentData::new(
                single_detail(FINGERPRINT_DETAILS_KEY, fingerprint),
                action.payment_data,
            )),
            Err(error) => reporter.fail(error),
        };
    }
}

#[async_trait]
impl ActionHandler<ThreeDs2ChallengeAction> for ThreeDs2Handler {
    async fn handle(&self, action: ThreeDs2ChallengeAction, reporter: ActionReporter) {
        let result = self
            .service
            .challenge(&action.token, action.authorisation_token.as_deref())
            .await;

        match result {
            Ok(result) => reporter.provide(ActionComponentData::new(
                single_detail(CHALLENGE_DETAILS_KEY, result),
                action.payment_data,
            )),
            Err(error) => reporter.fail(error),
        };
    }
}
