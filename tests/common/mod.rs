#![allow(dead_code)]

use async_trait::async_trait;
use payflow::application::dispatcher::{ActionDispatcher, ActionHandlers};
use payflow::application::flow::{FlowObserver, PaymentFlow};
use payflow::application::handlers::UnsupportedAction;
use payflow::domain::action::ActionKind;
use payflow::domain::event::ActionReporter;
use payflow::domain::merchant::{Channel, MerchantConfig};
use payflow::domain::outcome::{FlowId, FlowOutcome};
use payflow::domain::payment::{
    ActionComponentData, Amount, PaymentComponentData, PaymentMethodDetails,
};
use payflow::domain::ports::ActionHandler;
use payflow::error::PaymentError;
use payflow::infrastructure::scripted::ScriptedCheckoutClient;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use url::Url;

pub fn merchant_config() -> Arc<MerchantConfig> {
    Arc::new(MerchantConfig {
        merchant_account: "TestMerchant".to_string(),
        amount: Amount::new(1750, "EUR"),
        reference: "order-42".to_string(),
        country_code: "NL".to_string(),
        return_url: Url::parse("shop://payments").unwrap(),
        shopper_reference: "shopper-1".to_string(),
        shopper_email: "shopper@example.com".to_string(),
        channel: Channel::Ios,
        additional_data: Map::new(),
    })
}

pub fn card_payment() -> PaymentComponentData {
    PaymentComponentData::new(
        PaymentMethodDetails::new("scheme").with_field("encryptedCardNumber", "enc:4111"),
    )
}

/// Handlers that reject every action; tests replace the ones they exercise.
pub fn unsupported_handlers() -> ActionHandlers {
    let unsupported = Arc::new(UnsupportedAction);
    ActionHandlers {
        redirect: unsupported.clone(),
        fingerprint: unsupported.clone(),
        challenge: unsupported.clone(),
        voucher: unsupported.clone(),
        sdk: unsupported.clone(),
        awaiting: unsupported,
    }
}

pub fn flow(client: &ScriptedCheckoutClient, handlers: ActionHandlers) -> PaymentFlow {
    PaymentFlow::new(
        merchant_config(),
        Box::new(client.clone()),
        ActionDispatcher::new(handlers),
    )
}

/// Provides fixed details for any action it receives.
pub struct ProvidingHandler {
    pub key: &'static str,
    pub value: &'static str,
}

#[async_trait]
impl<A: Send + 'static> ActionHandler<A> for ProvidingHandler {
    async fn handle(&self, _action: A, reporter: ActionReporter) {
        let mut details = Map::new();
        details.insert(self.key.to_string(), Value::from(self.value));
        reporter.provide(ActionComponentData::new(details, Some("pd-1".to_string())));
    }
}

/// Fails with the error built by the given function.
pub struct FailingHandler(pub fn() -> PaymentError);

#[async_trait]
impl<A: Send + 'static> ActionHandler<A> for FailingHandler {
    async fn handle(&self, _action: A, reporter: ActionReporter) {
        reporter.fail((self.0)());
    }
}

/// Reports completion without details.
pub struct CompletingHandler;

#[async_trait]
impl<A: Send + 'static> ActionHandler<A> for CompletingHandler {
    async fn handle(&self, _action: A, reporter: ActionReporter) {
        reporter.complete();
    }
}

/// Drops its reporter without reporting anything.
pub struct SilentHandler;

#[async_trait]
impl<A: Send + 'static> ActionHandler<A> for SilentHandler {
    async fn handle(&self, _action: A, reporter: ActionReporter) {
        drop(reporter);
    }
}

/// Hands its reporter out to the test and never reports on its own.
pub struct CapturingHandler {
    reporters: Mutex<Option<oneshot::Sender<ActionReporter>>>,
}

impl CapturingHandler {
    pub fn new() -> (Arc<Self>, oneshot::Receiver<ActionReporter>) {
        let (sender, receiver) = oneshot::channel();
        (
            Arc::new(Self {
                reporters: Mutex::new(Some(sender)),
            }),
            receiver,
        )
    }
}

#[async_trait]
impl<A: Send + 'static> ActionHandler<A> for CapturingHandler {
    async fn handle(&self, _action: A, reporter: ActionReporter) {
        let sender = self.reporters.lock().unwrap().take();
        if let Some(sender) = sender {
            let _ = sender.send(reporter);
        }
    }
}

/// Records every observer callback in order.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl FlowObserver for RecordingObserver {
    fn did_submit(&self, _flow_id: FlowId, _data: &PaymentComponentData) {
        self.push("submit".to_string());
    }

    fn did_dispatch(&self, _flow_id: FlowId, kind: ActionKind) {
        self.push(format!("dispatch {kind}"));
    }

    fn did_open_external_application(&self, _flow_id: FlowId, kind: ActionKind) {
        self.push(format!("opened {kind}"));
    }

    fn did_finish(&self, _flow_id: FlowId, outcome: &FlowOutcome) {
        self.push(format!("finish {outcome}"));
    }
}
