use crate::application::dispatcher::ActionDispatcher;
use crate::application::redirect::correlated_return_url;
use crate::domain::action::{Action, ActionKind};
use crate::domain::card::{CardDetails, StoredCardDetails};
use crate::domain::event::{ActionEvent, ActionReporter};
use crate::domain::merchant::MerchantConfig;
use crate::domain::outcome::{FlowId, FlowOutcome, FlowState};
use crate::domain::payment::{ActionComponentData, PaymentComponentData, PaymentMethodDetails};
use crate::domain::ports::{CardEncryptor, CheckoutClientBox};
use crate::domain::request::{PaymentDetailsRequest, PaymentsRequest};
use crate::domain::response::{NextStep, PaymentsResponse, ResultCode};
use crate::error::{ActionError, EncryptionError, PaymentError, Result};
use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info};

/// Receives the observable events of a payment flow.
///
/// All methods default to doing nothing. `did_finish` is called exactly once
/// per submitted flow.
pub trait FlowObserver: Send + Sync {
    fn did_submit(&self, _flow_id: FlowId, _data: &PaymentComponentData) {}
    fn did_dispatch(&self, _flow_id: FlowId, _kind: ActionKind) {}
    fn did_open_external_application(&self, _flow_id: FlowId, _kind: ActionKind) {}
    fn did_finish(&self, _flow_id: FlowId, _outcome: &FlowOutcome) {}
}

/// Cancels a running payment flow from outside.
#[derive(Debug, Clone)]
pub struct CancelHandle(CancellationToken);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// Drives one payment from submission to a terminal outcome.
///
/// The flow submits the payment, hands every action the server returns to the
/// dispatcher, submits the details the handler produced and repeats until the
/// server answers with a final result code. Requests never overlap and at most
/// one handler is active at a time.
pub struct PaymentFlow {
    id: FlowId,
    config: Arc<MerchantConfig>,
    client: CheckoutClientBox,
    dispatcher: ActionDispatcher,
    observer: Option<Arc<dyn FlowObserver>>,
    state: FlowState,
    in_progress: bool,
    cancel: CancellationToken,
}

impl PaymentFlow {
    /// Creates a new `PaymentFlow` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - Merchant settings added to every payments request.
    /// * `client` - Transport for the checkout API.
    /// * `dispatcher` - Resolves the actions the server asks for.
    pub fn new(
        config: Arc<MerchantConfig>,
        client: CheckoutClientBox,
        dispatcher: ActionDispatcher,
    ) -> Self {
        Self {
            id: FlowId::new(),
            config,
            client,
            dispatcher,
            observer: None,
            state: FlowState::Idle,
            in_progress: false,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn FlowObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn id(&self) -> FlowId {
        self.id
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// True between submission and the terminal outcome.
    pub fn is_in_progress(&self) -> bool {
        self.in_progress
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.cancel.clone())
    }

    /// Runs the payment to its terminal outcome.
    ///
    /// Fails only when the flow was already submitted; every problem during
    /// the payment itself is reported through the returned outcome.
    pub async fn submit(&mut self, data: PaymentComponentData) -> Result<FlowOutcome> {
        self.ensure_idle()?;
        let outcome = self.drive(data).await;
        Ok(self.finish(outcome))
    }

    /// Encrypts the card with the merchant's public key and submits it.
    pub async fn submit_card(
        &mut self,
        card: &CardDetails,
        encryptor: &dyn CardEncryptor,
        public_key: &str,
        store_payment_method: bool,
    ) -> Result<FlowOutcome> {
        self.ensure_idle()?;
        if self.cancel.is_cancelled() {
            return Ok(self.finish(FlowOutcome::Cancelled));
        }
        let encrypted = card.encrypt(encryptor, public_key);
        self.submit_encrypted(encrypted, store_payment_method).await
    }

    /// Pays with a card the shopper saved earlier. Only the re-entered
    /// security code is encrypted.
    pub async fn submit_stored_card(
        &mut self,
        card: &StoredCardDetails,
        encryptor: &dyn CardEncryptor,
        public_key: &str,
    ) -> Result<FlowOutcome> {
        self.ensure_idle()?;
        if self.cancel.is_cancelled() {
            return Ok(self.finish(FlowOutcome::Cancelled));
        }
        let encrypted = card.encrypt(encryptor, public_key);
        self.submit_encrypted(encrypted, false).await
    }

    async fn submit_encrypted(
        &mut self,
        encrypted: std::result::Result<PaymentMethodDetails, EncryptionError>,
        store_payment_method: bool,
    ) -> Result<FlowOutcome> {
        match encrypted {
            Ok(payment_method) => {
                let mut data = PaymentComponentData::new(payment_method);
                data.store_payment_method = store_payment_method;
                self.submit(data).await
            }
            Err(error) => Ok(self.finish(FlowOutcome::Failure(error.into()))),
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match self.state {
            FlowState::Idle => Ok(()),
            _ => Err(PaymentError::AlreadySubmitted),
        }
    }

    async fn drive(&mut self, data: PaymentComponentData) -> FlowOutcome {
        if self.cancel.is_cancelled() {
            return FlowOutcome::Cancelled;
        }
        self.in_progress = true;
        info!(flow_id = %self.id, payment_method = ?data.payment_method.payment_type(), "submitting payment");
        if let Some(observer) = &self.observer {
            observer.did_submit(self.id, &data);
        }

        let return_url = correlated_return_url(&self.config.return_url, self.id);
        let request = PaymentsRequest::new(data, &self.config, return_url);
        self.transition(FlowState::AwaitingPaymentsResponse);
        let mut response = match until_cancelled(&self.cancel, self.client.payments(request)).await
        {
            ControlFlow::Continue(response) => response,
            ControlFlow::Break(outcome) => return outcome,
        };

        loop {
            let action = match response.into_next_step() {
                NextStep::Finish(result_code) => return FlowOutcome::Success(result_code),
                NextStep::Handle(_, action) => action,
            };

            let data = match self.handle_action(action).await {
                ControlFlow::Continue(data) => data,
                ControlFlow::Break(outcome) => return outcome,
            };

            let request = PaymentDetailsRequest::new(data, &self.config);
            self.transition(FlowState::AwaitingDetailsResponse);
            response = match until_cancelled(&self.cancel, self.client.payment_details(request))
                .await
            {
                ControlFlow::Continue(response) => response,
                ControlFlow::Break(outcome) => return outcome,
            };
        }
    }

    /// Dispatches `action` and waits for its handler to report a result.
    ///
    /// The handler task is aborted whenever this future stops, including when
    /// the caller drops `submit` midway.
    async fn handle_action(
        &mut self,
        action: Action,
    ) -> ControlFlow<FlowOutcome, ActionComponentData> {
        let kind = action.kind();
        self.transition(FlowState::HandlingAction(kind));
        if let Some(observer) = &self.observer {
            observer.did_dispatch(self.id, kind);
        }

        let (reporter, mut events) = ActionReporter::channel(self.id, kind);
        let _handler = AbortOnDropHandle::new(self.dispatcher.dispatch(action, reporter));
        let cancel = self.cancel.clone();
        let observer = self.observer.clone();
        let flow_id = self.id;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!(%flow_id, action = %kind, "flow cancelled while handling action");
                    return ControlFlow::Break(FlowOutcome::Cancelled);
                }
                event = events.recv() => match event {
                    Some(ActionEvent::OpenedExternalApplication) => {
                        if let Some(observer) = &observer {
                            observer.did_open_external_application(flow_id, kind);
                        }
                    }
                    Some(ActionEvent::Provided(data)) => return ControlFlow::Continue(data),
                    Some(ActionEvent::Completed) => {
                        return ControlFlow::Break(FlowOutcome::Success(ResultCode::Authorised));
                    }
                    Some(ActionEvent::Failed(error)) if error.is_cancellation() => {
                        return ControlFlow::Break(FlowOutcome::Cancelled);
                    }
                    Some(ActionEvent::Failed(error)) => {
                        return ControlFlow::Break(FlowOutcome::Failure(error));
                    }
                    None => {
                        return ControlFlow::Break(FlowOutcome::Failure(
                            ActionError::HandlerDropped(kind).into(),
                        ));
                    }
                },
            }
        }
    }

    fn transition(&mut self, next: FlowState) {
        debug!(flow_id = %self.id, from = ?self.state, to = ?next, "flow state changed");
        self.state = next;
    }

    fn finish(&mut self, outcome: FlowOutcome) -> FlowOutcome {
        self.in_progress = false;
        self.transition(FlowState::Terminal(outcome.terminal_state()));
        info!(flow_id = %self.id, %outcome, "payment flow finished");
        if let Some(observer) = &self.observer {
            observer.did_finish(self.id, &outcome);
        }
        outcome
    }
}

/// Awaits a checkout call unless the flow is cancelled first; a cancelled
/// call is dropped and its response never looked at.
async fn until_cancelled(
    cancel: &CancellationToken,
    request: impl Future<Output = Result<PaymentsResponse>>,
) -> ControlFlow<FlowOutcome, PaymentsResponse> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => ControlFlow::Break(FlowOutcome::Cancelled),
        result = request => match result {
            Ok(response) => ControlFlow::Continue(response),
            Err(error) => ControlFlow::Break(FlowOutcome::Failure(error)),
        },
    }
}
