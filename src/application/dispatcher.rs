use crate::domain::action::{
    Action, AwaitAction, RedirectAction, SdkAction, ThreeDs2ChallengeAction,
    ThreeDs2FingerprintAction, VoucherAction,
};
use crate::domain::event::ActionReporter;
use crate::domain::ports::ActionHandlerArc;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// One handler per action variant. Every field is required, so a dispatcher
/// can always resolve any decoded action.
#[derive(Clone)]
pub struct ActionHandlers {
    pub redirect: ActionHandlerArc<RedirectAction>,
    pub fingerprint: ActionHandlerArc<ThreeDs2FingerprintAction>,
    pub challenge: ActionHandlerArc<ThreeDs2ChallengeAction>,
    pub voucher: ActionHandlerArc<VoucherAction>,
    pub sdk: ActionHandlerArc<SdkAction>,
    pub awaiting: ActionHandlerArc<AwaitAction>,
}

/// Routes an action to the handler registered for its variant.
#[derive(Clone)]
pub struct ActionDispatcher {
    handlers: ActionHandlers,
}

impl ActionDispatcher {
    pub fn new(handlers: ActionHandlers) -> Self {
        Self { handlers }
    }

    /// Invokes the matching handler exactly once on its own task.
    ///
    /// The returned handle lets the caller release the handler early; results
    /// come back through `reporter`.
    pub fn dispatch(&self, action: Action, reporter: ActionReporter) -> JoinHandle<()> {
        debug!(
            flow_id = %reporter.flow_id(),
            action = %action.kind(),
            "dispatching action"
        );
        match action {
            Action::Redirect(action) => spawn_handler(&self.handlers.redirect, action, reporter),
            Action::ThreeDs2Fingerprint(action) => {
                spawn_handler(&self.handlers.fingerprint, action, reporter)
            }
            Action::ThreeDs2Challenge(action) => {
                spawn_handler(&self.handlers.challenge, action, reporter)
            }
            Action::Voucher(action) => spawn_handler(&self.handlers.voucher, action, reporter),
            Action::Sdk(action) => spawn_handler(&self.handlers.sdk, action, reporter),
            Action::Await(action) => spawn_handler(&self.handlers.awaiting, action, reporter),
        }
    }
}

fn spawn_handler<A>(
    handler: &ActionHandlerArc<A>,
    action: A,
    reporter: ActionReporter,
) -> JoinHandle<()>
where
    A: Send + 'static,
{
    let handler = Arc::clone(handler);
    tokio::spawn(async move { handler.handle(action, reporter).await })
}
