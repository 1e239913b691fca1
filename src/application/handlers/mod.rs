//! Action handlers built on the collaborator ports.

pub mod polling;
pub mod redirect;
pub mod three_ds2;
pub mod voucher;

use crate::domain::event::ActionReporter;
use crate::domain::ports::ActionHandler;
use crate::error::ActionError;
use async_trait::async_trait;

pub use polling::AwaitPoller;
pub use redirect::RedirectHandler;
pub use three_ds2::ThreeDs2Handler;
pub use voucher::VoucherHandler;

/// Fails every action it receives; for integrations that do not offer an action type.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedAction;

#[async_trait]
impl<A: Send + 'static> ActionHandler<A> for UnsupportedAction {
    async fn handle(&self, _action: A, reporter: ActionReporter) {
        let kind = reporter.kind();
        reporter.fail(ActionError::Unsupported(kind));
    }
}
