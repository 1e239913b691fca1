use super::action::ActionKind;
use super::outcome::FlowId;
use super::payment::ActionComponentData;
use crate::error::PaymentError;
use tokio::sync::mpsc;

/// Something an action handler reports back to the flow.
#[derive(Debug)]
pub enum ActionEvent {
    Provided(ActionComponentData),
    Completed,
    Failed(PaymentError),
    OpenedExternalApplication,
}

/// The handle a handler uses to report on the action it was given.
///
/// Terminal reports consume the reporter, so a handler reports its result at
/// most once. Each dispatched action gets its own channel; reports that arrive
/// after the flow stopped listening are dropped and return `false`.
#[derive(Debug)]
pub struct ActionReporter {
    flow_id: FlowId,
    kind: ActionKind,
    sender: mpsc::UnboundedSender<ActionEvent>,
}

impl ActionReporter {
    pub fn channel(
        flow_id: FlowId,
        kind: ActionKind,
    ) -> (Self, mpsc::UnboundedReceiver<ActionEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                flow_id,
                kind,
                sender,
            },
            receiver,
        )
    }

    pub fn flow_id(&self) -> FlowId {
        self.flow_id
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    /// Informational: the shopper was handed off to another application.
    pub fn opened_external_application(&self) -> bool {
        self.send(ActionEvent::OpenedExternalApplication)
    }

    pub fn provide(self, data: ActionComponentData) -> bool {
        self.send(ActionEvent::Provided(data))
    }

    pub fn complete(self) -> bool {
        self.send(ActionEvent::Completed)
    }

    pub fn fail(self, error: impl Into<PaymentError>) -> bool {
        self.send(ActionEvent::Failed(error.into()))
    }

    fn send(&self, event: ActionEvent) -> bool {
        let delivered = self.sender.send(event).is_ok();
        if !delivered {
            tracing::debug!(
                flow_id = %self.flow_id,
                action = %self.kind,
                "flow is no longer listening, dropping late report"
            );
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reports_reach_the_receiver() {
        let (reporter, mut events) = ActionReporter::channel(FlowId::new(), ActionKind::Redirect);

        assert!(reporter.opened_external_application());
        assert!(reporter.complete());

        assert!(matches!(
            events.recv().await,
            Some(ActionEvent::OpenedExternalApplication)
        ));
        assert!(matches!(events.recv().await, Some(ActionEvent::Completed)));
        // Reporter consumed and dropped: channel is closed.
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_late_report_is_not_delivered() {
        let (reporter, events) = ActionReporter::channel(FlowId::new(), ActionKind::Voucher);
        drop(events);

        assert!(!reporter.fail(PaymentError::Cancelled));
    }
}
