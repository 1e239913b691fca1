use crate::domain::action::VoucherAction;
use crate::domain::event::ActionReporter;
use crate::domain::ports::{ActionHandler, VoucherPresenter};
use async_trait::async_trait;
use std::sync::Arc;

/// Presents the voucher; the flow completes once the shopper dismisses it.
pub struct VoucherHandler {
    presenter: Arc<dyn VoucherPresenter>,
}

impl VoucherHandler {
    pub fn new(presenter: Arc<dyn VoucherPresenter>) -> Self {
        Self { presenter }
    }
}

#[async_trait]
impl ActionHandler<VoucherAction> for VoucherHandler {
    async fn handle(&self, action: VoucherAction, reporter: ActionReporter) {
        match self.presenter.present(&action).await {
            Ok(()) => reporter.complete(),
            Err(error) => reporter.fail(error),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ActionKind;
    use crate::domain::event::ActionEvent;
    use crate::domain::outcome::FlowId;
    use crate::error::{ActionError, PaymentError, Result};

    struct Presenter(bool);

    #[async_trait]
    impl VoucherPresenter for Presenter {
        async fn present(&self, voucher: &VoucherAction) -> Result<()> {
            assert_eq!(voucher.payment_method_type, "boletobancario");
            if self.0 {
                Ok(())
            } else {
                Err(ActionError::Collaborator("voucher view unavailable".to_string()).into())
            }
        }
    }

    fn voucher() -> VoucherAction {
        VoucherAction {
            payment_method_type: "boletobancario".to_string(),
            reference: Some("03399.33335".to_string()),
            total_amount: None,
            expires_at: None,
            instructions_url: None,
            merchant_name: None,
            payment_data: None,
        }
    }

    #[tokio::test]
    async fn test_dismissed_voucher_completes() {
        let (reporter, mut events) = ActionReporter::channel(FlowId::new(), ActionKind::Voucher);

        VoucherHandler::new(Arc::new(Presenter(true)))
            .handle(voucher(), reporter)
            .await;

        assert!(matches!(events.recv().await, Some(ActionEvent::Completed)));
    }

    #[tokio::test]
    async fn test_presenter_error_fails() {
        let (reporter, mut events) = ActionReporter::channel(FlowId::new(), ActionKind::Voucher);

        VoucherHandler::new(Arc::new(Presenter(false)))
            .handle(voucher(), reporter)
            .await;

        assert!(matches!(
            events.recv().await,
            Some(ActionEvent::Failed(PaymentError::ActionHandling(
                ActionError::Collaborator(_)
            )))
        ));
    }
}
