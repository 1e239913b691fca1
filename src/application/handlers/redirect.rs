use crate::application::redirect::{RedirectRegistry, correlated_return_url};
use crate::domain::action::RedirectAction;
use crate::domain::event::ActionReporter;
use crate::domain::payment::ActionComponentData;
use crate::domain::ports::{ActionHandler, OpenResult, UrlOpener};
use crate::error::ActionError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Sends the shopper away and waits for the application to be reopened
/// through the return URL.
pub struct RedirectHandler {
    opener: Arc<dyn UrlOpener>,
    registry: Arc<RedirectRegistry>,
    return_url: Url,
}

impl RedirectHandler {
    /// Listens on the process-wide registry behind `application_did_open`.
    pub fn new(opener: Arc<dyn UrlOpener>, return_url: Url) -> Self {
        Self {
            opener,
            registry: RedirectRegistry::global(),
            return_url,
        }
    }

    pub fn with_registry(mut self, registry: Arc<RedirectRegistry>) -> Self {
        self.registry = registry;
        self
    }
}

#[async_trait]
impl ActionHandler<RedirectAction> for RedirectHandler {
    async fn handle(&self, action: RedirectAction, reporter: ActionReporter) {
        let flow_id = reporter.flow_id();
        // Registered before opening so an immediate return is not missed.
        let mut pending = self
            .registry
            .register(flow_id, correlated_return_url(&self.return_url, flow_id));

        match self.opener.open(&action).await {
            OpenResult::ExternalApplication => {
                info!(%flow_id, "redirect opened in an external application");
                reporter.opened_external_application();
            }
            OpenResult::Browser => info!(%flow_id, "redirect opened in the browser"),
            OpenResult::NotOpened => {
                reporter.fail(ActionError::AppNotFound);
                return;
            }
        }

        let Some(url) = pending.returned().await else {
            reporter.fail(ActionError::Collaborator(
                "redirect was superseded by another registration".to_string(),
            ));
            return;
        };

        match redirect_details(&url) {
            Ok(details) => {
                reporter.provide(ActionComponentData::new(details, action.payment_data));
            }
            Err(error) => {
                reporter.fail(error);
            }
        }
    }
}

/// Extracts the payment details the issuer appended to the return URL.
pub fn redirect_details(url: &Url) -> Result<Map<String, Value>, ActionError> {
    let find = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| Value::String(value.into_owned()))
    };

    let mut details = Map::new();
    if let Some(result) = find("redirectResult") {
        details.insert("redirectResult".to_string(), result);
    } else if let Some(payload) = find("payload") {
        details.insert("payload".to_string(), payload);
    } else if let (Some(md), Some(pa_res)) = (find("MD"), find("PaRes")) {
        details.insert("MD".to_string(), md);
        details.insert("PaRes".to_string(), pa_res);
    } else {
        let mut bare = url.clone();
        bare.set_query(None);
        return Err(ActionError::InvalidRedirectUrl(bare.to_string()));
    }
    Ok(details)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::action::ActionKind;
    use crate::domain::event::ActionEvent;
    use crate::domain::outcome::FlowId;
    use crate::error::PaymentError;
    use serde_json::json;

    struct FixedOpener(OpenResult);

    #[async_trait]
    impl UrlOpener for FixedOpener {
        async fn open(&self, _action: &RedirectAction) -> OpenResult {
            self.0
        }
    }

    fn action() -> RedirectAction {
        RedirectAction {
            url: Url::parse("https://bank.example/3ds").unwrap(),
            method: Default::default(),
            data: None,
            payment_data: Some("pd-redirect".to_string()),
            payment_method_type: None,
        }
    }

    fn handler(result: OpenResult, registry: &Arc<RedirectRegistry>) -> RedirectHandler {
        RedirectHandler::new(
            Arc::new(FixedOpener(result)),
            Url::parse("shop://payments").unwrap(),
        )
        .with_registry(Arc::clone(registry))
    }

    #[test]
    fn test_redirect_details_variants() {
        let url = Url::parse("shop://payments?redirectResult=X%3D%3D&payflowId=1").unwrap();
        assert_eq!(
            Value::Object(redirect_details(&url).unwrap()),
            json!({"redirectResult": "X=="})
        );

        let url = Url::parse("shop://payments?payload=P1").unwrap();
        assert_eq!(
            Value::Object(redirect_details(&url).unwrap()),
            json!({"payload": "P1"})
        );

        let url = Url::parse("shop://payments?MD=m&PaRes=p").unwrap();
        assert_eq!(
            Value::Object(redirect_details(&url).unwrap()),
            json!({"MD": "m", "PaRes": "p"})
        );

        let url = Url::parse("shop://payments?MD=m").unwrap();
        assert!(matches!(
            redirect_details(&url),
            Err(ActionError::InvalidRedirectUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_return_url_provides_details() {
        let registry = RedirectRegistry::new();
        let flow_id = FlowId::new();
        let (reporter, mut events) = ActionReporter::channel(flow_id, ActionKind::Redirect);
        let handler = handler(OpenResult::ExternalApplication, &registry);

        let task = tokio::spawn(async move { handler.handle(action(), reporter).await });

        assert!(matches!(
            events.recv().await,
            Some(ActionEvent::OpenedExternalApplication)
        ));
        let url = Url::parse("shop://payments?redirectResult=abc").unwrap();
        assert!(registry.application_did_open(&url));

        match events.recv().await {
            Some(ActionEvent::Provided(data)) => {
                assert_eq!(data.payment_data.as_deref(), Some("pd-redirect"));
                assert_eq!(Value::Object(data.details), json!({"redirectResult": "abc"}));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        task.await.unwrap();
        assert_eq!(registry.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_unopened_redirect_fails_with_app_not_found() {
        let registry = RedirectRegistry::new();
        let (reporter, mut events) = ActionReporter::channel(FlowId::new(), ActionKind::Redirect);

        handler(OpenResult::NotOpened, &registry)
            .handle(action(), reporter)
            .await;

        assert!(matches!(
            events.recv().await,
            Some(ActionEvent::Failed(PaymentError::ActionHandling(
                ActionError::AppNotFound
            )))
        ));
        assert_eq!(registry.pending_count(), 0);
    }
}
