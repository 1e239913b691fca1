use crate::application::dispatcher::ActionHandlers;
use crate::application::handlers::{
    AwaitPoller, RedirectHandler, ThreeDs2Handler, UnsupportedAction, VoucherHandler,
};
use crate::application::redirect::RedirectRegistry;
use crate::config::PollingConfig;
use crate::domain::action::{RedirectAction, RedirectMethod, VoucherAction};
use crate::domain::ports::{
    OpenResult, PaymentStatusClient, ThreeDs2Service, UrlOpener, VoucherPresenter,
};
use crate::domain::status::PaymentStatus;
use crate::error::{ActionError, PaymentError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Line-based shopper interaction over stdin/stderr.
///
/// End of input means the shopper walked away: the pending question fails
/// with a cancellation and [`ConsolePrompt::closed`] resolves.
#[derive(Clone)]
pub struct ConsolePrompt {
    lines: Arc<Mutex<Lines<Box<dyn AsyncBufRead + Send + Unpin>>>>,
    closed: CancellationToken,
}

impl ConsolePrompt {
    pub fn stdin() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        let reader: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(reader.lines())),
            closed: CancellationToken::new(),
        }
    }

    /// Resolves once stdin reached its end.
    pub async fn closed(&self) {
        self.closed.cancelled().await
    }

    pub async fn ask(&self, question: &str) -> Result<String> {
        eprintln!("{question}");
        let line = self
            .lines
            .lock()
            .await
            .next_line()
            .await
            .map_err(|e| ActionError::Collaborator(format!("cannot read stdin: {e}")))?;
        match line {
            Some(line) => Ok(line.trim().to_string()),
            None => {
                self.closed.cancel();
                Err(PaymentError::Cancelled)
            }
        }
    }
}

/// Prints the redirect target and forwards the URL the shopper pastes back to
/// the redirect registry.
///
/// Stops reading as soon as no redirect is pending, so later prompts get
/// their own lines.
pub struct ConsoleUrlOpener {
    prompt: ConsolePrompt,
    registry: Arc<RedirectRegistry>,
}

impl ConsoleUrlOpener {
    pub fn new(prompt: ConsolePrompt) -> Self {
        Self::with_registry(prompt, RedirectRegistry::global())
    }

    pub fn with_registry(prompt: ConsolePrompt, registry: Arc<RedirectRegistry>) -> Self {
        Self { prompt, registry }
    }
}

#[async_trait]
impl UrlOpener for ConsoleUrlOpener {
    async fn open(&self, action: &RedirectAction) -> OpenResult {
        match action.method {
            RedirectMethod::Get => eprintln!("Open in a browser: {}", action.url),
            RedirectMethod::Post => eprintln!(
                "POST to {} with fields {:?}",
                action.url,
                action.data.as_ref().map(|data| data.keys().collect::<Vec<_>>())
            ),
        }

        let prompt = self.prompt.clone();
        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            loop {
                let line = tokio::select! {
                    biased;
                    _ = registry.idle() => break,
                    line = prompt.ask("Paste the return URL:") => line,
                };
                let Ok(line) = line else { break };
                match Url::parse(&line) {
                    Ok(url) if registry.application_did_open(&url) => break,
                    _ => eprintln!("That URL does not belong to this payment."),
                }
            }
        });
        OpenResult::Browser
    }
}

pub struct ConsoleThreeDs2 {
    prompt: ConsolePrompt,
}

#[async_trait]
impl ThreeDs2Service for ConsoleThreeDs2 {
    async fn fingerprint(&self, token: &str, _authorisation_token: Option<&str>) -> Result<String> {
        self.prompt
            .ask(&format!("Device fingerprint for token {token}:"))
            .await
    }

    async fn challenge(&self, token: &str, _authorisation_token: Option<&str>) -> Result<String> {
        self.prompt
            .ask(&format!("Challenge result for token {token}:"))
            .await
    }
}

pub struct ConsoleVoucherPresenter;

#[async_trait]
impl VoucherPresenter for ConsoleVoucherPresenter {
    async fn present(&self, voucher: &VoucherAction) -> Result<()> {
        eprintln!("Voucher ({})", voucher.payment_method_type);
        if let Some(reference) = &voucher.reference {
            eprintln!("  reference: {reference}");
        }
        if let Some(amount) = &voucher.total_amount {
            eprintln!("  amount: {} {}", amount.value, amount.currency);
        }
        if let Some(expires_at) = &voucher.expires_at {
            eprintln!("  expires: {expires_at}");
        }
        Ok(())
    }
}

/// Asks for each status poll result as a JSON line, for offline replays.
pub struct ConsoleStatusClient {
    prompt: ConsolePrompt,
}

#[async_trait]
impl PaymentStatusClient for ConsoleStatusClient {
    async fn status(&self, _payment_data: &str) -> Result<PaymentStatus> {
        let line = self.prompt.ask("Payment status (JSON):").await?;
        Ok(serde_json::from_str(&line)?)
    }
}

impl ConsoleStatusClient {
    pub fn new(prompt: ConsolePrompt) -> Self {
        Self { prompt }
    }
}

/// Handlers for every action type, interacting through the console.
pub fn console_handlers(
    prompt: &ConsolePrompt,
    status: Arc<dyn PaymentStatusClient>,
    polling: PollingConfig,
    return_url: Url,
) -> ActionHandlers {
    let three_ds2 = Arc::new(ThreeDs2Handler::new(Arc::new(ConsoleThreeDs2 {
        prompt: prompt.clone(),
    })));
    let opener = Arc::new(ConsoleUrlOpener::new(prompt.clone()));

    ActionHandlers {
        redirect: Arc::new(RedirectHandler::new(opener, return_url)),
        fingerprint: three_ds2.clone(),
        challenge: three_ds2,
        voucher: Arc::new(VoucherHandler::new(Arc::new(ConsoleVoucherPresenter))),
        sdk: Arc::new(UnsupportedAction),
        awaiting: Arc::new(AwaitPoller::new(
            status,
            polling.interval(),
            polling.max_attempts,
        )),
    }
}
