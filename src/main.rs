use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use payflow::application::dispatcher::ActionDispatcher;
use payflow::application::flow::PaymentFlow;
use payflow::config::AppConfig;
use payflow::domain::outcome::FlowOutcome;
use payflow::domain::payment::PaymentComponentData;
use payflow::domain::ports::{CheckoutClientBox, PaymentStatusClient};
use payflow::domain::response::PaymentsResponse;
use payflow::infrastructure::http::HttpCheckoutClient;
use payflow::infrastructure::scripted::ScriptedCheckoutClient;
use payflow::interfaces::console::{ConsolePrompt, ConsoleStatusClient, console_handlers};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a checkout response and print what the flow would do next
    Decode {
        /// JSON file holding a payments or payment details response
        input: PathBuf,
    },
    /// Run a payment flow against scripted checkout responses
    Replay {
        #[arg(long)]
        config: PathBuf,
        /// JSON array of responses, answered in order
        #[arg(long)]
        script: PathBuf,
        /// JSON file with the shopper's payment component data
        #[arg(long)]
        payment_method: PathBuf,
    },
    /// Run a payment flow against the checkout API
    Pay {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        payment_method: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Decode { input } => {
            let bytes = std::fs::read(input).into_diagnostic()?;
            let response = PaymentsResponse::decode(&bytes).into_diagnostic()?;
            println!("resultCode: {}", response.result_code);
            match &response.action {
                Some(action) => println!("action: {}", action.kind()),
                None => println!("action: none"),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Replay {
            config,
            script,
            payment_method,
        } => {
            let config = AppConfig::load(&config).into_diagnostic()?;
            let script = std::fs::read_to_string(script).into_diagnostic()?;
            let client = ScriptedCheckoutClient::from_json_array(&script).into_diagnostic()?;

            let prompt = ConsolePrompt::stdin();
            let status = Arc::new(ConsoleStatusClient::new(prompt.clone()));
            run_flow(config, Box::new(client), status, prompt, &payment_method).await
        }
        Command::Pay {
            config,
            payment_method,
        } => {
            let config = AppConfig::load(&config).into_diagnostic()?;
            let base_url = config.client.base_url().into_diagnostic()?.clone();
            let api_key = config.client.api_key().into_diagnostic()?;
            let client = HttpCheckoutClient::new(base_url, api_key)
                .with_status_path(config.client.status_path.clone());

            let prompt = ConsolePrompt::stdin();
            let status = Arc::new(client.clone());
            run_flow(config, Box::new(client), status, prompt, &payment_method).await
        }
    }
}

async fn run_flow(
    config: AppConfig,
    client: CheckoutClientBox,
    status: Arc<dyn PaymentStatusClient>,
    prompt: ConsolePrompt,
    payment_method: &Path,
) -> Result<ExitCode> {
    let data = std::fs::read(payment_method).into_diagnostic()?;
    let data: PaymentComponentData = serde_json::from_slice(&data).into_diagnostic()?;

    let handlers = console_handlers(
        &prompt,
        status,
        config.polling,
        config.merchant.return_url.clone(),
    );
    let mut flow = PaymentFlow::new(
        Arc::new(config.merchant),
        client,
        ActionDispatcher::new(handlers),
    );

    // Closing stdin abandons the payment.
    let cancel = flow.cancel_handle();
    tokio::spawn(async move {
        prompt.closed().await;
        cancel.cancel();
    });

    let outcome = flow.submit(data).await.into_diagnostic()?;
    println!("outcome: {outcome}");
    Ok(match outcome {
        FlowOutcome::Success(_) => ExitCode::SUCCESS,
        FlowOutcome::Failure(_) | FlowOutcome::Cancelled => ExitCode::FAILURE,
    })
}
