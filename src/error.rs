use crate::domain::action::ActionKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaymentError>;

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Decoding error: {0}")]
    Decoding(#[from] serde_json::Error),
    #[error("Action handling error: {0}")]
    ActionHandling(#[from] ActionError),
    #[error("Payment cancelled by the shopper")]
    Cancelled,
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Payment flow has already been submitted")]
    AlreadySubmitted,
}

impl PaymentError {
    /// Whether this error represents user-initiated abandonment rather than a fault.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PaymentError::Cancelled)
    }
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("no installed application can handle the redirect")]
    AppNotFound,
    #[error("redirect return URL carries no payment details: {0}")]
    InvalidRedirectUrl(String),
    #[error("{0} handler stopped without reporting a result")]
    HandlerDropped(ActionKind),
    #[error("{0} actions are not supported by this integration")]
    Unsupported(ActionKind),
    #[error("payment status still pending after {attempts} attempts")]
    PollingTimedOut { attempts: u32 },
    #[error("{0}")]
    Collaborator(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncryptionError {
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("failed to encrypt {field}: {reason}")]
    Failed { field: String, reason: String },
}
