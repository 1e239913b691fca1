use super::action::{RedirectAction, VoucherAction};
use super::event::ActionReporter;
use super::request::{PaymentDetailsRequest, PaymentsRequest};
use super::response::PaymentsResponse;
use super::status::PaymentStatus;
use crate::error::{EncryptionError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Transport for the checkout API.
#[async_trait]
pub trait CheckoutClient: Send + Sync {
    async fn payments(&self, request: PaymentsRequest) -> Result<PaymentsResponse>;
    async fn payment_details(&self, request: PaymentDetailsRequest) -> Result<PaymentsResponse>;
}

pub type CheckoutClientBox = Box<dyn CheckoutClient>;

/// Resolves one kind of action into follow-up details or a terminal result.
///
/// Implementations report exactly once through the consuming methods of
/// [`ActionReporter`].
#[async_trait]
pub trait ActionHandler<A>: Send + Sync {
    async fn handle(&self, action: A, reporter: ActionReporter);
}

pub type ActionHandlerArc<A> = Arc<dyn ActionHandler<A>>;

/// Encrypts sensitive card fields with the merchant's public key.
pub trait CardEncryptor: Send + Sync {
    fn encrypt(
        &self,
        plaintext: &str,
        public_key: &str,
    ) -> std::result::Result<String, EncryptionError>;
}

/// Queries the status of a payment awaiting confirmation elsewhere.
#[async_trait]
pub trait PaymentStatusClient: Send + Sync {
    async fn status(&self, payment_data: &str) -> Result<PaymentStatus>;
}

/// Where a redirect URL ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenResult {
    ExternalApplication,
    Browser,
    NotOpened,
}

/// Hands a redirect over to the platform.
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, action: &RedirectAction) -> OpenResult;
}

/// 3D Secure 2 device SDK.
#[async_trait]
pub trait ThreeDs2Service: Send + Sync {
    /// Returns the encoded device fingerprint.
    async fn fingerprint(&self, token: &str, authorisation_token: Option<&str>) -> Result<String>;
    /// Runs the challenge and returns the encoded challenge result.
    async fn challenge(&self, token: &str, authorisation_token: Option<&str>) -> Result<String>;
}

/// Shows a voucher; resolves once the shopper dismisses it.
#[async_trait]
pub trait VoucherPresenter: Send + Sync {
    async fn present(&self, voucher: &VoucherAction) -> Result<()>;
}
