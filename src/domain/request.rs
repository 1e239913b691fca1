use super::merchant::{Channel, MerchantConfig};
use super::payment::{ActionComponentData, Amount, BrowserInfo, PaymentComponentData, PaymentMethodDetails};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// Body of the `payments` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsRequest {
    pub payment_method: PaymentMethodDetails,
    pub store_payment_method: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_info: Option<BrowserInfo>,
    pub channel: Channel,
    pub amount: Amount,
    pub reference: String,
    pub country_code: String,
    pub return_url: Url,
    pub shopper_reference: String,
    pub shopper_email: String,
    pub additional_data: Map<String, Value>,
    pub merchant_account: String,
}

impl PaymentsRequest {
    pub const PATH: &'static str = "payments";

    /// Combines the shopper's submission with the merchant settings.
    ///
    /// `return_url` is passed separately so the caller can correlate the
    /// redirect return with its flow.
    pub fn new(data: PaymentComponentData, config: &MerchantConfig, return_url: Url) -> Self {
        Self {
            payment_method: data.payment_method,
            store_payment_method: data.store_payment_method,
            browser_info: data.browser_info,
            channel: config.channel,
            amount: config.amount.clone(),
            reference: config.reference.clone(),
            country_code: config.country_code.clone(),
            return_url,
            shopper_reference: config.shopper_reference.clone(),
            shopper_email: config.shopper_email.clone(),
            additional_data: config.additional_data.clone(),
            merchant_account: config.merchant_account.clone(),
        }
    }
}

/// Body of the `payments/details` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetailsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
    pub details: Map<String, Value>,
    pub merchant_account: String,
}

impl PaymentDetailsRequest {
    pub const PATH: &'static str = "payments/details";

    pub fn new(data: ActionComponentData, config: &MerchantConfig) -> Self {
        Self {
            payment_data: data.payment_data,
            details: data.details,
            merchant_account: config.merchant_account.clone(),
        }
    }
}
