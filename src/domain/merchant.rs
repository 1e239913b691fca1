use super::payment::Amount;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Platform identifier sent with every payment.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Default)]
pub enum Channel {
    #[default]
    #[serde(rename = "iOS")]
    Ios,
    Android,
    Web,
}

/// Merchant and shop settings that are constant for a payment flow.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantConfig {
    pub merchant_account: String,
    pub amount: Amount,
    pub reference: String,
    pub country_code: String,
    pub return_url: Url,
    pub shopper_reference: String,
    pub shopper_email: String,
    pub channel: Channel,
    pub additional_data: Map<String, Value>,
}
