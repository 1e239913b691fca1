use crate::domain::merchant::{Channel, MerchantConfig};
use crate::domain::payment::Amount;
use crate::error::{PaymentError, Result};
use crate::infrastructure::http::DEFAULT_STATUS_PATH;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_KEY_ENV: &str = "CHECKOUT_API_KEY";

/// Everything the `payflow` binary reads from its TOML file.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub merchant: MerchantConfig,
    pub client: ClientConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: Option<Url>,
    pub api_key_env: String,
    pub status_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            status_path: DEFAULT_STATUS_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn base_url(&self) -> Result<&Url> {
        self.base_url.as_ref().ok_or_else(|| {
            PaymentError::Configuration("client.base_url is required to reach the API".to_string())
        })
    }

    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String> {
        std::env::var(&self.api_key_env).map_err(|_| {
            PaymentError::Configuration(format!(
                "environment variable {} is not set",
                self.api_key_env
            ))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_attempts: 60,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    merchant: RawMerchant,
    #[serde(default)]
    client: ClientConfig,
    #[serde(default)]
    polling: PollingConfig,
}

#[derive(Debug, Deserialize)]
struct RawMerchant {
    merchant_account: String,
    reference: String,
    country_code: String,
    return_url: String,
    shopper_reference: String,
    shopper_email: String,
    #[serde(default)]
    channel: Channel,
    #[serde(default)]
    additional_data: Map<String, Value>,
    amount: RawAmount,
}

/// Amount in major units, e.g. `value = "17.50"`.
#[derive(Debug, Deserialize)]
struct RawAmount {
    value: Decimal,
    currency: String,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            PaymentError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let raw: RawConfig =
            toml::from_str(contents).map_err(|e| PaymentError::Configuration(e.to_string()))?;
        let merchant = raw.merchant;

        let return_url = Url::parse(&merchant.return_url).map_err(|e| {
            PaymentError::Configuration(format!(
                "invalid return_url {:?}: {e}",
                merchant.return_url
            ))
        })?;
        let amount = Amount::from_major_units(merchant.amount.value, &merchant.amount.currency)?;

        Ok(Self {
            merchant: MerchantConfig {
                merchant_account: merchant.merchant_account,
                amount,
                reference: merchant.reference,
                country_code: merchant.country_code,
                return_url,
                shopper_reference: merchant.shopper_reference,
                shopper_email: merchant.shopper_email,
                channel: merchant.channel,
                additional_data: merchant.additional_data,
            },
            client: raw.client,
            polling: raw.polling,
        })
    }
}
