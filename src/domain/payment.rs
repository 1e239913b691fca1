use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ISO 4217 currencies without minor units.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &[
    "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND", "VUV",
    "XAF", "XOF", "XPF",
];

/// ISO 4217 currencies with three minor-unit digits.
const THREE_DECIMAL_CURRENCIES: &[&str] = &["BHD", "IQD", "JOD", "KWD", "LYD", "OMR", "TND"];

/// A monetary amount in minor units, as the checkout API expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub value: i64,
    pub currency: String,
}

impl Amount {
    pub fn new(value: i64, currency: impl Into<String>) -> Self {
        Self {
            value,
            currency: currency.into(),
        }
    }

    /// Converts a major-unit decimal (e.g. `17.50 EUR`) into minor units.
    ///
    /// Fails when the value is negative or carries more fraction digits than
    /// the currency allows.
    pub fn from_major_units(value: Decimal, currency: &str) -> Result<Self> {
        if value < Decimal::ZERO {
            return Err(PaymentError::Configuration(
                "Amount must not be negative".to_string(),
            ));
        }

        let currency = currency.to_ascii_uppercase();
        let scale = Decimal::from(10_i64.pow(minor_unit_exponent(&currency)));
        let minor = value.checked_mul(scale).ok_or_else(|| {
            PaymentError::Configuration(format!("Amount {value} {currency} is out of range"))
        })?;
        if !minor.fract().is_zero() {
            return Err(PaymentError::Configuration(format!(
                "Amount {value} has too many decimal places for {currency}"
            )));
        }

        let value = minor.trunc().to_i64().ok_or_else(|| {
            PaymentError::Configuration(format!("Amount {value} {currency} is out of range"))
        })?;
        Ok(Self { value, currency })
    }
}

fn minor_unit_exponent(currency: &str) -> u32 {
    if ZERO_DECIMAL_CURRENCIES.contains(&currency) {
        0
    } else if THREE_DECIMAL_CURRENCIES.contains(&currency) {
        3
    } else {
        2
    }
}

/// Serialized payment method details, e.g. `{"type": "scheme", ...}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethodDetails(Map<String, Value>);

impl PaymentMethodDetails {
    pub fn new(payment_type: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("type".to_string(), Value::String(payment_type.into()));
        Self(fields)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn payment_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for PaymentMethodDetails {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserInfo {
    pub user_agent: String,
}

/// Details submitted by the shopper for one payment attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentComponentData {
    pub payment_method: PaymentMethodDetails,
    #[serde(default)]
    pub store_payment_method: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_info: Option<BrowserInfo>,
}

impl PaymentComponentData {
    pub fn new(payment_method: PaymentMethodDetails) -> Self {
        Self {
            payment_method,
            store_payment_method: false,
            browser_info: None,
        }
    }
}

/// Details produced by an action handler, to be sent to `payments/details`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionComponentData {
    pub details: Map<String, Value>,
    pub payment_data: Option<String>,
}

impl ActionComponentData {
    pub fn new(details: Map<String, Value>, payment_data: Option<String>) -> Self {
        Self {
            details,
            payment_data,
        }
    }
}
