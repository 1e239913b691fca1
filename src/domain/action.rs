use super::payment::Amount;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use url::Url;

/// A server-directed next step that needs shopper interaction before the
/// payment can complete.
///
/// Decoding is driven by the `type` discriminator. Unknown discriminators and
/// missing required fields are decoding errors; there is no catch-all variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Action {
    #[serde(rename = "redirect")]
    Redirect(RedirectAction),
    #[serde(rename = "threeDS2Fingerprint")]
    ThreeDs2Fingerprint(ThreeDs2FingerprintAction),
    #[serde(rename = "threeDS2Challenge")]
    ThreeDs2Challenge(ThreeDs2ChallengeAction),
    #[serde(rename = "voucher")]
    Voucher(VoucherAction),
    #[serde(rename = "sdk")]
    Sdk(SdkAction),
    #[serde(rename = "await")]
    Await(AwaitAction),
}

impl Action {
    /// Decodes a single action object.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Redirect(_) => ActionKind::Redirect,
            Action::ThreeDs2Fingerprint(_) => ActionKind::ThreeDs2Fingerprint,
            Action::ThreeDs2Challenge(_) => ActionKind::ThreeDs2Challenge,
            Action::Voucher(_) => ActionKind::Voucher,
            Action::Sdk(_) => ActionKind::Sdk,
            Action::Await(_) => ActionKind::Await,
        }
    }

    /// The opaque token to echo back with the follow-up details, if any.
    pub fn payment_data(&self) -> Option<&str> {
        match self {
            Action::Redirect(action) => action.payment_data.as_deref(),
            Action::ThreeDs2Fingerprint(action) => action.payment_data.as_deref(),
            Action::ThreeDs2Challenge(action) => action.payment_data.as_deref(),
            Action::Voucher(action) => action.payment_data.as_deref(),
            Action::Sdk(action) => action.payment_data.as_deref(),
            Action::Await(action) => Some(&action.payment_data),
        }
    }
}

/// Discriminator of an [`Action`], used for logging and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Redirect,
    ThreeDs2Fingerprint,
    ThreeDs2Challenge,
    Voucher,
    Sdk,
    Await,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Redirect => "redirect",
            ActionKind::ThreeDs2Fingerprint => "threeDS2Fingerprint",
            ActionKind::ThreeDs2Challenge => "threeDS2Challenge",
            ActionKind::Voucher => "voucher",
            ActionKind::Sdk => "sdk",
            ActionKind::Await => "await",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RedirectMethod {
    #[default]
    Get,
    Post,
}

/// Sends the shopper to an external website or app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectAction {
    pub url: Url,
    #[serde(default)]
    pub method: RedirectMethod,
    /// Form fields to post when `method` is `POST`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_type: Option<String>,
}

/// Describes an action in which a 3D Secure device fingerprint is taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDs2FingerprintAction {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorisation_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
}

/// Describes an action in which the shopper completes a 3D Secure challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreeDs2ChallengeAction {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorisation_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
}

/// An offline payment voucher to present to the shopper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherAction {
    pub payment_method_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions_url: Option<Url>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
}

/// An action resolved by a payment-method specific SDK (e.g. a wallet app).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkAction {
    pub payment_method_type: String,
    #[serde(default)]
    pub sdk_data: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_data: Option<String>,
}

/// The shopper confirms the payment elsewhere; the result is polled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwaitAction {
    pub payment_method_type: String,
    pub payment_data: String,
}
