use super::action::Action;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a payment attempt as reported by the checkout API.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ResultCode {
    Authorised,
    Refused,
    Pending,
    Cancelled,
    Error,
    Received,
    RedirectShopper,
    IdentifyShopper,
    ChallengeShopper,
    PresentToShopper,
}

impl ResultCode {
    /// Codes that require shopper interaction and therefore carry an action.
    pub fn requires_action(&self) -> bool {
        matches!(
            self,
            ResultCode::RedirectShopper
                | ResultCode::IdentifyShopper
                | ResultCode::ChallengeShopper
                | ResultCode::PresentToShopper
        )
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decoded response of both the `payments` and `payments/details` calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsResponse {
    pub result_code: ResultCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
}

/// What the flow has to do with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum NextStep {
    Finish(ResultCode),
    Handle(ResultCode, Action),
}

impl PaymentsResponse {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Resolves the response into the next step.
    ///
    /// A terminal code always wins: an action sent along with it is dropped.
    pub fn into_next_step(self) -> NextStep {
        match self.action {
            Some(action) if self.result_code.requires_action() => {
                NextStep::Handle(self.result_code, action)
            }
            Some(action) => {
                tracing::warn!(
                    result_code = %self.result_code,
                    action = %action.kind(),
                    "ignoring action sent with a terminal result code"
                );
                NextStep::Finish(self.result_code)
            }
            None => NextStep::Finish(self.result_code),
        }
    }
}
