use serde::Deserialize;

/// Result code of a status poll for an awaited payment.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    Pending,
    Received,
    Authorised,
    Refused,
    Cancelled,
    Error,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub result_code: StatusCode,
    #[serde(default)]
    pub payload: Option<String>,
}

impl PaymentStatus {
    pub fn is_pending(&self) -> bool {
        self.result_code == StatusCode::Pending
    }
}
