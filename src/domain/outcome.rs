use super::action::ActionKind;
use super::response::ResultCode;
use crate::error::PaymentError;
use std::fmt;
use uuid::Uuid;

/// Identifies one payment flow; used to correlate redirect returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowId(Uuid);

impl FlowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(Self)
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The single terminal result of a payment flow.
#[derive(Debug)]
pub enum FlowOutcome {
    /// The flow reached a final result code. This includes `Refused` and
    /// `Error`: the server answered, the flow itself did not break.
    Success(ResultCode),
    Failure(PaymentError),
    Cancelled,
}

impl FlowOutcome {
    pub fn result_code(&self) -> Option<ResultCode> {
        match self {
            FlowOutcome::Success(code) => Some(*code),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&PaymentError> {
        match self {
            FlowOutcome::Failure(error) => Some(error),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, FlowOutcome::Cancelled)
    }

    pub(crate) fn terminal_state(&self) -> TerminalState {
        match self {
            FlowOutcome::Success(code) => TerminalState::Success(*code),
            FlowOutcome::Failure(_) => TerminalState::Failure,
            FlowOutcome::Cancelled => TerminalState::Cancelled,
        }
    }
}

impl fmt::Display for FlowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowOutcome::Success(code) => write!(f, "success {code}"),
            FlowOutcome::Failure(error) => write!(f, "failure {error}"),
            FlowOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalState {
    Success(ResultCode),
    Failure,
    Cancelled,
}

/// Where a payment flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingPaymentsResponse,
    HandlingAction(ActionKind),
    AwaitingDetailsResponse,
    Terminal(TerminalState),
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Terminal(_))
    }
}
