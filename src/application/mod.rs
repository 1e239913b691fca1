//! Application layer containing the payment flow orchestration.
//!
//! `PaymentFlow` drives a payment through the server-directed action loop,
//! `ActionDispatcher` routes each action to its handler and the redirect
//! registry correlates return URLs with the flows waiting for them.

pub mod dispatcher;
pub mod flow;
pub mod handlers;
pub mod redirect;
