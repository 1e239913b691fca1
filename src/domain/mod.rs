//! Domain layer: the checkout data model and the ports to external collaborators.

pub mod action;
pub mod card;
pub mod event;
pub mod merchant;
pub mod outcome;
pub mod payment;
pub mod ports;
pub mod request;
pub mod response;
pub mod status;
