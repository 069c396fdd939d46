#![forbid(unsafe_code)]

//! Traits and data types at the boundary between the authorisation engine and
//! a bank (ASPSP) adapter.
//!
//! The engine never talks to a bank directly. Every outbound call goes through
//! one of the connector traits in [`api`], and every answer comes back in a
//! [`ConnectorResponse`] envelope that can carry a payload, TPP-facing error
//! messages, or both at once (an attempt failure carries both).

pub mod api;
pub mod types;

pub use api::{
    AspspConsentDataProvider, AuthorisationConnector, ConsentConnector,
    PaymentAuthorisationConnector, PaymentCancellationConnector,
};
pub use types::{ConnectorMessage, ConnectorResponse};
