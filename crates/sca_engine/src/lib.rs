#![forbid(unsafe_code)]

//! The strong customer authentication (SCA) authorisation engine.
//!
//! An authorisation is a sub-resource of a consent or a payment. The TPP
//! drives it forward with PUT updates; each update lands in the processor for
//! the authorisation's family (AIS consent, payment initiation, payment
//! cancellation) and moves the SCA status along the transition graph. Every
//! call to the bank goes through the adapter traits of `sca_interfaces`, and
//! every bank error is translated into the service-scoped TPP error namespace
//! before it leaves the engine.

pub mod configs;
pub mod core;
pub mod db;

#[cfg(test)]
pub(crate) mod test_utils;

pub use self::{
    configs::settings::{AuthorisationSettings, Settings},
    db::{MockDb, StorageInterface},
};
