#![forbid(unsafe_code)]

//! Entities the authorisation engine persists and passes between its layers.

pub mod authorisation;
pub mod consents;
pub mod errors;
pub mod payments;
pub mod processor;
