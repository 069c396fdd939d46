#![forbid(unsafe_code)]

//! Enums shared by every layer of the SCA authorisation engine.

pub mod enums;

pub use enums::*;
