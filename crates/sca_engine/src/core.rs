pub mod authorisation;
pub mod errors;
