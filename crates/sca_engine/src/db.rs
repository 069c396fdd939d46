//! Storage interfaces of the engine.
//!
//! Every collaborator the processors persist through is behind an async
//! trait, so tests and embedders can swap the backing store freely.

pub mod authorisation;
pub mod consent;
pub mod mock_db;
pub mod payment;

pub use mock_db::MockDb;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Value not found: {0}")]
    ValueNotFound(String),
    #[error("Error on the mock database")]
    MockDbError,
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ValueNotFound(_))
    }
}

/// Union of all stores the processors need.
pub trait StorageInterface:
    authorisation::AuthorisationInterface
    + consent::ConsentInterface
    + payment::PaymentInterface
    + Send
    + Sync
    + 'static
{
}

impl StorageInterface for MockDb {}
