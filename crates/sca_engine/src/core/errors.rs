//! Engine-level failures.
//!
//! Everything the bank or the TPP did wrong is reported in-band through
//! [`sca_domain_models::errors::ErrorHolder`]; the variants here are faults
//! of the engine's own wiring or storage.

use common_enums::{ScaApproach, ScaStatus};
use common_utils::errors::CustomResult;

pub type ProcessorResult<T> = CustomResult<T, ProcessorError>;

#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("No authorisation service registered for SCA approach {0}")]
    NoApproachService(ScaApproach),
    #[error("Authorisation update is not supported in SCA status {0}")]
    UnsupportedScaStatus(ScaStatus),
    #[error("Storage operation failed")]
    StorageError,
}
