//! Translation of adapter answers into the TPP error namespaces.

use common_enums::{MessageErrorCode, ServiceKind};
use sca_domain_models::errors::{ErrorHolder, ErrorType, TppMessageInformation};
use sca_interfaces::types::{ConnectorMessage, ConnectorResponse};

/// Translates the errors of an adapter answer into the namespace of the
/// calling service.
///
/// The namespace is picked from the severity class of the first error code,
/// so a credential rejection always lands in the 401 family of the service.
/// An answer that failed without any message is reported as a format error.
pub fn to_error_holder(errors: &[ConnectorMessage], service: ServiceKind) -> ErrorHolder {
    let code = errors
        .first()
        .map(|message| message.code)
        .unwrap_or(MessageErrorCode::FormatError);
    let error_type = ErrorType::of(service, code.status_class());
    let tpp_messages = if errors.is_empty() {
        vec![TppMessageInformation::of(code)]
    } else {
        errors.iter().map(TppMessageInformation::from).collect()
    };
    ErrorHolder {
        error_type,
        tpp_messages,
    }
}

/// An attempt failure carries both a payload and errors: the bank rejected
/// this try but allows another one.
pub fn is_attempt_failure<T>(response: &ConnectorResponse<T>) -> bool {
    response.payload.is_some() && response.has_error()
}

pub fn is_credential_failure(error: &ErrorHolder) -> bool {
    error.first_code() == Some(MessageErrorCode::PsuCredentialsInvalid)
}
