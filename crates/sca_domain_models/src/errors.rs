//! TPP-facing error representation.

use common_enums::{MessageErrorCode, ServiceKind, StatusClass};
use sca_interfaces::types::{ConnectorMessage, MessageCategory};

/// Service-scoped error namespace an error is reported under.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Ais400,
    Ais401,
    Ais403,
    Ais404,
    Ais409,
    Pis400,
    Pis401,
    Pis403,
    Pis404,
    Pis409,
}

impl ErrorType {
    /// Picks the namespace for a service family and severity class.
    pub const fn of(service: ServiceKind, class: StatusClass) -> Self {
        match (service, class) {
            (ServiceKind::Ais, StatusClass::BadRequest) => Self::Ais400,
            (ServiceKind::Ais, StatusClass::Unauthorised) => Self::Ais401,
            (ServiceKind::Ais, StatusClass::Forbidden) => Self::Ais403,
            (ServiceKind::Ais, StatusClass::NotFound) => Self::Ais404,
            (ServiceKind::Ais, StatusClass::Conflict) => Self::Ais409,
            (ServiceKind::Pis, StatusClass::BadRequest) => Self::Pis400,
            (ServiceKind::Pis, StatusClass::Unauthorised) => Self::Pis401,
            (ServiceKind::Pis, StatusClass::Forbidden) => Self::Pis403,
            (ServiceKind::Pis, StatusClass::NotFound) => Self::Pis404,
            (ServiceKind::Pis, StatusClass::Conflict) => Self::Pis409,
        }
    }
}

/// One message shown to the TPP in an error body.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TppMessageInformation {
    pub category: MessageCategory,
    pub message_error_code: MessageErrorCode,
    pub text: Option<String>,
}

impl TppMessageInformation {
    pub fn of(code: MessageErrorCode) -> Self {
        Self {
            category: MessageCategory::Error,
            message_error_code: code,
            text: None,
        }
    }

    pub fn with_text(code: MessageErrorCode, text: impl Into<String>) -> Self {
        Self {
            category: MessageCategory::Error,
            message_error_code: code,
            text: Some(text.into()),
        }
    }
}

impl From<&ConnectorMessage> for TppMessageInformation {
    fn from(message: &ConnectorMessage) -> Self {
        Self {
            category: message.category,
            message_error_code: message.code,
            text: message.text.clone(),
        }
    }
}

/// Error namespace plus the messages reported under it.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ErrorHolder {
    pub error_type: ErrorType,
    pub tpp_messages: Vec<TppMessageInformation>,
}

impl ErrorHolder {
    pub fn new(error_type: ErrorType, code: MessageErrorCode) -> Self {
        Self {
            error_type,
            tpp_messages: vec![TppMessageInformation::of(code)],
        }
    }

    /// The code of the first message, when one is present.
    pub fn first_code(&self) -> Option<MessageErrorCode> {
        self.tpp_messages
            .first()
            .map(|message| message.message_error_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_follows_service_and_class() {
        assert_eq!(
            ErrorType::of(ServiceKind::Ais, StatusClass::Unauthorised),
            ErrorType::Ais401
        );
        assert_eq!(
            ErrorType::of(ServiceKind::Pis, StatusClass::BadRequest),
            ErrorType::Pis400
        );
    }
}
