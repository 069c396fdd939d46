//! Data carried across the bank adapter boundary.

use common_enums::{
    AuthenticationType, ConsentStatus, MessageErrorCode, OtpFormat, ScaApproach, ScaStatus,
    TransactionStatus,
};
use masking::Secret;

/// Per-call context handed to every connector method.
#[derive(Clone, Debug)]
pub struct ContextData {
    /// Correlation id of the TPP request being served.
    pub request_id: String,
    /// PSU identification headers of the request, possibly empty.
    pub psu_data: PsuIdData,
}

/// Identification of a payment service user.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PsuIdData {
    pub psu_id: Option<String>,
    pub psu_id_type: Option<String>,
    pub psu_corporate_id: Option<String>,
    pub psu_corporate_id_type: Option<String>,
}

impl PsuIdData {
    pub fn new(psu_id: impl Into<String>) -> Self {
        Self {
            psu_id: Some(psu_id.into()),
            ..Self::default()
        }
    }

    /// An empty PSU carries no identification at all.
    pub fn is_empty(&self) -> bool {
        self.psu_id.is_none()
            && self.psu_id_type.is_none()
            && self.psu_corporate_id.is_none()
            && self.psu_corporate_id_type.is_none()
    }
}

/// One SCA method the bank can deliver a challenge through.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AuthenticationObject {
    pub authentication_method_id: String,
    pub authentication_type: AuthenticationType,
    pub authentication_version: Option<String>,
    pub name: Option<String>,
    pub explanation: Option<String>,
    /// Marks methods that complete on a separate device without an OTP entry.
    #[serde(default)]
    pub decoupled: bool,
}

/// Challenge material the PSU must answer to complete an embedded method.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ChallengeData {
    pub image: Option<Vec<u8>>,
    #[serde(default)]
    pub data: Vec<String>,
    pub image_link: Option<String>,
    pub otp_max_length: Option<u32>,
    pub otp_format: Option<OtpFormat>,
    pub additional_information: Option<String>,
}

impl ChallengeData {
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
            && self.data.is_empty()
            && self.image_link.is_none()
            && self.otp_max_length.is_none()
            && self.otp_format.is_none()
            && self.additional_information.is_none()
    }
}

/// Monetary amount as the bank reports it.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Amount {
    pub currency: String,
    pub amount: String,
}

/// Conversion and fee details attached to a cross-currency payment.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct CurrencyConversionInfo {
    pub transaction_fees: Option<Amount>,
    pub currency_conversion_fees: Option<Amount>,
    pub estimated_total_amount: Option<Amount>,
    pub estimated_interbank_settlement_amount: Option<Amount>,
}

/// Outcome of a PSU credential check at the bank.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthorisationStatus {
    Success,
    /// Credentials rejected, no retry allowed.
    Failure,
    /// Credentials rejected but the bank permits another attempt.
    AttemptFailure,
}

#[derive(Clone, Debug)]
pub struct PsuAuthorisationResponse {
    pub status: AuthorisationStatus,
    /// Bank waived SCA for this authorisation.
    pub sca_exempted: bool,
}

#[derive(Clone, Debug, Default)]
pub struct AvailableScaMethodsResponse {
    pub available_sca_methods: Vec<AuthenticationObject>,
    pub sca_exempted: bool,
}

/// Result of asking the bank to send a challenge for one chosen method.
#[derive(Clone, Debug, Default)]
pub struct AuthorisationCodeResult {
    pub selected_sca_method: Option<AuthenticationObject>,
    pub challenge_data: Option<ChallengeData>,
    pub sca_exempted: bool,
}

impl AuthorisationCodeResult {
    /// A result with neither a method nor a challenge is unusable.
    pub fn is_empty(&self) -> bool {
        self.selected_sca_method.is_none()
            && self
                .challenge_data
                .as_ref()
                .map_or(true, ChallengeData::is_empty)
    }
}

/// Answer to an OTP verification against a consent.
#[derive(Clone, Copy, Debug)]
pub struct VerifyScaAuthorisationResponse {
    pub consent_status: ConsentStatus,
}

/// Answer to an OTP verification against a payment, or to an execution
/// without SCA.
#[derive(Clone, Copy, Debug)]
pub struct PaymentExecutionResponse {
    pub transaction_status: TransactionStatus,
}

/// Bank-provided overrides returned when an authorisation is started.
#[derive(Clone, Debug, Default)]
pub struct StartAuthorisationResponse {
    pub sca_approach: Option<ScaApproach>,
    pub sca_status: Option<ScaStatus>,
    pub psu_message: Option<String>,
    pub tpp_messages: Vec<ConnectorMessage>,
}

/// Answer to handing a decoupled flow over to the bank.
#[derive(Clone, Debug, Default)]
pub struct DecoupledScaResponse {
    pub psu_message: Option<String>,
}

/// Severity of one message returned by the bank.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageCategory {
    Error,
    Warning,
}

/// One TPP-facing message produced at the adapter boundary.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct ConnectorMessage {
    pub category: MessageCategory,
    pub code: MessageErrorCode,
    pub text: Option<String>,
}

impl ConnectorMessage {
    pub fn error(code: MessageErrorCode) -> Self {
        Self {
            category: MessageCategory::Error,
            code,
            text: None,
        }
    }

    pub fn error_with_text(code: MessageErrorCode, text: impl Into<String>) -> Self {
        Self {
            category: MessageCategory::Error,
            code,
            text: Some(text.into()),
        }
    }
}

/// Envelope every connector call answers with.
///
/// A response may carry a payload, errors, or both: a failed authentication
/// attempt that the bank allows to be retried comes back with the attempt
/// payload and the error messages describing the failure.
#[derive(Clone, Debug)]
pub struct ConnectorResponse<T> {
    pub payload: Option<T>,
    pub errors: Vec<ConnectorMessage>,
}

impl<T> ConnectorResponse<T> {
    pub fn success(payload: T) -> Self {
        Self {
            payload: Some(payload),
            errors: Vec::new(),
        }
    }

    pub fn failure(errors: Vec<ConnectorMessage>) -> Self {
        Self {
            payload: None,
            errors,
        }
    }

    pub fn failure_with_payload(payload: T, errors: Vec<ConnectorMessage>) -> Self {
        Self {
            payload: Some(payload),
            errors,
        }
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_successful(&self) -> bool {
        self.payload.is_some() && self.errors.is_empty()
    }
}

/// Password material never leaves the engine unmasked.
pub type PsuPassword = Secret<String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_psu_data_is_detected() {
        assert!(PsuIdData::default().is_empty());
        assert!(!PsuIdData::new("anton.brueckner").is_empty());
    }

    #[test]
    fn authorisation_code_result_without_method_or_challenge_is_empty() {
        assert!(AuthorisationCodeResult::default().is_empty());

        let with_challenge = AuthorisationCodeResult {
            challenge_data: Some(ChallengeData {
                data: vec!["enter the code shown".to_string()],
                ..ChallengeData::default()
            }),
            ..AuthorisationCodeResult::default()
        };
        assert!(!with_challenge.is_empty());
    }

    #[test]
    fn attempt_failure_envelope_carries_payload_and_errors() {
        let response = ConnectorResponse::failure_with_payload(
            PsuAuthorisationResponse {
                status: AuthorisationStatus::AttemptFailure,
                sca_exempted: false,
            },
            vec![ConnectorMessage::error(
                MessageErrorCode::PsuCredentialsInvalid,
            )],
        );
        assert!(response.has_error());
        assert!(!response.is_successful());
        assert!(response.payload.is_some());
    }
}
