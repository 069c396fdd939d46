//! Request and response shapes of one authorisation-update step.

use common_enums::{PaymentType, ScaApproach, ScaStatus};
use sca_interfaces::types::{
    AuthenticationObject, ChallengeData, CurrencyConversionInfo, PsuIdData, PsuPassword,
};

use crate::{authorisation::Authorisation, errors::ErrorHolder};

/// What the TPP sent in the PUT on the authorisation sub-resource.
#[derive(Clone, Debug)]
pub struct UpdateAuthorisationRequest {
    /// Id of the consent or payment being authorised.
    pub business_object_id: String,
    pub authorisation_id: String,
    pub psu_data: PsuIdData,
    pub password: Option<PsuPassword>,
    /// The TPP only (re)identified the PSU, no credentials were sent.
    pub update_psu_identification: bool,
    pub authentication_method_id: Option<String>,
    pub sca_authentication_data: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub payment_product: Option<String>,
}

/// One step handed to a processor: the stored authorisation plus the update
/// that arrived for it.
#[derive(Clone, Debug)]
pub struct AuthorisationProcessorRequest {
    pub sca_approach: ScaApproach,
    pub sca_status: ScaStatus,
    pub update_request: UpdateAuthorisationRequest,
    pub authorisation: Authorisation,
}

/// Outcome of one processed step.
#[derive(Clone, Debug, Default)]
pub struct AuthorisationProcessorResponse {
    pub sca_status: Option<ScaStatus>,
    pub sca_approach: Option<ScaApproach>,
    pub business_object_id: String,
    pub authorisation_id: String,
    pub psu_data: Option<PsuIdData>,
    pub chosen_sca_method: Option<AuthenticationObject>,
    pub available_sca_methods: Option<Vec<AuthenticationObject>>,
    pub challenge_data: Option<ChallengeData>,
    pub psu_message: Option<String>,
    pub currency_conversion_info: Option<CurrencyConversionInfo>,
    pub error: Option<ErrorHolder>,
}

impl AuthorisationProcessorResponse {
    /// A successful step that moved the authorisation to `sca_status`.
    pub fn new(
        sca_status: ScaStatus,
        request: &AuthorisationProcessorRequest,
    ) -> Self {
        Self {
            sca_status: Some(sca_status),
            sca_approach: Some(request.sca_approach),
            business_object_id: request.update_request.business_object_id.clone(),
            authorisation_id: request.update_request.authorisation_id.clone(),
            psu_data: Some(request.update_request.psu_data.clone()),
            ..Self::default()
        }
    }

    /// A step that failed terminally: the authorisation moves to `FAILED`.
    pub fn failed(error: ErrorHolder, request: &AuthorisationProcessorRequest) -> Self {
        Self {
            error: Some(error),
            ..Self::new(ScaStatus::Failed, request)
        }
    }

    /// A rejected attempt the PSU may retry: the current status is kept and
    /// the error is reported alongside it.
    pub fn attempt_failure(error: ErrorHolder, request: &AuthorisationProcessorRequest) -> Self {
        Self {
            error: Some(error),
            ..Self::new(request.sca_status, request)
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }
}
