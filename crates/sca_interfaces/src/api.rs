//! Traits a bank (ASPSP) adapter implements.
//!
//! The engine is generic over the business object being authorised: consents
//! for AIS, payments for PIS. [`AuthorisationConnector::Subject`] carries that
//! object through every call without the adapter layer knowing its shape.

use common_enums::{ScaApproach, ScaStatus};

use crate::types::{
    AuthorisationCodeResult, AvailableScaMethodsResponse, ConnectorResponse, ContextData,
    CurrencyConversionInfo, DecoupledScaResponse, PaymentExecutionResponse, PsuAuthorisationResponse,
    PsuIdData, PsuPassword, StartAuthorisationResponse, VerifyScaAuthorisationResponse,
};

/// Access to the opaque blob a bank adapter persists between calls of one
/// authorisation.
pub trait AspspConsentDataProvider: Send + Sync {
    fn load(&self) -> Vec<u8>;
    fn store(&self, data: Vec<u8>);
}

/// Calls shared by every authorisation family.
#[async_trait::async_trait]
pub trait AuthorisationConnector: Send + Sync {
    /// The business object being authorised.
    type Subject: Send + Sync;

    /// Announces a new authorisation to the bank. The bank may override the
    /// approach and status the engine proposed.
    async fn start_authorisation(
        &self,
        ctx: &ContextData,
        sca_approach: ScaApproach,
        sca_status: ScaStatus,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<StartAuthorisationResponse>;

    /// Checks the PSU's credentials.
    async fn authorise_psu(
        &self,
        ctx: &ContextData,
        psu_data: &PsuIdData,
        password: Option<PsuPassword>,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PsuAuthorisationResponse>;

    /// Lists the SCA methods the bank offers this PSU.
    async fn request_available_sca_methods(
        &self,
        ctx: &ContextData,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<AvailableScaMethodsResponse>;

    /// Asks the bank to send a challenge for the chosen method.
    async fn request_authorisation_code(
        &self,
        ctx: &ContextData,
        authentication_method_id: &str,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<AuthorisationCodeResult>;

    /// Hands the flow over to the bank's own device for decoupled SCA.
    async fn start_sca_decoupled(
        &self,
        ctx: &ContextData,
        authorisation_id: &str,
        authentication_method_id: Option<&str>,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<DecoupledScaResponse>;
}

/// Adapter calls specific to account-information consents.
#[async_trait::async_trait]
pub trait ConsentConnector: AuthorisationConnector {
    /// Verifies the OTP and activates the consent on success.
    async fn verify_sca_authorisation(
        &self,
        ctx: &ContextData,
        sca_authentication_data: &str,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<VerifyScaAuthorisationResponse>;
}

/// Adapter calls specific to payment initiation.
#[async_trait::async_trait]
pub trait PaymentAuthorisationConnector: AuthorisationConnector {
    /// Verifies the OTP and executes the payment in one step.
    async fn verify_sca_and_execute_payment(
        &self,
        ctx: &ContextData,
        sca_authentication_data: &str,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse>;

    /// Executes the payment directly when SCA was waived.
    async fn execute_payment_without_sca(
        &self,
        ctx: &ContextData,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse>;

    /// Fetches conversion details reported alongside a settled payment.
    async fn get_currency_conversion_info(
        &self,
        ctx: &ContextData,
        authorisation_id: &str,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<CurrencyConversionInfo>;
}

/// Adapter calls specific to payment cancellation.
#[async_trait::async_trait]
pub trait PaymentCancellationConnector: AuthorisationConnector {
    /// Verifies the OTP and cancels the payment in one step.
    async fn verify_sca_and_cancel_payment(
        &self,
        ctx: &ContextData,
        sca_authentication_data: &str,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse>;

    /// Cancels the payment directly when no SCA is required.
    async fn cancel_payment_without_sca(
        &self,
        ctx: &ContextData,
        subject: &Self::Subject,
        consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse>;
}
