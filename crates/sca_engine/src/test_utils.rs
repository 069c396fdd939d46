//! Shared doubles and builders for processor tests.

use std::sync::Mutex;

use common_enums::{
    AuthenticationType, AuthorisationType, ConsentStatus, PaymentType, ScaApproach, ScaStatus,
    TransactionStatus,
};
use masking::Secret;
use sca_domain_models::{
    authorisation::Authorisation,
    consents::AccountConsent,
    payments::CommonPayment,
    processor::{AuthorisationProcessorRequest, UpdateAuthorisationRequest},
};
use sca_interfaces::{
    api::{
        AspspConsentDataProvider, AuthorisationConnector, ConsentConnector,
        PaymentAuthorisationConnector, PaymentCancellationConnector,
    },
    types::{
        AuthenticationObject, AuthorisationCodeResult, AuthorisationStatus,
        AvailableScaMethodsResponse, ChallengeData, ConnectorResponse, ContextData,
        CurrencyConversionInfo, DecoupledScaResponse, PaymentExecutionResponse,
        PsuAuthorisationResponse, PsuIdData, PsuPassword, StartAuthorisationResponse,
        VerifyScaAuthorisationResponse,
    },
};

pub const PSU_ID: &str = "anton.brueckner";
pub const CONSENT_ID: &str = "4b112130-6a96-4941-a220-2da8a4af2c65";
pub const PAYMENT_ID: &str = "pmt-6f1b9a2c";
pub const AUTHORISATION_ID: &str = "a8fc1f02-3639-4528-bd76-3e04d8889d29";

pub fn sca_method(id: &str, decoupled: bool) -> AuthenticationObject {
    AuthenticationObject {
        authentication_method_id: id.to_string(),
        authentication_type: if decoupled {
            AuthenticationType::PushOtp
        } else {
            AuthenticationType::SmsOtp
        },
        authentication_version: None,
        name: Some(id.to_string()),
        explanation: None,
        decoupled,
    }
}

pub fn challenge() -> ChallengeData {
    ChallengeData {
        data: vec!["enter the code sent to your phone".to_string()],
        otp_max_length: Some(6),
        ..ChallengeData::default()
    }
}

pub fn consent() -> AccountConsent {
    AccountConsent {
        consent_id: CONSENT_ID.to_string(),
        consent_status: ConsentStatus::Received,
        recurring_indicator: true,
        frequency_per_day: 4,
        valid_until: None,
        psu_id_data_list: vec![PsuIdData::new(PSU_ID)],
        multilevel_sca_required: false,
        tpp_authorisation_number: Some("PSDDE-FAKENCA-87B2AC".to_string()),
        instance_id: Some("bank1".to_string()),
    }
}

pub fn payment() -> CommonPayment {
    CommonPayment {
        payment_id: PAYMENT_ID.to_string(),
        payment_product: Some("sepa-credit-transfers".to_string()),
        payment_type: PaymentType::Single,
        transaction_status: TransactionStatus::Rcvd,
        psu_id_data_list: vec![PsuIdData::new(PSU_ID)],
        multilevel_sca_required: false,
    }
}

pub fn authorisation(
    parent_id: &str,
    authorisation_type: AuthorisationType,
    sca_status: ScaStatus,
) -> Authorisation {
    Authorisation {
        authorisation_id: AUTHORISATION_ID.to_string(),
        parent_id: parent_id.to_string(),
        authorisation_type,
        sca_status,
        chosen_sca_approach: None,
        psu_id_data: Some(PsuIdData::new(PSU_ID)),
        authentication_method_id: None,
        sca_authentication_data: None,
        authorisation_expiration_timestamp: None,
        redirect_url_expiration_timestamp: None,
    }
}

pub fn password() -> Option<PsuPassword> {
    Some(Secret::new("12345".to_string()))
}

pub fn processor_request(
    parent_id: &str,
    authorisation_type: AuthorisationType,
    sca_approach: ScaApproach,
    sca_status: ScaStatus,
) -> AuthorisationProcessorRequest {
    AuthorisationProcessorRequest {
        sca_approach,
        sca_status,
        update_request: UpdateAuthorisationRequest {
            business_object_id: parent_id.to_string(),
            authorisation_id: AUTHORISATION_ID.to_string(),
            psu_data: PsuIdData::new(PSU_ID),
            password: password(),
            update_psu_identification: false,
            authentication_method_id: None,
            sca_authentication_data: None,
            payment_type: None,
            payment_product: None,
        },
        authorisation: authorisation(parent_id, authorisation_type, sca_status),
    }
}

#[derive(Default)]
pub struct MockAspspDataProvider {
    data: Mutex<Vec<u8>>,
}

impl AspspConsentDataProvider for MockAspspDataProvider {
    fn load(&self) -> Vec<u8> {
        self.data.lock().expect("mock lock poisoned").clone()
    }

    fn store(&self, data: Vec<u8>) {
        *self.data.lock().expect("mock lock poisoned") = data;
    }
}

/// Programmable consent connector that records every call it receives.
pub struct MockConsentConnector {
    pub calls: Mutex<Vec<&'static str>>,
    pub start_authorisation_response: Mutex<ConnectorResponse<StartAuthorisationResponse>>,
    pub authorise_psu_response: Mutex<ConnectorResponse<PsuAuthorisationResponse>>,
    pub available_methods_response: Mutex<ConnectorResponse<AvailableScaMethodsResponse>>,
    pub authorisation_code_response: Mutex<ConnectorResponse<AuthorisationCodeResult>>,
    pub decoupled_response: Mutex<ConnectorResponse<DecoupledScaResponse>>,
    pub verify_response: Mutex<ConnectorResponse<VerifyScaAuthorisationResponse>>,
}

impl Default for MockConsentConnector {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            start_authorisation_response: Mutex::new(ConnectorResponse::success(
                StartAuthorisationResponse::default(),
            )),
            authorise_psu_response: Mutex::new(ConnectorResponse::success(
                PsuAuthorisationResponse {
                    status: AuthorisationStatus::Success,
                    sca_exempted: false,
                },
            )),
            available_methods_response: Mutex::new(ConnectorResponse::success(
                AvailableScaMethodsResponse {
                    available_sca_methods: vec![sca_method("sms", false)],
                    sca_exempted: false,
                },
            )),
            authorisation_code_response: Mutex::new(ConnectorResponse::success(
                AuthorisationCodeResult {
                    selected_sca_method: Some(sca_method("sms", false)),
                    challenge_data: Some(challenge()),
                    sca_exempted: false,
                },
            )),
            decoupled_response: Mutex::new(ConnectorResponse::success(
                DecoupledScaResponse::default(),
            )),
            verify_response: Mutex::new(ConnectorResponse::success(
                VerifyScaAuthorisationResponse {
                    consent_status: ConsentStatus::Valid,
                },
            )),
        }
    }
}

impl MockConsentConnector {
    fn record(&self, call: &'static str) {
        self.calls.lock().expect("mock lock poisoned").push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }

    pub fn set_authorise_psu(&self, response: ConnectorResponse<PsuAuthorisationResponse>) {
        *self.authorise_psu_response.lock().expect("mock lock poisoned") = response;
    }

    pub fn set_available_methods(
        &self,
        response: ConnectorResponse<AvailableScaMethodsResponse>,
    ) {
        *self
            .available_methods_response
            .lock()
            .expect("mock lock poisoned") = response;
    }

    pub fn set_authorisation_code(&self, response: ConnectorResponse<AuthorisationCodeResult>) {
        *self
            .authorisation_code_response
            .lock()
            .expect("mock lock poisoned") = response;
    }

    pub fn set_verify(&self, response: ConnectorResponse<VerifyScaAuthorisationResponse>) {
        *self.verify_response.lock().expect("mock lock poisoned") = response;
    }
}

#[async_trait::async_trait]
impl AuthorisationConnector for MockConsentConnector {
    type Subject = AccountConsent;

    async fn start_authorisation(
        &self,
        _ctx: &ContextData,
        _sca_approach: ScaApproach,
        _sca_status: ScaStatus,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<StartAuthorisationResponse> {
        self.record("start_authorisation");
        self.start_authorisation_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn authorise_psu(
        &self,
        _ctx: &ContextData,
        _psu_data: &PsuIdData,
        _password: Option<PsuPassword>,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PsuAuthorisationResponse> {
        self.record("authorise_psu");
        self.authorise_psu_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn request_available_sca_methods(
        &self,
        _ctx: &ContextData,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<AvailableScaMethodsResponse> {
        self.record("request_available_sca_methods");
        self.available_methods_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn request_authorisation_code(
        &self,
        _ctx: &ContextData,
        _authentication_method_id: &str,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<AuthorisationCodeResult> {
        self.record("request_authorisation_code");
        self.authorisation_code_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn start_sca_decoupled(
        &self,
        _ctx: &ContextData,
        _authorisation_id: &str,
        _authentication_method_id: Option<&str>,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<DecoupledScaResponse> {
        self.record("start_sca_decoupled");
        self.decoupled_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl ConsentConnector for MockConsentConnector {
    async fn verify_sca_authorisation(
        &self,
        _ctx: &ContextData,
        _sca_authentication_data: &str,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<VerifyScaAuthorisationResponse> {
        self.record("verify_sca_authorisation");
        self.verify_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }
}

/// Programmable payment connector covering initiation and cancellation.
pub struct MockPaymentConnector {
    pub calls: Mutex<Vec<&'static str>>,
    pub start_authorisation_response: Mutex<ConnectorResponse<StartAuthorisationResponse>>,
    pub authorise_psu_response: Mutex<ConnectorResponse<PsuAuthorisationResponse>>,
    pub available_methods_response: Mutex<ConnectorResponse<AvailableScaMethodsResponse>>,
    pub authorisation_code_response: Mutex<ConnectorResponse<AuthorisationCodeResult>>,
    pub decoupled_response: Mutex<ConnectorResponse<DecoupledScaResponse>>,
    pub verify_execute_response: Mutex<ConnectorResponse<PaymentExecutionResponse>>,
    pub execute_without_sca_response: Mutex<ConnectorResponse<PaymentExecutionResponse>>,
    pub currency_conversion_response: Mutex<ConnectorResponse<CurrencyConversionInfo>>,
    pub verify_cancel_response: Mutex<ConnectorResponse<PaymentExecutionResponse>>,
    pub cancel_without_sca_response: Mutex<ConnectorResponse<PaymentExecutionResponse>>,
}

impl Default for MockPaymentConnector {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            start_authorisation_response: Mutex::new(ConnectorResponse::success(
                StartAuthorisationResponse::default(),
            )),
            authorise_psu_response: Mutex::new(ConnectorResponse::success(
                PsuAuthorisationResponse {
                    status: AuthorisationStatus::Success,
                    sca_exempted: false,
                },
            )),
            available_methods_response: Mutex::new(ConnectorResponse::success(
                AvailableScaMethodsResponse {
                    available_sca_methods: vec![sca_method("sms", false)],
                    sca_exempted: false,
                },
            )),
            authorisation_code_response: Mutex::new(ConnectorResponse::success(
                AuthorisationCodeResult {
                    selected_sca_method: Some(sca_method("sms", false)),
                    challenge_data: Some(challenge()),
                    sca_exempted: false,
                },
            )),
            decoupled_response: Mutex::new(ConnectorResponse::success(
                DecoupledScaResponse::default(),
            )),
            verify_execute_response: Mutex::new(ConnectorResponse::success(
                PaymentExecutionResponse {
                    transaction_status: TransactionStatus::Acsc,
                },
            )),
            execute_without_sca_response: Mutex::new(ConnectorResponse::success(
                PaymentExecutionResponse {
                    transaction_status: TransactionStatus::Acsc,
                },
            )),
            currency_conversion_response: Mutex::new(ConnectorResponse::success(
                CurrencyConversionInfo::default(),
            )),
            verify_cancel_response: Mutex::new(ConnectorResponse::success(
                PaymentExecutionResponse {
                    transaction_status: TransactionStatus::Canc,
                },
            )),
            cancel_without_sca_response: Mutex::new(ConnectorResponse::success(
                PaymentExecutionResponse {
                    transaction_status: TransactionStatus::Canc,
                },
            )),
        }
    }
}

impl MockPaymentConnector {
    fn record(&self, call: &'static str) {
        self.calls.lock().expect("mock lock poisoned").push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }

    pub fn set_authorise_psu(&self, response: ConnectorResponse<PsuAuthorisationResponse>) {
        *self.authorise_psu_response.lock().expect("mock lock poisoned") = response;
    }

    pub fn set_available_methods(
        &self,
        response: ConnectorResponse<AvailableScaMethodsResponse>,
    ) {
        *self
            .available_methods_response
            .lock()
            .expect("mock lock poisoned") = response;
    }

    pub fn set_execute_without_sca(&self, response: ConnectorResponse<PaymentExecutionResponse>) {
        *self
            .execute_without_sca_response
            .lock()
            .expect("mock lock poisoned") = response;
    }

    pub fn set_verify_execute(&self, response: ConnectorResponse<PaymentExecutionResponse>) {
        *self
            .verify_execute_response
            .lock()
            .expect("mock lock poisoned") = response;
    }

    pub fn set_currency_conversion(&self, response: ConnectorResponse<CurrencyConversionInfo>) {
        *self
            .currency_conversion_response
            .lock()
            .expect("mock lock poisoned") = response;
    }
}

#[async_trait::async_trait]
impl AuthorisationConnector for MockPaymentConnector {
    type Subject = CommonPayment;

    async fn start_authorisation(
        &self,
        _ctx: &ContextData,
        _sca_approach: ScaApproach,
        _sca_status: ScaStatus,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<StartAuthorisationResponse> {
        self.record("start_authorisation");
        self.start_authorisation_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn authorise_psu(
        &self,
        _ctx: &ContextData,
        _psu_data: &PsuIdData,
        _password: Option<PsuPassword>,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PsuAuthorisationResponse> {
        self.record("authorise_psu");
        self.authorise_psu_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn request_available_sca_methods(
        &self,
        _ctx: &ContextData,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<AvailableScaMethodsResponse> {
        self.record("request_available_sca_methods");
        self.available_methods_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn request_authorisation_code(
        &self,
        _ctx: &ContextData,
        _authentication_method_id: &str,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<AuthorisationCodeResult> {
        self.record("request_authorisation_code");
        self.authorisation_code_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn start_sca_decoupled(
        &self,
        _ctx: &ContextData,
        _authorisation_id: &str,
        _authentication_method_id: Option<&str>,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<DecoupledScaResponse> {
        self.record("start_sca_decoupled");
        self.decoupled_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl PaymentAuthorisationConnector for MockPaymentConnector {
    async fn verify_sca_and_execute_payment(
        &self,
        _ctx: &ContextData,
        _sca_authentication_data: &str,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse> {
        self.record("verify_sca_and_execute_payment");
        self.verify_execute_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn execute_payment_without_sca(
        &self,
        _ctx: &ContextData,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse> {
        self.record("execute_payment_without_sca");
        self.execute_without_sca_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn get_currency_conversion_info(
        &self,
        _ctx: &ContextData,
        _authorisation_id: &str,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<CurrencyConversionInfo> {
        self.record("get_currency_conversion_info");
        self.currency_conversion_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }
}

#[async_trait::async_trait]
impl PaymentCancellationConnector for MockPaymentConnector {
    async fn verify_sca_and_cancel_payment(
        &self,
        _ctx: &ContextData,
        _sca_authentication_data: &str,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse> {
        self.record("verify_sca_and_cancel_payment");
        self.verify_cancel_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }

    async fn cancel_payment_without_sca(
        &self,
        _ctx: &ContextData,
        _subject: &Self::Subject,
        _consent_data: &dyn AspspConsentDataProvider,
    ) -> ConnectorResponse<PaymentExecutionResponse> {
        self.record("cancel_payment_without_sca");
        self.cancel_without_sca_response
            .lock()
            .expect("mock lock poisoned")
            .clone()
    }
}
