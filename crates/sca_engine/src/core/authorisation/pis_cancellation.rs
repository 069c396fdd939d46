//! Payment-cancellation authorisation processing.
//!
//! Cancellation never honours an SCA exemption: a payment that is being
//! cancelled either passes SCA or, when the PSU has no method at all, is
//! cancelled directly.

use std::sync::Arc;

use common_enums::{
    CredentialFailurePolicy, MessageErrorCode, ScaApproach, ScaStatus, ServiceKind,
    TransactionStatus,
};
use error_stack::ResultExt;
use sca_domain_models::{
    errors::{ErrorHolder, ErrorType},
    payments::CommonPayment,
    processor::{AuthorisationProcessorRequest, AuthorisationProcessorResponse},
};
use sca_interfaces::{
    api::{AspspConsentDataProvider, PaymentCancellationConnector},
    types::AuthorisationStatus,
};

use crate::{
    configs::settings::AuthorisationSettings,
    core::{
        authorisation::{
            context_data, decoupled,
            policy::{self, ScaMethodDecision},
            transformers, AuthorisationProcessorService,
        },
        errors::{ProcessorError, ProcessorResult},
    },
    db::{authorisation::AuthorisationInterface, payment::PaymentInterface, StorageInterface},
};

pub struct PisCancellationAuthorisationProcessorService<C>
where
    C: PaymentCancellationConnector<Subject = CommonPayment>,
{
    connector: Arc<C>,
    store: Arc<dyn StorageInterface>,
    consent_data: Arc<dyn AspspConsentDataProvider>,
    settings: AuthorisationSettings,
}

impl<C> PisCancellationAuthorisationProcessorService<C>
where
    C: PaymentCancellationConnector<Subject = CommonPayment>,
{
    pub fn new(
        connector: Arc<C>,
        store: Arc<dyn StorageInterface>,
        consent_data: Arc<dyn AspspConsentDataProvider>,
        settings: AuthorisationSettings,
    ) -> Self {
        Self {
            connector,
            store,
            consent_data,
            settings,
        }
    }

    async fn find_payment(&self, payment_id: &str) -> ProcessorResult<Option<CommonPayment>> {
        match self.store.find_payment_by_id(payment_id).await {
            Ok(payment) => Ok(Some(payment)),
            Err(report) if report.current_context().is_not_found() => Ok(None),
            Err(report) => Err(report.change_context(ProcessorError::StorageError)),
        }
    }

    fn payment_unknown(request: &AuthorisationProcessorRequest) -> AuthorisationProcessorResponse {
        AuthorisationProcessorResponse::failed(
            ErrorHolder::new(ErrorType::Pis404, MessageErrorCode::ResourceUnknown404),
            request,
        )
    }

    async fn fail_authorisation(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<()> {
        self.store
            .update_authorisation_status(&request.update_request.authorisation_id, ScaStatus::Failed)
            .await
            .change_context(ProcessorError::StorageError)
    }

    async fn handle_credential_failure(
        &self,
        error: ErrorHolder,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        if transformers::is_credential_failure(&error)
            && self.settings.credential_failure_pis_cancellation
                == CredentialFailurePolicy::KeepStatus
        {
            return Ok(AuthorisationProcessorResponse::attempt_failure(
                error, request,
            ));
        }
        self.fail_authorisation(request).await?;
        Ok(AuthorisationProcessorResponse::failed(error, request))
    }

    async fn apply_identification(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        if request.update_request.psu_data.is_empty() {
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Pis400, MessageErrorCode::FormatErrorNoPsu),
                request,
            ));
        }
        let Some(payment) = self
            .find_payment(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::payment_unknown(request));
        };
        if !payment.accepts_psu(&request.update_request.psu_data) {
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Pis401, MessageErrorCode::UnauthorizedNoPsu),
                request,
            ));
        }
        self.store
            .update_authorisation_status(
                &request.update_request.authorisation_id,
                ScaStatus::PsuIdentified,
            )
            .await
            .change_context(ProcessorError::StorageError)?;
        Ok(AuthorisationProcessorResponse::new(
            ScaStatus::PsuIdentified,
            request,
        ))
    }

    async fn apply_authorisation(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let Some(payment) = self
            .find_payment(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::payment_unknown(request));
        };

        let ctx = context_data(request);
        let response = self
            .connector
            .authorise_psu(
                &ctx,
                &request.update_request.psu_data,
                request.update_request.password.clone(),
                &payment,
                self.consent_data.as_ref(),
            )
            .await;

        if transformers::is_attempt_failure(&response) {
            return Ok(AuthorisationProcessorResponse::attempt_failure(
                transformers::to_error_holder(&response.errors, ServiceKind::Pis),
                request,
            ));
        }
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Pis);
            return self.handle_credential_failure(error, request).await;
        }
        let Some(payload) = response.payload else {
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Pis400, MessageErrorCode::FormatError),
                request,
            ));
        };
        if payload.status == AuthorisationStatus::Failure {
            let error = ErrorHolder::new(ErrorType::Pis401, MessageErrorCode::PsuCredentialsInvalid);
            return self.handle_credential_failure(error, request).await;
        }

        if request.sca_approach == ScaApproach::Decoupled {
            return decoupled::proceed_decoupled(
                self.connector.as_ref(),
                self.store.as_ref(),
                &self.settings,
                ServiceKind::Pis,
                request,
                &payment,
                self.consent_data.as_ref(),
                None,
            )
            .await;
        }

        self.handle_sca_methods(request, &payment).await
    }

    async fn handle_sca_methods(
        &self,
        request: &AuthorisationProcessorRequest,
        payment: &CommonPayment,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let ctx = context_data(request);
        let authorisation_id = request.update_request.authorisation_id.as_str();
        let response = self
            .connector
            .request_available_sca_methods(&ctx, payment, self.consent_data.as_ref())
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Pis);
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let payload = response.payload.unwrap_or_default();

        match policy::decide(&payload.available_sca_methods, false) {
            ScaMethodDecision::Exempted => unreachable!("exemption is disabled for cancellation"),
            ScaMethodDecision::NoScaMethods => self.cancel_without_sca(request, payment).await,
            ScaMethodDecision::Single { method, decoupled } => {
                self.store
                    .save_authentication_methods(
                        authorisation_id,
                        payload.available_sca_methods.clone(),
                    )
                    .await
                    .change_context(ProcessorError::StorageError)?;
                if decoupled {
                    self.store
                        .update_sca_approach(authorisation_id, ScaApproach::Decoupled)
                        .await
                        .change_context(ProcessorError::StorageError)?;
                    decoupled::proceed_decoupled(
                        self.connector.as_ref(),
                        self.store.as_ref(),
                        &self.settings,
                        ServiceKind::Pis,
                        request,
                        payment,
                        self.consent_data.as_ref(),
                        Some(method),
                    )
                    .await
                } else {
                    let method = method.clone();
                    self.request_authorisation_code(
                        request,
                        payment,
                        &method.authentication_method_id,
                    )
                    .await
                }
            }
            ScaMethodDecision::Multiple(methods) => {
                self.store
                    .save_authentication_methods(authorisation_id, methods.to_vec())
                    .await
                    .change_context(ProcessorError::StorageError)?;
                self.store
                    .update_authorisation_status(authorisation_id, ScaStatus::PsuAuthenticated)
                    .await
                    .change_context(ProcessorError::StorageError)?;
                let mut out =
                    AuthorisationProcessorResponse::new(ScaStatus::PsuAuthenticated, request);
                out.available_sca_methods = Some(methods.to_vec());
                Ok(out)
            }
        }
    }

    async fn request_authorisation_code(
        &self,
        request: &AuthorisationProcessorRequest,
        payment: &CommonPayment,
        authentication_method_id: &str,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let ctx = context_data(request);
        let response = self
            .connector
            .request_authorisation_code(
                &ctx,
                authentication_method_id,
                payment,
                self.consent_data.as_ref(),
            )
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Pis);
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let payload = response.payload.unwrap_or_default();
        if payload.is_empty() {
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Pis400, MessageErrorCode::FormatError),
                request,
            ));
        }
        self.store
            .update_authorisation_status(
                &request.update_request.authorisation_id,
                ScaStatus::ScaMethodSelected,
            )
            .await
            .change_context(ProcessorError::StorageError)?;
        let mut out = AuthorisationProcessorResponse::new(ScaStatus::ScaMethodSelected, request);
        out.chosen_sca_method = payload.selected_sca_method;
        out.challenge_data = payload.challenge_data;
        Ok(out)
    }

    async fn cancel_without_sca(
        &self,
        request: &AuthorisationProcessorRequest,
        payment: &CommonPayment,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let ctx = context_data(request);
        let response = self
            .connector
            .cancel_payment_without_sca(&ctx, payment, self.consent_data.as_ref())
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Pis);
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let transaction_status = response
            .payload
            .map_or(TransactionStatus::Canc, |payload| {
                payload.transaction_status
            });
        self.store
            .update_payment_status(&payment.payment_id, transaction_status)
            .await
            .change_context(ProcessorError::StorageError)?;
        self.store
            .update_authorisation_status(
                &request.update_request.authorisation_id,
                ScaStatus::Finalised,
            )
            .await
            .change_context(ProcessorError::StorageError)?;
        Ok(AuthorisationProcessorResponse::new(
            ScaStatus::Finalised,
            request,
        ))
    }
}

#[async_trait::async_trait]
impl<C> AuthorisationProcessorService for PisCancellationAuthorisationProcessorService<C>
where
    C: PaymentCancellationConnector<Subject = CommonPayment>,
{
    fn service_kind(&self) -> ServiceKind {
        ServiceKind::Pis
    }

    fn store(&self) -> &dyn StorageInterface {
        self.store.as_ref()
    }

    async fn do_sca_started(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let Some(payment) = self
            .find_payment(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::payment_unknown(request));
        };
        let ctx = context_data(request);
        let response = self
            .connector
            .start_authorisation(
                &ctx,
                request.sca_approach,
                request.sca_status,
                &payment,
                self.consent_data.as_ref(),
            )
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Pis);
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let payload = response.payload.unwrap_or_default();
        let sca_status = payload.sca_status.unwrap_or(ScaStatus::Received);
        if let Some(approach) = payload.sca_approach {
            if approach != request.sca_approach {
                self.store
                    .update_sca_approach(&request.update_request.authorisation_id, approach)
                    .await
                    .change_context(ProcessorError::StorageError)?;
            }
        }
        self.store
            .update_authorisation_status(&request.update_request.authorisation_id, sca_status)
            .await
            .change_context(ProcessorError::StorageError)?;
        let mut out = AuthorisationProcessorResponse::new(sca_status, request);
        out.sca_approach = payload.sca_approach.or(Some(request.sca_approach));
        out.psu_message = payload.psu_message;
        Ok(out)
    }

    async fn do_sca_received(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        if request.update_request.update_psu_identification {
            self.apply_identification(request).await
        } else {
            self.apply_authorisation(request).await
        }
    }

    async fn do_sca_psu_identified(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        self.do_sca_received(request).await
    }

    async fn do_sca_psu_authenticated(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let Some(method_id) = request.update_request.authentication_method_id.clone() else {
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Pis400, MessageErrorCode::FormatError),
                request,
            ));
        };
        let Some(payment) = self
            .find_payment(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::payment_unknown(request));
        };
        let authorisation_id = request.update_request.authorisation_id.as_str();
        if self
            .store
            .is_authentication_method_decoupled(authorisation_id, &method_id)
            .await
            .change_context(ProcessorError::StorageError)?
        {
            self.store
                .update_sca_approach(authorisation_id, ScaApproach::Decoupled)
                .await
                .change_context(ProcessorError::StorageError)?;
            return decoupled::proceed_decoupled(
                self.connector.as_ref(),
                self.store.as_ref(),
                &self.settings,
                ServiceKind::Pis,
                request,
                &payment,
                self.consent_data.as_ref(),
                None,
            )
            .await;
        }
        self.request_authorisation_code(request, &payment, &method_id)
            .await
    }

    async fn do_sca_method_selected(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let Some(payment) = self
            .find_payment(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::payment_unknown(request));
        };
        let ctx = context_data(request);
        let otp = request
            .update_request
            .sca_authentication_data
            .clone()
            .unwrap_or_default();
        let response = self
            .connector
            .verify_sca_and_cancel_payment(&ctx, &otp, &payment, self.consent_data.as_ref())
            .await;

        if transformers::is_attempt_failure(&response) {
            return Ok(AuthorisationProcessorResponse::attempt_failure(
                transformers::to_error_holder(&response.errors, ServiceKind::Pis),
                request,
            ));
        }
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Pis);
            if transformers::is_credential_failure(&error) {
                self.fail_authorisation(request).await?;
            }
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let transaction_status = response
            .payload
            .map_or(TransactionStatus::Canc, |payload| {
                payload.transaction_status
            });
        self.store
            .update_payment_status(&payment.payment_id, transaction_status)
            .await
            .change_context(ProcessorError::StorageError)?;
        self.store
            .update_authorisation_status(
                &request.update_request.authorisation_id,
                ScaStatus::Finalised,
            )
            .await
            .change_context(ProcessorError::StorageError)?;
        Ok(AuthorisationProcessorResponse::new(
            ScaStatus::Finalised,
            request,
        ))
    }

    /// Cancellation has no exemption path.
    async fn do_sca_exempted(
        &self,
        _request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        Err(error_stack::report!(ProcessorError::UnsupportedScaStatus(
            ScaStatus::Exempted
        )))
    }
}

#[cfg(test)]
mod tests {
    use common_enums::AuthorisationType;
    use sca_interfaces::types::{AvailableScaMethodsResponse, ConnectorResponse};

    use super::*;
    use crate::{
        db::MockDb,
        test_utils::{
            self, payment, processor_request, MockAspspDataProvider, MockPaymentConnector,
            AUTHORISATION_ID, PAYMENT_ID,
        },
    };

    fn service(
        connector: Arc<MockPaymentConnector>,
        store: Arc<MockDb>,
    ) -> PisCancellationAuthorisationProcessorService<MockPaymentConnector> {
        PisCancellationAuthorisationProcessorService::new(
            connector,
            store,
            Arc::new(MockAspspDataProvider::default()),
            AuthorisationSettings::default(),
        )
    }

    async fn seed(store: &MockDb, sca_status: ScaStatus) {
        store.insert_payment(payment()).await.unwrap();
        store
            .insert_authorisation(test_utils::authorisation(
                PAYMENT_ID,
                AuthorisationType::PisCancellation,
                sca_status,
            ))
            .await
            .unwrap();
    }

    fn request(sca_status: ScaStatus) -> AuthorisationProcessorRequest {
        processor_request(
            PAYMENT_ID,
            AuthorisationType::PisCancellation,
            ScaApproach::Embedded,
            sca_status,
        )
    }

    #[tokio::test]
    async fn verify_cancels_the_payment_and_finalises() {
        let connector = Arc::new(MockPaymentConnector::default());
        let store = Arc::new(MockDb::new());
        seed(&store, ScaStatus::ScaMethodSelected).await;
        let service = service(Arc::clone(&connector), Arc::clone(&store));

        let mut request = request(ScaStatus::ScaMethodSelected);
        request.update_request.sca_authentication_data = Some("123456".to_string());
        let response = service.update_authorisation(&request).await.unwrap();

        assert_eq!(response.sca_status, Some(ScaStatus::Finalised));
        assert!(connector.calls().contains(&"verify_sca_and_cancel_payment"));
        let stored_payment = store.find_payment_by_id(PAYMENT_ID).await.unwrap();
        assert_eq!(stored_payment.transaction_status, TransactionStatus::Canc);
        let stored_auth = store
            .find_authorisation_by_id(AUTHORISATION_ID)
            .await
            .unwrap();
        assert_eq!(stored_auth.sca_status, ScaStatus::Finalised);
    }

    #[tokio::test]
    async fn psu_without_sca_methods_cancels_directly() {
        let connector = Arc::new(MockPaymentConnector::default());
        connector.set_available_methods(ConnectorResponse::success(
            AvailableScaMethodsResponse::default(),
        ));
        let store = Arc::new(MockDb::new());
        seed(&store, ScaStatus::Received).await;
        let service = service(Arc::clone(&connector), Arc::clone(&store));

        let response = service
            .update_authorisation(&request(ScaStatus::Received))
            .await
            .unwrap();

        assert_eq!(response.sca_status, Some(ScaStatus::Finalised));
        assert!(connector.calls().contains(&"cancel_payment_without_sca"));
        let stored_payment = store.find_payment_by_id(PAYMENT_ID).await.unwrap();
        assert_eq!(stored_payment.transaction_status, TransactionStatus::Canc);
    }

    #[tokio::test]
    async fn exemption_flag_is_ignored_for_cancellation() {
        let connector = Arc::new(MockPaymentConnector::default());
        *connector.authorise_psu_response.lock().unwrap() =
            ConnectorResponse::success(sca_interfaces::types::PsuAuthorisationResponse {
                status: AuthorisationStatus::Success,
                sca_exempted: true,
            });
        let store = Arc::new(MockDb::new());
        seed(&store, ScaStatus::Received).await;
        let service = service(Arc::clone(&connector), Arc::clone(&store));

        let response = service
            .update_authorisation(&request(ScaStatus::Received))
            .await
            .unwrap();

        assert_eq!(response.sca_status, Some(ScaStatus::ScaMethodSelected));
        let calls = connector.calls();
        assert!(calls.contains(&"request_available_sca_methods"));
        assert!(!calls.contains(&"cancel_payment_without_sca"));
        assert!(!calls.contains(&"execute_payment_without_sca"));
    }

    #[tokio::test]
    async fn exempted_status_is_unsupported() {
        let connector = Arc::new(MockPaymentConnector::default());
        let store = Arc::new(MockDb::new());
        seed(&store, ScaStatus::Exempted).await;
        let service = service(Arc::clone(&connector), Arc::clone(&store));

        let result = service
            .update_authorisation(&request(ScaStatus::Exempted))
            .await;
        let report = result.unwrap_err();
        assert!(matches!(
            report.current_context(),
            ProcessorError::UnsupportedScaStatus(ScaStatus::Exempted)
        ));
    }
}
