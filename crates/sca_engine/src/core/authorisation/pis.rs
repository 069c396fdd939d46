//! Payment-initiation (PIS) authorisation processing.

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
    api::{AspspConsentDataProvider, PaymentAuthorisationConnector},
    types::{AuthorisationStatus, CurrencyConversionInfo},
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

pub struct PisAuthorisationProcessorService<C>
where
    C: PaymentAuthorisationConnector<Subject = CommonPayment>,
{
    connector: Arc<C>,
    store: Arc<dyn StorageInterface>,
    consent_data: Arc<dyn AspspConsentDataProvider>,
    settings: AuthorisationSettings,
}

impl<C> PisAuthorisationProcessorService<C>
where
    C: PaymentAuthorisationConnector<Subject = CommonPayment>,
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

    fn psu_unknown(request: &AuthorisationProcessorRequest) -> AuthorisationProcessorResponse {
        AuthorisationProcessorResponse::failed(
            ErrorHolder::new(ErrorType::Pis401, MessageErrorCode::UnauthorizedNoPsu),
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
            && self.settings.credential_failure_pis == CredentialFailurePolicy::KeepStatus
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
            tracing::warn!(payment_id = %payment.payment_id, "PSU is not among the payment's PSUs");
            return Ok(Self::psu_unknown(request));
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
        if !payment.accepts_psu(&request.update_request.psu_data) {
            return Ok(Self::psu_unknown(request));
        }

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

        if payload.sca_exempted && self.settings.exemption_allowed_for(payment.payment_type) {
            return self
                .execute_without_sca(request, &payment, ScaStatus::Exempted)
                .await;
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
        let exempted =
            payload.sca_exempted && self.settings.exemption_allowed_for(payment.payment_type);

        match policy::decide(&payload.available_sca_methods, exempted) {
            ScaMethodDecision::Exempted => {
                self.execute_without_sca(request, payment, ScaStatus::Exempted)
                    .await
            }
            // A PSU without any SCA method cannot be challenged; the payment
            // is executed directly.
            ScaMethodDecision::NoScaMethods => {
                self.execute_without_sca(request, payment, ScaStatus::Finalised)
                    .await
            }
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
        if payload.sca_exempted && self.settings.exemption_allowed_for(payment.payment_type) {
            return self
                .execute_without_sca(request, payment, ScaStatus::Exempted)
                .await;
        }
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

    /// Executes the payment with no challenge and exits through
    /// `final_status` (`EXEMPTED` for a waiver, `FINALISED` when the PSU has
    /// no SCA method).
    async fn execute_without_sca(
        &self,
        request: &AuthorisationProcessorRequest,
        payment: &CommonPayment,
        final_status: ScaStatus,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let ctx = context_data(request);
        let response = self
            .connector
            .execute_payment_without_sca(&ctx, payment, self.consent_data.as_ref())
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Pis);
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let Some(payload) = response.payload else {
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Pis400, MessageErrorCode::FormatError),
                request,
            ));
        };
        self.persist_transaction_status(payment, payload.transaction_status)
            .await?;
        self.store
            .update_authorisation_status(&request.update_request.authorisation_id, final_status)
            .await
            .change_context(ProcessorError::StorageError)?;
        Ok(AuthorisationProcessorResponse::new(final_status, request))
    }

    async fn persist_transaction_status(
        &self,
        payment: &CommonPayment,
        transaction_status: TransactionStatus,
    ) -> ProcessorResult<()> {
        self.store
            .update_payment_status(&payment.payment_id, transaction_status)
            .await
            .change_context(ProcessorError::StorageError)?;
        if transaction_status == TransactionStatus::Patc && !payment.multilevel_sca_required {
            self.store
                .update_payment_multilevel_sca_required(&payment.payment_id, true)
                .await
                .change_context(ProcessorError::StorageError)?;
        }
        Ok(())
    }

    /// Conversion info is reported when the bank has it; its absence never
    /// fails a finalised payment.
    async fn currency_conversion_info(
        &self,
        request: &AuthorisationProcessorRequest,
        payment: &CommonPayment,
    ) -> Option<CurrencyConversionInfo> {
        let ctx = context_data(request);
        let response = self
            .connector
            .get_currency_conversion_info(
                &ctx,
                &request.update_request.authorisation_id,
                payment,
                self.consent_data.as_ref(),
            )
            .await;
        if response.has_error() {
            tracing::warn!(
                payment_id = %payment.payment_id,
                "currency conversion info unavailable",
            );
            return None;
        }
        response.payload
    }
}

#[async_trait::async_trait]
impl<C> AuthorisationProcessorService for PisAuthorisationProcessorService<C>
where
    C: PaymentAuthorisationConnector<Subject = CommonPayment>,
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
            .verify_sca_and_execute_payment(&ctx, &otp, &payment, self.consent_data.as_ref())
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
        let Some(payload) = response.payload else {
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Pis400, MessageErrorCode::FormatError),
                request,
            ));
        };

        self.persist_transaction_status(&payment, payload.transaction_status)
            .await?;
        self.store
            .update_authorisation_status(
                &request.update_request.authorisation_id,
                ScaStatus::Finalised,
            )
            .await
            .change_context(ProcessorError::StorageError)?;
        let mut out = AuthorisationProcessorResponse::new(ScaStatus::Finalised, request);
        out.currency_conversion_info = self.currency_conversion_info(request, &payment).await;
        Ok(out)
    }

    /// A finalised payment authorisation answers idempotently, re-fetching
    /// the conversion details so the answer stays complete.
    async fn do_sca_finalised(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let Some(payment) = self
            .find_payment(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::payment_unknown(request));
        };
        let mut out = AuthorisationProcessorResponse::new(ScaStatus::Finalised, request);
        out.currency_conversion_info = self.currency_conversion_info(request, &payment).await;
        Ok(out)
    }

    /// An exempted payment authorisation answers idempotently; the payment
    /// was already executed when the exemption was applied.
    async fn do_sca_exempted(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        Ok(AuthorisationProcessorResponse::new(
            ScaStatus::Exempted,
            request,
        ))
    }
}
