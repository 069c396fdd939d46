//! Consent (AIS) authorisation processing.

use std::sync::Arc;

use common_enums::{
    ConsentStatus, CredentialFailurePolicy, MessageErrorCode, ScaApproach, ScaStatus, ServiceKind,
};
use error_stack::ResultExt;
use sca_domain_models::{
    consents::{AccountConsent, TerminateOldConsentsRequest},
    errors::{ErrorHolder, ErrorType},
    processor::{AuthorisationProcessorRequest, AuthorisationProcessorResponse},
};
use sca_interfaces::{
    api::{AspspConsentDataProvider, ConsentConnector},
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
    db::{authorisation::AuthorisationInterface, consent::ConsentInterface, StorageInterface},
};

pub struct AisAuthorisationProcessorService<C>
where
    C: ConsentConnector<Subject = AccountConsent>,
{
    connector: Arc<C>,
    store: Arc<dyn StorageInterface>,
    consent_data: Arc<dyn AspspConsentDataProvider>,
    settings: AuthorisationSettings,
}

impl<C> AisAuthorisationProcessorService<C>
where
    C: ConsentConnector<Subject = AccountConsent>,
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

    async fn find_consent(&self, consent_id: &str) -> ProcessorResult<Option<AccountConsent>> {
        match self.store.find_consent_by_id(consent_id).await {
            Ok(consent) => Ok(Some(consent)),
            Err(report) if report.current_context().is_not_found() => Ok(None),
            Err(report) => Err(report.change_context(ProcessorError::StorageError)),
        }
    }

    fn consent_unknown(request: &AuthorisationProcessorRequest) -> AuthorisationProcessorResponse {
        AuthorisationProcessorResponse::failed(
            ErrorHolder::new(ErrorType::Ais400, MessageErrorCode::ConsentUnknown400),
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

    /// One-off, single-PSU consents can be activated straight after a
    /// successful credential check when the bank profile allows it.
    fn is_one_factor_authorisation(&self, consent: &AccountConsent) -> bool {
        self.settings.one_factor_one_off_consents
            && !consent.recurring_indicator
            && !consent.multilevel_sca_required
    }

    async fn handle_credential_failure(
        &self,
        error: ErrorHolder,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        if transformers::is_credential_failure(&error)
            && self.settings.credential_failure_ais == CredentialFailurePolicy::KeepStatus
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
            tracing::warn!("identification update without any PSU data");
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Ais400, MessageErrorCode::FormatErrorNoPsu),
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
        let Some(consent) = self
            .find_consent(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::consent_unknown(request));
        };

        let ctx = context_data(request);
        let response = self
            .connector
            .authorise_psu(
                &ctx,
                &request.update_request.psu_data,
                request.update_request.password.clone(),
                &consent,
                self.consent_data.as_ref(),
            )
            .await;

        if transformers::is_attempt_failure(&response) {
            return Ok(AuthorisationProcessorResponse::attempt_failure(
                transformers::to_error_holder(&response.errors, ServiceKind::Ais),
                request,
            ));
        }
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Ais);
            return self.handle_credential_failure(error, request).await;
        }
        let Some(payload) = response.payload else {
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Ais400, MessageErrorCode::FormatError),
                request,
            ));
        };
        if payload.status == AuthorisationStatus::Failure {
            let error = ErrorHolder::new(ErrorType::Ais401, MessageErrorCode::PsuCredentialsInvalid);
            return self.handle_credential_failure(error, request).await;
        }

        if payload.sca_exempted {
            return self.apply_exemption(request, &consent).await;
        }

        if self.is_one_factor_authorisation(&consent) {
            self.store
                .update_consent_status(&consent.consent_id, ConsentStatus::Valid)
                .await
                .change_context(ProcessorError::StorageError)?;
            self.store
                .update_authorisation_status(
                    &request.update_request.authorisation_id,
                    ScaStatus::Finalised,
                )
                .await
                .change_context(ProcessorError::StorageError)?;
            return Ok(AuthorisationProcessorResponse::new(
                ScaStatus::Finalised,
                request,
            ));
        }

        if request.sca_approach == ScaApproach::Decoupled {
            return decoupled::proceed_decoupled(
                self.connector.as_ref(),
                self.store.as_ref(),
                &self.settings,
                ServiceKind::Ais,
                request,
                &consent,
                self.consent_data.as_ref(),
                None,
            )
            .await;
        }

        self.handle_sca_methods(request, &consent).await
    }

    async fn handle_sca_methods(
        &self,
        request: &AuthorisationProcessorRequest,
        consent: &AccountConsent,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let ctx = context_data(request);
        let authorisation_id = request.update_request.authorisation_id.as_str();
        let response = self
            .connector
            .request_available_sca_methods(&ctx, consent, self.consent_data.as_ref())
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Ais);
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let payload = response.payload.unwrap_or_default();

        match policy::decide(&payload.available_sca_methods, payload.sca_exempted) {
            ScaMethodDecision::Exempted => self.apply_exemption(request, consent).await,
            ScaMethodDecision::NoScaMethods => {
                tracing::warn!(consent_id = %consent.consent_id, "no SCA method available for the PSU");
                self.store
                    .update_consent_status(&consent.consent_id, ConsentStatus::Rejected)
                    .await
                    .change_context(ProcessorError::StorageError)?;
                self.fail_authorisation(request).await?;
                Ok(AuthorisationProcessorResponse::failed(
                    ErrorHolder::new(ErrorType::Ais400, MessageErrorCode::ScaMethodUnknown),
                    request,
                ))
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
                        ServiceKind::Ais,
                        request,
                        consent,
                        self.consent_data.as_ref(),
                        Some(method),
                    )
                    .await
                } else {
                    let method = method.clone();
                    self.request_authorisation_code(
                        request,
                        consent,
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
        consent: &AccountConsent,
        authentication_method_id: &str,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let ctx = context_data(request);
        let response = self
            .connector
            .request_authorisation_code(
                &ctx,
                authentication_method_id,
                consent,
                self.consent_data.as_ref(),
            )
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Ais);
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let payload = response.payload.unwrap_or_default();
        if payload.sca_exempted {
            return self.apply_exemption(request, consent).await;
        }
        if payload.is_empty() {
            self.fail_authorisation(request).await?;
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Ais400, MessageErrorCode::FormatError),
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

    /// The bank waived SCA: the consent becomes usable and the authorisation
    /// exits through `EXEMPTED`.
    async fn apply_exemption(
        &self,
        request: &AuthorisationProcessorRequest,
        consent: &AccountConsent,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        tracing::info!(consent_id = %consent.consent_id, "SCA exemption applied to consent");
        self.store
            .update_consent_status(&consent.consent_id, ConsentStatus::Valid)
            .await
            .change_context(ProcessorError::StorageError)?;
        self.store
            .update_authorisation_status(
                &request.update_request.authorisation_id,
                ScaStatus::Exempted,
            )
            .await
            .change_context(ProcessorError::StorageError)?;
        Ok(AuthorisationProcessorResponse::new(
            ScaStatus::Exempted,
            request,
        ))
    }
}

#[async_trait::async_trait]
impl<C> AuthorisationProcessorService for AisAuthorisationProcessorService<C>
where
    C: ConsentConnector<Subject = AccountConsent>,
{
    fn service_kind(&self) -> ServiceKind {
        ServiceKind::Ais
    }

    fn store(&self) -> &dyn StorageInterface {
        self.store.as_ref()
    }

    async fn do_sca_started(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let Some(consent) = self
            .find_consent(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::consent_unknown(request));
        };
        let ctx = context_data(request);
        let response = self
            .connector
            .start_authorisation(
                &ctx,
                request.sca_approach,
                request.sca_status,
                &consent,
                self.consent_data.as_ref(),
            )
            .await;
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Ais);
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
                ErrorHolder::new(ErrorType::Ais400, MessageErrorCode::FormatError),
                request,
            ));
        };
        let Some(consent) = self
            .find_consent(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::consent_unknown(request));
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
                ServiceKind::Ais,
                request,
                &consent,
                self.consent_data.as_ref(),
                None,
            )
            .await;
        }
        self.request_authorisation_code(request, &consent, &method_id)
            .await
    }

    async fn do_sca_method_selected(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let Some(consent) = self
            .find_consent(&request.update_request.business_object_id)
            .await?
        else {
            return Ok(Self::consent_unknown(request));
        };
        let ctx = context_data(request);
        let otp = request
            .update_request
            .sca_authentication_data
            .clone()
            .unwrap_or_default();
        let response = self
            .connector
            .verify_sca_authorisation(&ctx, &otp, &consent, self.consent_data.as_ref())
            .await;

        if transformers::is_attempt_failure(&response) {
            return Ok(AuthorisationProcessorResponse::attempt_failure(
                transformers::to_error_holder(&response.errors, ServiceKind::Ais),
                request,
            ));
        }
        if response.has_error() {
            let error = transformers::to_error_holder(&response.errors, ServiceKind::Ais);
            if transformers::is_credential_failure(&error) {
                self.fail_authorisation(request).await?;
            }
            return Ok(AuthorisationProcessorResponse::failed(error, request));
        }
        let Some(payload) = response.payload else {
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(ErrorType::Ais400, MessageErrorCode::FormatError),
                request,
            ));
        };

        let consent_status = payload.consent_status;
        if consent_status == ConsentStatus::PartiallyAuthorised && !consent.multilevel_sca_required
        {
            self.store
                .update_consent_multilevel_sca_required(&consent.consent_id, true)
                .await
                .change_context(ProcessorError::StorageError)?;
        }
        self.store
            .update_consent_status(&consent.consent_id, consent_status)
            .await
            .change_context(ProcessorError::StorageError)?;
        let terminated = self
            .store
            .find_and_terminate_old_consents(
                &consent.consent_id,
                TerminateOldConsentsRequest::from_consent(&consent),
            )
            .await
            .change_context(ProcessorError::StorageError)?;
        if terminated > 0 {
            tracing::info!(
                consent_id = %consent.consent_id,
                terminated,
                "superseded consents terminated",
            );
        }
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

    /// An exempted consent authorisation answers idempotently.
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
