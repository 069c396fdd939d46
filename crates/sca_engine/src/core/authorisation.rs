//! The authorisation processors.
//!
//! One processor per authorisation family. Each implements
//! [`AuthorisationProcessorService`], which routes an incoming update to the
//! handler for the authorisation's current SCA status.

pub mod ais;
pub mod decoupled;
pub mod dispatcher;
pub mod pis;
pub mod pis_cancellation;
pub mod policy;
pub mod transformers;

use common_enums::{MessageErrorCode, ScaStatus, ServiceKind, StatusClass};
use common_utils::{date_time, generate_id_with_default_len};
use error_stack::ResultExt;
use sca_domain_models::{
    errors::{ErrorHolder, ErrorType},
    processor::{AuthorisationProcessorRequest, AuthorisationProcessorResponse},
};
use sca_interfaces::types::ContextData;

use crate::{
    core::errors::{ProcessorError, ProcessorResult},
    db::StorageInterface,
};

/// Builds the per-call context handed to every connector method.
pub(crate) fn context_data(request: &AuthorisationProcessorRequest) -> ContextData {
    ContextData {
        request_id: generate_id_with_default_len("req"),
        psu_data: request.update_request.psu_data.clone(),
    }
}

/// Family-specific processing of one authorisation update.
///
/// `update_authorisation` is the single entry point: it rejects expired
/// authorisations up front, then hands the request to the handler matching
/// the current SCA status. Terminal statuses answer idempotently without
/// touching the bank; `FAILED` stays unsupported in every family.
#[async_trait::async_trait]
pub trait AuthorisationProcessorService: Send + Sync {
    fn service_kind(&self) -> ServiceKind;
    fn store(&self) -> &dyn StorageInterface;

    async fn update_authorisation(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        if request.authorisation.is_expired(date_time::now()) {
            tracing::warn!(
                authorisation_id = %request.update_request.authorisation_id,
                "authorisation is past its expiration timestamp",
            );
            self.store()
                .update_authorisation_status(
                    &request.update_request.authorisation_id,
                    ScaStatus::Failed,
                )
                .await
                .change_context(ProcessorError::StorageError)?;
            return Ok(AuthorisationProcessorResponse::failed(
                ErrorHolder::new(
                    ErrorType::of(self.service_kind(), StatusClass::Forbidden),
                    MessageErrorCode::ResourceExpired403,
                ),
                request,
            ));
        }
        self.process(request).await
    }

    async fn process(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        tracing::info!(
            authorisation_id = %request.update_request.authorisation_id,
            sca_status = %request.sca_status,
            sca_approach = %request.sca_approach,
            "processing authorisation update",
        );
        match request.sca_status {
            ScaStatus::Started => self.do_sca_started(request).await,
            ScaStatus::Received => self.do_sca_received(request).await,
            ScaStatus::PsuIdentified => self.do_sca_psu_identified(request).await,
            ScaStatus::PsuAuthenticated => self.do_sca_psu_authenticated(request).await,
            ScaStatus::ScaMethodSelected => self.do_sca_method_selected(request).await,
            ScaStatus::Finalised => self.do_sca_finalised(request).await,
            ScaStatus::Failed => self.do_sca_failed(request).await,
            ScaStatus::Exempted => self.do_sca_exempted(request).await,
        }
    }

    async fn do_sca_started(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse>;

    async fn do_sca_received(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse>;

    async fn do_sca_psu_identified(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse>;

    async fn do_sca_psu_authenticated(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse>;

    async fn do_sca_method_selected(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse>;

    /// A finalised authorisation answers with its terminal status and no
    /// side effects.
    async fn do_sca_finalised(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        Ok(AuthorisationProcessorResponse::new(
            ScaStatus::Finalised,
            request,
        ))
    }

    async fn do_sca_failed(
        &self,
        _request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        Err(error_stack::report!(ProcessorError::UnsupportedScaStatus(
            ScaStatus::Failed
        )))
    }

    async fn do_sca_exempted(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse>;
}
