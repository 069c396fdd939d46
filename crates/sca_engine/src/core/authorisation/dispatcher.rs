//! Routing of an update to the service registered for its SCA approach.

use std::{collections::HashMap, sync::Arc};

use common_enums::ScaApproach;
use sca_domain_models::processor::{AuthorisationProcessorRequest, AuthorisationProcessorResponse};

use crate::core::{
    authorisation::AuthorisationProcessorService,
    errors::{ProcessorError, ProcessorResult},
};

/// An authorisation service that can be registered for an SCA approach.
#[async_trait::async_trait]
pub trait ApproachAuthorisationService: Send + Sync {
    async fn update_authorisation(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse>;
}

#[async_trait::async_trait]
impl<T: AuthorisationProcessorService> ApproachAuthorisationService for T {
    async fn update_authorisation(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        AuthorisationProcessorService::update_authorisation(self, request).await
    }
}

/// Maps each SCA approach to the service handling it. Dispatching to an
/// unregistered approach is an error, not a fallback.
#[derive(Default)]
pub struct AuthorisationProcessorDispatcher {
    services: HashMap<ScaApproach, Arc<dyn ApproachAuthorisationService>>,
}

impl AuthorisationProcessorDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        mut self,
        sca_approach: ScaApproach,
        service: Arc<dyn ApproachAuthorisationService>,
    ) -> Self {
        self.services.insert(sca_approach, service);
        self
    }

    #[tracing::instrument(skip_all, fields(
        authorisation_id = %request.update_request.authorisation_id,
        sca_approach = %request.sca_approach,
    ))]
    pub async fn dispatch(
        &self,
        request: &AuthorisationProcessorRequest,
    ) -> ProcessorResult<AuthorisationProcessorResponse> {
        let service = self.services.get(&request.sca_approach).ok_or_else(|| {
            error_stack::report!(ProcessorError::NoApproachService(request.sca_approach))
        })?;
        service.update_authorisation(request).await
    }
}

#[cfg(test)]
mod tests {
    use common_enums::{AuthorisationType, ScaStatus};

    use super::*;
    use crate::{
        configs::settings::AuthorisationSettings,
        core::authorisation::ais::AisAuthorisationProcessorService,
        db::{authorisation::AuthorisationInterface, consent::ConsentInterface, MockDb},
        test_utils::{
            self, consent, processor_request, MockAspspDataProvider, MockConsentConnector,
            CONSENT_ID,
        },
    };

    async fn ais_service(store: Arc<MockDb>) -> Arc<dyn ApproachAuthorisationService> {
        store.insert_consent(consent()).await.unwrap();
        store
            .insert_authorisation(test_utils::authorisation(
                CONSENT_ID,
                AuthorisationType::Ais,
                ScaStatus::Received,
            ))
            .await
            .unwrap();
        Arc::new(AisAuthorisationProcessorService::new(
            Arc::new(MockConsentConnector::default()),
            store,
            Arc::new(MockAspspDataProvider::default()),
            AuthorisationSettings::default(),
        ))
    }

    #[tokio::test]
    async fn registered_approach_is_dispatched() {
        let store = Arc::new(MockDb::new());
        let service = ais_service(Arc::clone(&store)).await;
        let dispatcher =
            AuthorisationProcessorDispatcher::new().register(ScaApproach::Embedded, service);

        let request = processor_request(
            CONSENT_ID,
            AuthorisationType::Ais,
            ScaApproach::Embedded,
            ScaStatus::Received,
        );
        let response = dispatcher.dispatch(&request).await.unwrap();
        assert_eq!(response.sca_status, Some(ScaStatus::ScaMethodSelected));
    }

    #[tokio::test]
    async fn unregistered_approach_is_an_error() {
        let store = Arc::new(MockDb::new());
        let service = ais_service(Arc::clone(&store)).await;
        let dispatcher =
            AuthorisationProcessorDispatcher::new().register(ScaApproach::Embedded, service);

        let request = processor_request(
            CONSENT_ID,
            AuthorisationType::Ais,
            ScaApproach::Redirect,
            ScaStatus::Received,
        );
        let report = dispatcher.dispatch(&request).await.unwrap_err();
        assert!(matches!(
            report.current_context(),
            ProcessorError::NoApproachService(ScaApproach::Redirect)
        ));
    }
}

