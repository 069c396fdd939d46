//! Hand-over of an authorisation to the bank's own device.

use common_enums::{ScaApproach, ScaStatus, ServiceKind};
use error_stack::ResultExt;
use sca_domain_models::processor::{AuthorisationProcessorRequest, AuthorisationProcessorResponse};
use sca_interfaces::{
    api::{AspspConsentDataProvider, AuthorisationConnector},
    types::AuthenticationObject,
};

use crate::{
    configs::settings::AuthorisationSettings,
    core::{
        authorisation::{context_data, transformers},
        errors::{ProcessorError, ProcessorResult},
    },
    db::StorageInterface,
};

/// Moves the flow onto the PSU's banking device.
///
/// On success the chosen approach is pinned to decoupled, the authorisation
/// moves to `SCAMETHODSELECTED` and the PSU is told where to continue. The
/// message comes from the bank when it sends one, from configuration
/// otherwise.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn proceed_decoupled<C>(
    connector: &C,
    store: &dyn StorageInterface,
    settings: &AuthorisationSettings,
    service: ServiceKind,
    request: &AuthorisationProcessorRequest,
    subject: &C::Subject,
    consent_data: &dyn AspspConsentDataProvider,
    chosen_method: Option<&AuthenticationObject>,
) -> ProcessorResult<AuthorisationProcessorResponse>
where
    C: AuthorisationConnector,
{
    let ctx = context_data(request);
    let authorisation_id = request.update_request.authorisation_id.as_str();
    let method_id = chosen_method
        .map(|method| method.authentication_method_id.as_str())
        .or(request.update_request.authentication_method_id.as_deref());

    let response = connector
        .start_sca_decoupled(&ctx, authorisation_id, method_id, subject, consent_data)
        .await;
    if response.has_error() {
        tracing::warn!(%authorisation_id, "decoupled hand-over rejected by the bank");
        let error = transformers::to_error_holder(&response.errors, service);
        store
            .update_authorisation_status(authorisation_id, ScaStatus::Failed)
            .await
            .change_context(ProcessorError::StorageError)?;
        return Ok(AuthorisationProcessorResponse::failed(error, request));
    }

    store
        .update_sca_approach(authorisation_id, ScaApproach::Decoupled)
        .await
        .change_context(ProcessorError::StorageError)?;
    store
        .update_authorisation_status(authorisation_id, ScaStatus::ScaMethodSelected)
        .await
        .change_context(ProcessorError::StorageError)?;

    let psu_message = response
        .payload
        .and_then(|payload| payload.psu_message)
        .unwrap_or_else(|| settings.decoupled_psu_message.clone());

    let mut out = AuthorisationProcessorResponse::new(ScaStatus::ScaMethodSelected, request);
    out.sca_approach = Some(ScaApproach::Decoupled);
    out.chosen_sca_method = chosen_method.cloned();
    out.psu_message = Some(psu_message);
    Ok(out)
}
