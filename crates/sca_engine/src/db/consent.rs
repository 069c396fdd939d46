use common_enums::ConsentStatus;
use common_utils::errors::CustomResult;
use error_stack::report;
use sca_domain_models::consents::{AccountConsent, TerminateOldConsentsRequest};

use super::{MockDb, StorageError};

#[async_trait::async_trait]
pub trait ConsentInterface {
    async fn insert_consent(
        &self,
        consent: AccountConsent,
    ) -> CustomResult<AccountConsent, StorageError>;

    async fn find_consent_by_id(
        &self,
        consent_id: &str,
    ) -> CustomResult<AccountConsent, StorageError>;

    async fn update_consent_status(
        &self,
        consent_id: &str,
        consent_status: ConsentStatus,
    ) -> CustomResult<(), StorageError>;

    async fn update_consent_multilevel_sca_required(
        &self,
        consent_id: &str,
        multilevel_sca_required: bool,
    ) -> CustomResult<(), StorageError>;

    /// Retires every non-terminal consent of the same TPP and PSUs that the
    /// newly activated consent supersedes. Returns how many were terminated.
    async fn find_and_terminate_old_consents(
        &self,
        new_consent_id: &str,
        request: TerminateOldConsentsRequest,
    ) -> CustomResult<usize, StorageError>;
}

fn is_terminal(status: ConsentStatus) -> bool {
    matches!(
        status,
        ConsentStatus::Rejected
            | ConsentStatus::RevokedByPsu
            | ConsentStatus::Expired
            | ConsentStatus::TerminatedByTpp
    )
}

#[async_trait::async_trait]
impl ConsentInterface for MockDb {
    async fn insert_consent(
        &self,
        consent: AccountConsent,
    ) -> CustomResult<AccountConsent, StorageError> {
        self.consents
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .push(consent.clone());
        Ok(consent)
    }

    async fn find_consent_by_id(
        &self,
        consent_id: &str,
    ) -> CustomResult<AccountConsent, StorageError> {
        self.consents
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .iter()
            .find(|consent| consent.consent_id == consent_id)
            .cloned()
            .ok_or_else(|| report!(StorageError::ValueNotFound(format!("consent {consent_id}"))))
    }

    async fn update_consent_status(
        &self,
        consent_id: &str,
        consent_status: ConsentStatus,
    ) -> CustomResult<(), StorageError> {
        let mut consents = self
            .consents
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?;
        let consent = consents
            .iter_mut()
            .find(|consent| consent.consent_id == consent_id)
            .ok_or_else(|| report!(StorageError::ValueNotFound(format!("consent {consent_id}"))))?;
        consent.consent_status = consent_status;
        Ok(())
    }

    async fn update_consent_multilevel_sca_required(
        &self,
        consent_id: &str,
        multilevel_sca_required: bool,
    ) -> CustomResult<(), StorageError> {
        let mut consents = self
            .consents
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?;
        let consent = consents
            .iter_mut()
            .find(|consent| consent.consent_id == consent_id)
            .ok_or_else(|| report!(StorageError::ValueNotFound(format!("consent {consent_id}"))))?;
        consent.multilevel_sca_required = multilevel_sca_required;
        Ok(())
    }

    async fn find_and_terminate_old_consents(
        &self,
        new_consent_id: &str,
        request: TerminateOldConsentsRequest,
    ) -> CustomResult<usize, StorageError> {
        if request.wrong_consent_data {
            return Ok(0);
        }
        let mut consents = self
            .consents
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?;
        let mut terminated = 0;
        for consent in consents.iter_mut() {
            let superseded = consent.consent_id != new_consent_id
                && !is_terminal(consent.consent_status)
                && consent.tpp_authorisation_number == request.tpp_authorisation_number
                && consent.recurring_indicator == request.recurring_indicator
                && consent.psu_id_data_list.iter().any(|known| {
                    request
                        .psu_id_data_list
                        .iter()
                        .any(|psu| psu.psu_id == known.psu_id)
                });
            if superseded {
                consent.consent_status = ConsentStatus::TerminatedByTpp;
                terminated += 1;
            }
        }
        Ok(terminated)
    }
}
