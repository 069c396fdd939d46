use common_enums::{ScaApproach, ScaStatus};
use common_utils::errors::CustomResult;
use error_stack::report;
use sca_domain_models::authorisation::Authorisation;
use sca_interfaces::types::AuthenticationObject;

use super::{MockDb, StorageError};

#[async_trait::async_trait]
pub trait AuthorisationInterface {
    async fn insert_authorisation(
        &self,
        authorisation: Authorisation,
    ) -> CustomResult<Authorisation, StorageError>;

    async fn find_authorisation_by_id(
        &self,
        authorisation_id: &str,
    ) -> CustomResult<Authorisation, StorageError>;

    async fn update_authorisation_status(
        &self,
        authorisation_id: &str,
        sca_status: ScaStatus,
    ) -> CustomResult<(), StorageError>;

    async fn update_sca_approach(
        &self,
        authorisation_id: &str,
        sca_approach: ScaApproach,
    ) -> CustomResult<(), StorageError>;

    async fn save_authentication_methods(
        &self,
        authorisation_id: &str,
        methods: Vec<AuthenticationObject>,
    ) -> CustomResult<(), StorageError>;

    /// Whether the method the PSU selected is marked decoupled in the saved
    /// method list.
    async fn is_authentication_method_decoupled(
        &self,
        authorisation_id: &str,
        authentication_method_id: &str,
    ) -> CustomResult<bool, StorageError>;
}

#[async_trait::async_trait]
impl AuthorisationInterface for MockDb {
    async fn insert_authorisation(
        &self,
        authorisation: Authorisation,
    ) -> CustomResult<Authorisation, StorageError> {
        self.authorisations
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .push(authorisation.clone());
        Ok(authorisation)
    }

    async fn find_authorisation_by_id(
        &self,
        authorisation_id: &str,
    ) -> CustomResult<Authorisation, StorageError> {
        self.authorisations
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .iter()
            .find(|authorisation| authorisation.authorisation_id == authorisation_id)
            .cloned()
            .ok_or_else(|| {
                report!(StorageError::ValueNotFound(format!(
                    "authorisation {authorisation_id}"
                )))
            })
    }

    async fn update_authorisation_status(
        &self,
        authorisation_id: &str,
        sca_status: ScaStatus,
    ) -> CustomResult<(), StorageError> {
        let mut authorisations = self
            .authorisations
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?;
        let authorisation = authorisations
            .iter_mut()
            .find(|authorisation| authorisation.authorisation_id == authorisation_id)
            .ok_or_else(|| {
                report!(StorageError::ValueNotFound(format!(
                    "authorisation {authorisation_id}"
                )))
            })?;
        authorisation.sca_status = sca_status;
        Ok(())
    }

    async fn update_sca_approach(
        &self,
        authorisation_id: &str,
        sca_approach: ScaApproach,
    ) -> CustomResult<(), StorageError> {
        let mut authorisations = self
            .authorisations
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?;
        let authorisation = authorisations
            .iter_mut()
            .find(|authorisation| authorisation.authorisation_id == authorisation_id)
            .ok_or_else(|| {
                report!(StorageError::ValueNotFound(format!(
                    "authorisation {authorisation_id}"
                )))
            })?;
        authorisation.chosen_sca_approach = Some(sca_approach);
        Ok(())
    }

    async fn save_authentication_methods(
        &self,
        authorisation_id: &str,
        methods: Vec<AuthenticationObject>,
    ) -> CustomResult<(), StorageError> {
        self.authentication_methods
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .insert(authorisation_id.to_string(), methods);
        Ok(())
    }

    async fn is_authentication_method_decoupled(
        &self,
        authorisation_id: &str,
        authentication_method_id: &str,
    ) -> CustomResult<bool, StorageError> {
        Ok(self
            .authentication_methods
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .get(authorisation_id)
            .map_or(false, |methods| {
                methods.iter().any(|method| {
                    method.authentication_method_id == authentication_method_id
                        && method.decoupled
                })
            }))
    }
}
