//! Account-information consents.

use common_enums::ConsentStatus;
use sca_interfaces::types::PsuIdData;
use time::Date;

/// An account-information consent as held by the consent store.
#[derive(Clone, Debug)]
pub struct AccountConsent {
    pub consent_id: String,
    pub consent_status: ConsentStatus,
    pub recurring_indicator: bool,
    pub frequency_per_day: i32,
    pub valid_until: Option<Date>,
    /// All PSUs that have authorised (or must authorise) this consent.
    pub psu_id_data_list: Vec<PsuIdData>,
    /// More than one PSU must authorise before the consent becomes valid.
    pub multilevel_sca_required: bool,
    pub tpp_authorisation_number: Option<String>,
    pub instance_id: Option<String>,
}

/// Parameters for retiring older consents that the newly activated one
/// supersedes.
#[derive(Clone, Debug)]
pub struct TerminateOldConsentsRequest {
    pub recurring_indicator: bool,
    pub wrong_consent_data: bool,
    pub psu_id_data_list: Vec<PsuIdData>,
    pub tpp_authorisation_number: Option<String>,
    pub instance_id: Option<String>,
}

impl TerminateOldConsentsRequest {
    pub fn from_consent(consent: &AccountConsent) -> Self {
        Self {
            recurring_indicator: consent.recurring_indicator,
            wrong_consent_data: consent.tpp_authorisation_number.is_none()
                || consent.psu_id_data_list.is_empty(),
            psu_id_data_list: consent.psu_id_data_list.clone(),
            tpp_authorisation_number: consent.tpp_authorisation_number.clone(),
            instance_id: consent.instance_id.clone(),
        }
    }
}
