//! The authorisation record itself.

use common_enums::{AuthorisationType, ScaApproach, ScaStatus};
use sca_interfaces::types::PsuIdData;
use time::PrimitiveDateTime;

/// One authorisation sub-resource attached to a consent or a payment.
#[derive(Clone, Debug)]
pub struct Authorisation {
    pub authorisation_id: String,
    /// Id of the consent or payment this authorisation belongs to.
    pub parent_id: String,
    pub authorisation_type: AuthorisationType,
    pub sca_status: ScaStatus,
    pub chosen_sca_approach: Option<ScaApproach>,
    pub psu_id_data: Option<PsuIdData>,
    pub authentication_method_id: Option<String>,
    pub sca_authentication_data: Option<String>,
    /// After this instant the authorisation can no longer be worked on.
    pub authorisation_expiration_timestamp: Option<PrimitiveDateTime>,
    /// Lifetime of the redirect link, relevant for the redirect approach only.
    pub redirect_url_expiration_timestamp: Option<PrimitiveDateTime>,
}

impl Authorisation {
    pub fn is_expired(&self, now: PrimitiveDateTime) -> bool {
        self.authorisation_expiration_timestamp
            .map_or(false, |expires_at| expires_at < now)
    }
}
