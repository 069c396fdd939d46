//! Runtime configuration.
//!
//! Values come from an optional TOML file plus `SCA__` prefixed environment
//! variables, the environment winning. `SCA__AUTHORISATION__CREDENTIAL_FAILURE_AIS=keep_status`
//! overrides `[authorisation] credential_failure_ais`.

use common_enums::{CredentialFailurePolicy, PaymentType};
use common_utils::errors::CustomResult;

/// Environment variable naming the configuration file to load.
pub const CONFIG_FILE_ENV: &str = "SCA_CONFIG";

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub authorisation: AuthorisationSettings,
}

/// Knobs of the authorisation processors.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct AuthorisationSettings {
    /// What a hard credential rejection does to a consent authorisation.
    pub credential_failure_ais: CredentialFailurePolicy,
    /// Same, for payment-initiation authorisations.
    pub credential_failure_pis: CredentialFailurePolicy,
    /// Same, for payment-cancellation authorisations.
    pub credential_failure_pis_cancellation: CredentialFailurePolicy,
    /// Payment types an SCA exemption is never applied to.
    pub exemption_excluded_payment_types: Vec<PaymentType>,
    /// Message shown to the PSU when the flow moves to their bank app.
    pub decoupled_psu_message: String,
    /// One-off, single-PSU consents skip the SCA method step entirely after a
    /// successful credential check.
    pub one_factor_one_off_consents: bool,
}

impl Default for AuthorisationSettings {
    fn default() -> Self {
        Self {
            credential_failure_ais: CredentialFailurePolicy::HardFail,
            credential_failure_pis: CredentialFailurePolicy::KeepStatus,
            credential_failure_pis_cancellation: CredentialFailurePolicy::KeepStatus,
            exemption_excluded_payment_types: vec![PaymentType::Periodic],
            decoupled_psu_message:
                "Please use your bank's device to continue the authorisation".to_string(),
            one_factor_one_off_consents: false,
        }
    }
}

impl AuthorisationSettings {
    pub fn exemption_allowed_for(&self, payment_type: PaymentType) -> bool {
        !self.exemption_excluded_payment_types.contains(&payment_type)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unable to load the configuration")]
    Load,
}

impl Settings {
    pub fn new() -> CustomResult<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(&path).required(true));
        }
        builder
            .add_source(
                config::Environment::with_prefix("SCA")
                    .try_parsing(true)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("authorisation.exemption_excluded_payment_types"),
            )
            .build()
            .map_err(|error| {
                tracing::error!(%error, "configuration could not be built");
                error_stack::report!(ConfigError::Load)
            })?
            .try_deserialize()
            .map_err(|error| {
                tracing::error!(%error, "configuration could not be deserialized");
                error_stack::report!(ConfigError::Load)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_exclude_periodic_payments_from_exemption() {
        let settings = AuthorisationSettings::default();
        assert!(settings.exemption_allowed_for(PaymentType::Single));
        assert!(settings.exemption_allowed_for(PaymentType::Bulk));
        assert!(!settings.exemption_allowed_for(PaymentType::Periodic));
    }

    #[test]
    fn defaults_hard_fail_consent_credentials_only() {
        let settings = AuthorisationSettings::default();
        assert_eq!(
            settings.credential_failure_ais,
            CredentialFailurePolicy::HardFail
        );
        assert_eq!(
            settings.credential_failure_pis,
            CredentialFailurePolicy::KeepStatus
        );
    }
}
