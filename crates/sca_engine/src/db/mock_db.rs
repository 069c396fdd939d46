//! In-memory store used in tests and embedded setups.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use sca_domain_models::{authorisation::Authorisation, consents::AccountConsent, payments::CommonPayment};
use sca_interfaces::types::AuthenticationObject;

#[derive(Clone, Default)]
pub struct MockDb {
    pub authorisations: Arc<Mutex<Vec<Authorisation>>>,
    pub consents: Arc<Mutex<Vec<AccountConsent>>>,
    pub payments: Arc<Mutex<Vec<CommonPayment>>>,
    /// SCA methods saved per authorisation id.
    pub authentication_methods: Arc<Mutex<HashMap<String, Vec<AuthenticationObject>>>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }
}
