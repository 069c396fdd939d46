//! Decision taken after the bank reported the available SCA methods.

use sca_interfaces::types::AuthenticationObject;

/// What to do with the method list the bank returned.
#[derive(Debug)]
pub enum ScaMethodDecision<'a> {
    /// The bank waived SCA. Takes precedence over the method count.
    Exempted,
    /// No method is available for this PSU.
    NoScaMethods,
    /// Exactly one method: it is selected implicitly.
    Single {
        method: &'a AuthenticationObject,
        decoupled: bool,
    },
    /// The PSU must pick one of several methods.
    Multiple(&'a [AuthenticationObject]),
}

pub fn decide(methods: &[AuthenticationObject], sca_exempted: bool) -> ScaMethodDecision<'_> {
    if sca_exempted {
        return ScaMethodDecision::Exempted;
    }
    match methods {
        [] => ScaMethodDecision::NoScaMethods,
        [method] => ScaMethodDecision::Single {
            method,
            decoupled: method.decoupled,
        },
        _ => ScaMethodDecision::Multiple(methods),
    }
}

#[cfg(test)]
mod tests {
    use common_enums::AuthenticationType;

    use super::*;

    fn method(id: &str, decoupled: bool) -> AuthenticationObject {
        AuthenticationObject {
            authentication_method_id: id.to_string(),
            authentication_type: AuthenticationType::SmsOtp,
            authentication_version: None,
            name: None,
            explanation: None,
            decoupled,
        }
    }

    #[test]
    fn exemption_beats_the_method_count() {
        let methods = vec![method("sms", false), method("push", true)];
        assert!(matches!(decide(&methods, true), ScaMethodDecision::Exempted));
        assert!(matches!(decide(&[], true), ScaMethodDecision::Exempted));
    }

    #[test]
    fn empty_list_means_no_methods() {
        assert!(matches!(decide(&[], false), ScaMethodDecision::NoScaMethods));
    }

    #[test]
    fn single_method_is_selected_implicitly() {
        let methods = vec![method("push", true)];
        match decide(&methods, false) {
            ScaMethodDecision::Single { method, decoupled } => {
                assert_eq!(method.authentication_method_id, "push");
                assert!(decoupled);
            }
            other => panic!("unexpected decision: {other:?}"),
        }
    }

    #[test]
    fn several_methods_go_back_to_the_psu() {
        let methods = vec![method("sms", false), method("chip", false)];
        match decide(&methods, false) {
            ScaMethodDecision::Multiple(returned) => assert_eq!(returned.len(), 2),
            other => panic!("unexpected decision: {other:?}"),
        }
    }
}
