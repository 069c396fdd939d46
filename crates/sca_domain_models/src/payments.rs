//! Payments under initiation or cancellation.

use common_enums::{PaymentType, TransactionStatus};
use sca_interfaces::types::PsuIdData;

/// The slice of a payment the authorisation engine needs.
#[derive(Clone, Debug)]
pub struct CommonPayment {
    pub payment_id: String,
    pub payment_product: Option<String>,
    pub payment_type: PaymentType,
    pub transaction_status: TransactionStatus,
    /// All PSUs attached to the payment at initiation time.
    pub psu_id_data_list: Vec<PsuIdData>,
    /// More than one PSU must authorise before the payment can execute.
    pub multilevel_sca_required: bool,
}

impl CommonPayment {
    /// Whether the given PSU is one of those the payment was initiated for.
    /// A payment with no PSU list accepts any PSU.
    pub fn accepts_psu(&self, psu_data: &PsuIdData) -> bool {
        self.psu_id_data_list.is_empty()
            || self
                .psu_id_data_list
                .iter()
                .any(|known| known.psu_id == psu_data.psu_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(psu_ids: &[&str]) -> CommonPayment {
        CommonPayment {
            payment_id: "pmt_1".to_string(),
            payment_product: Some("sepa-credit-transfers".to_string()),
            payment_type: PaymentType::Single,
            transaction_status: TransactionStatus::Rcvd,
            psu_id_data_list: psu_ids.iter().map(|id| PsuIdData::new(*id)).collect(),
            multilevel_sca_required: false,
        }
    }

    #[test]
    fn psu_from_the_initiation_list_is_accepted() {
        let payment = payment(&["anton.brueckner", "max.musterman"]);
        assert!(payment.accepts_psu(&PsuIdData::new("max.musterman")));
        assert!(!payment.accepts_psu(&PsuIdData::new("mallory")));
    }

    #[test]
    fn payment_without_psu_list_accepts_anyone() {
        assert!(payment(&[]).accepts_psu(&PsuIdData::new("anton.brueckner")));
    }
}
