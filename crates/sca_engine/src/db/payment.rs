use common_enums::TransactionStatus;
use common_utils::errors::CustomResult;
use error_stack::report;
use sca_domain_models::payments::CommonPayment;

use super::{MockDb, StorageError};

#[async_trait::async_trait]
pub trait PaymentInterface {
    async fn insert_payment(
        &self,
        payment: CommonPayment,
    ) -> CustomResult<CommonPayment, StorageError>;

    async fn find_payment_by_id(
        &self,
        payment_id: &str,
    ) -> CustomResult<CommonPayment, StorageError>;

    async fn update_payment_status(
        &self,
        payment_id: &str,
        transaction_status: TransactionStatus,
    ) -> CustomResult<(), StorageError>;

    async fn update_payment_multilevel_sca_required(
        &self,
        payment_id: &str,
        multilevel_sca_required: bool,
    ) -> CustomResult<(), StorageError>;
}

#[async_trait::async_trait]
impl PaymentInterface for MockDb {
    async fn insert_payment(
        &self,
        payment: CommonPayment,
    ) -> CustomResult<CommonPayment, StorageError> {
        self.payments
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .push(payment.clone());
        Ok(payment)
    }

    async fn find_payment_by_id(
        &self,
        payment_id: &str,
    ) -> CustomResult<CommonPayment, StorageError> {
        self.payments
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?
            .iter()
            .find(|payment| payment.payment_id == payment_id)
            .cloned()
            .ok_or_else(|| report!(StorageError::ValueNotFound(format!("payment {payment_id}"))))
    }

    async fn update_payment_status(
        &self,
        payment_id: &str,
        transaction_status: TransactionStatus,
    ) -> CustomResult<(), StorageError> {
        let mut payments = self
            .payments
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?;
        let payment = payments
            .iter_mut()
            .find(|payment| payment.payment_id == payment_id)
            .ok_or_else(|| report!(StorageError::ValueNotFound(format!("payment {payment_id}"))))?;
        payment.transaction_status = transaction_status;
        Ok(())
    }

    async fn update_payment_multilevel_sca_required(
        &self,
        payment_id: &str,
        multilevel_sca_required: bool,
    ) -> CustomResult<(), StorageError> {
        let mut payments = self
            .payments
            .lock()
            .map_err(|_| report!(StorageError::MockDbError))?;
        let payment = payments
            .iter_mut()
            .find(|payment| payment.payment_id == payment_id)
            .ok_or_else(|| report!(StorageError::ValueNotFound(format!("payment {payment_id}"))))?;
        payment.multilevel_sca_required = multilevel_sca_required;
        Ok(())
    }
}
