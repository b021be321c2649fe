use async_trait::async_trait;
use domain_clinics::{
    ClinicError, ClinicRepository, ClinicResult, ClinicService, PurchasedService, Service,
};
use uuid::Uuid;

/// The clinics' service catalog and purchased-service ledgers as seen by orders
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClinicLedger: Send + Sync {
    /// Stored service by id, `None` when no such service exists
    async fn find_service(&self, service_id: Uuid) -> ClinicResult<Option<Service>>;

    /// Append `entries` to one clinic's ledger.
    ///
    /// Must be idempotent per `order_id`: replaying an order that is already
    /// recorded returns `Ok(false)` and writes nothing.
    async fn record_purchases(
        &self,
        clinic_id: Uuid,
        order_id: Uuid,
        entries: Vec<PurchasedService>,
    ) -> ClinicResult<bool>;
}

#[async_trait]
impl<R: ClinicRepository + 'static> ClinicLedger for ClinicService<R> {
    async fn find_service(&self, service_id: Uuid) -> ClinicResult<Option<Service>> {
        match ClinicService::find_service(self, service_id).await {
            Ok(service) => Ok(Some(service)),
            Err(ClinicError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn record_purchases(
        &self,
        clinic_id: Uuid,
        order_id: Uuid,
        entries: Vec<PurchasedService>,
    ) -> ClinicResult<bool> {
        ClinicService::record_purchases(self, clinic_id, order_id, entries).await
    }
}
