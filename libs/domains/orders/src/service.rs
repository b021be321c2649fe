//! Order Service - checkout and the follow-up write into clinic ledgers

use axum_helpers::JwtClaims;
use domain_clinics::PurchasedService;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{OrderError, OrderResult};
use crate::ledger::ClinicLedger;
use crate::models::{
    ClinicSync, CreateOrder, ItemKind, Order, OrderFilter, OrderItem, OrderStatus,
};
use crate::repository::OrderRepository;

fn validation<E: std::fmt::Display>(err: E) -> OrderError {
    OrderError::Validation(err.to_string())
}

/// Ledger entries of an order grouped per clinic.
///
/// Repeated lines for the same service are merged so each
/// `(order_id, service_id)` pair appears once.
fn ledger_entries(order: &Order) -> BTreeMap<Uuid, Vec<PurchasedService>> {
    let mut per_clinic: BTreeMap<Uuid, Vec<PurchasedService>> = BTreeMap::new();
    for item in order.service_items() {
        let Some(clinic_id) = item.clinic_id else {
            continue;
        };
        let entries = per_clinic.entry(clinic_id).or_default();
        match entries.iter_mut().find(|e| e.service_id == item.item_id) {
            Some(entry) => entry.quantity += item.quantity,
            None => entries.push(PurchasedService {
                order_id: order.id,
                service_id: item.item_id,
                user_id: order.user_id,
                name: item.name.clone(),
                price: item.price,
                quantity: item.quantity,
                purchased_at: order.created_at,
            }),
        }
    }
    per_clinic
}

pub struct OrderService<R: OrderRepository, L: ClinicLedger> {
    repository: Arc<R>,
    ledger: Arc<L>,
}

impl<R: OrderRepository, L: ClinicLedger> OrderService<R, L> {
    pub fn new(repository: R, ledger: L) -> Self {
        Self {
            repository: Arc::new(repository),
            ledger: Arc::new(ledger),
        }
    }

    async fn find(&self, id: Uuid) -> OrderResult<Order> {
        self.repository
            .get_order(id)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    fn user_id(actor: &JwtClaims) -> OrderResult<Uuid> {
        actor
            .subject_id()
            .ok_or_else(|| OrderError::Forbidden("Token subject is not a user id".to_string()))
    }

    /// Write the order's service items into every referenced clinic ledger.
    ///
    /// Each clinic is a separate update; one failing clinic does not stop the
    /// others and turns the result into `partial`.
    async fn sync_ledgers(&self, order: &Order) -> ClinicSync {
        let per_clinic = ledger_entries(order);
        if per_clinic.is_empty() {
            return ClinicSync::NotRequired;
        }

        let mut failed = 0usize;
        for (clinic_id, entries) in per_clinic {
            match self
                .ledger
                .record_purchases(clinic_id, order.id, entries)
                .await
            {
                Ok(written) => {
                    tracing::debug!(order_id = %order.id, clinic_id = %clinic_id, written, "Clinic ledger synced");
                }
                Err(e) => {
                    failed += 1;
                    tracing::warn!(
                        order_id = %order.id,
                        clinic_id = %clinic_id,
                        error = %e,
                        "Failed to record purchased services for clinic"
                    );
                }
            }
        }

        if failed > 0 {
            ClinicSync::Partial
        } else {
            ClinicSync::Synced
        }
    }

    async fn store_sync(&self, mut order: Order) -> OrderResult<Order> {
        let sync = self.sync_ledgers(&order).await;
        if sync == order.clinic_sync {
            return Ok(order);
        }
        match self.repository.set_clinic_sync(order.id, sync).await? {
            Some(updated) => Ok(updated),
            // Deleted while syncing; report what happened to the ledgers anyway
            None => {
                order.clinic_sync = sync;
                Ok(order)
            }
        }
    }

    /// Resolve every service line against the clinics' catalog.
    ///
    /// The line must name an existing service of the given clinic; its name
    /// and price are replaced by the stored ones so the total cannot be
    /// set by the client.
    async fn price_service_items(&self, items: &mut [OrderItem]) -> OrderResult<()> {
        for item in items.iter_mut().filter(|i| i.kind == ItemKind::Service) {
            let service = self
                .ledger
                .find_service(item.item_id)
                .await
                .map_err(|e| OrderError::Database(e.to_string()))?
                .ok_or_else(|| {
                    OrderError::Validation(format!("service {} does not exist", item.item_id))
                })?;

            if item.clinic_id != Some(service.clinic_id) {
                return Err(OrderError::Validation(format!(
                    "service {} is not offered by the given clinic",
                    item.item_id
                )));
            }
            item.name = service.name;
            item.price = service.price;
        }
        Ok(())
    }

    /// Place an order for the calling user.
    ///
    /// The order is stored before any ledger write, so a ledger failure
    /// leaves a `partial` order rather than losing the purchase.
    #[instrument(skip(self, actor, input), fields(actor = %actor.sub))]
    pub async fn create_order(
        &self,
        actor: &JwtClaims,
        mut input: CreateOrder,
    ) -> OrderResult<Order> {
        input.validate().map_err(validation)?;
        let user_id = Self::user_id(actor)?;

        if let Some(item) = input
            .items
            .iter()
            .find(|i| i.kind == ItemKind::Service && i.clinic_id.is_none())
        {
            return Err(OrderError::Validation(format!(
                "service item {} needs a clinic_id",
                item.item_id
            )));
        }
        self.price_service_items(&mut input.items).await?;

        let order = self
            .repository
            .create_order(Order::new(user_id, input))
            .await?;

        let order = self.store_sync(order).await?;
        if order.clinic_sync == ClinicSync::Partial {
            tracing::warn!(order_id = %order.id, "Order stored with partial clinic sync");
        }
        Ok(order)
    }

    /// Replay the ledger writes of an order; safe to call any number of times
    #[instrument(skip(self))]
    pub async fn sync_clinics(&self, id: Uuid) -> OrderResult<Order> {
        let order = self.find(id).await?;
        self.store_sync(order).await
    }

    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn my_orders(&self, actor: &JwtClaims) -> OrderResult<Vec<Order>> {
        let user_id = Self::user_id(actor)?;
        self.repository.list_user_orders(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        self.repository.list_orders(filter).await
    }

    /// Visible to admins and to the user who placed the order
    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn get_order(&self, actor: &JwtClaims, id: Uuid) -> OrderResult<Order> {
        let order = self.find(id).await?;
        if actor.is_admin() || actor.subject_id() == Some(order.user_id) {
            return Ok(order);
        }
        Err(OrderError::Forbidden(
            "Only an admin or the buyer may view this order".to_string(),
        ))
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Order> {
        let order = self.find(id).await?;
        if order.status == status {
            return Ok(order);
        }
        if order.status.is_terminal() {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }
        self.repository
            .set_status(id, status)
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: Uuid) -> OrderResult<()> {
        if !self.repository.delete_order(id).await? {
            return Err(OrderError::NotFound(id));
        }
        Ok(())
    }
}

impl<R: OrderRepository, L: ClinicLedger> Clone for OrderService<R, L> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            ledger: Arc::clone(&self.ledger),
        }
    }
}
