use async_trait::async_trait;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::{ClinicSync, Order, OrderFilter, OrderStatus};

/// Repository trait for orders
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create_order(&self, order: Order) -> OrderResult<Order>;

    async fn get_order(&self, id: Uuid) -> OrderResult<Option<Order>>;

    /// Newest first
    async fn list_orders(&self, filter: OrderFilter) -> OrderResult<Vec<Order>>;

    /// Newest first
    async fn list_user_orders(&self, user_id: Uuid) -> OrderResult<Vec<Order>>;

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>>;

    async fn set_clinic_sync(&self, id: Uuid, sync: ClinicSync) -> OrderResult<Option<Order>>;

    async fn delete_order(&self, id: Uuid) -> OrderResult<bool>;
}
