use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

fn default_limit() -> i64 {
    50
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Product,
    Service,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Completed and cancelled orders are final
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// Outcome of writing an order's service items into clinic ledgers
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClinicSync {
    Synced,
    /// At least one clinic ledger is missing this order's entries
    Partial,
    /// The order holds no service items
    #[default]
    NotRequired,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct OrderItem {
    pub kind: ItemKind,
    /// Product or service id, depending on `kind`
    pub item_id: Uuid,
    /// Required for service items
    pub clinic_id: Option<Uuid>,
    /// Replaced by the stored service's name and price for service items
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ShippingAddress {
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(length(min = 3, max = 32))]
    pub phone: Option<String>,
}

/// Order entity as stored in the `orders` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub items: Vec<OrderItem>,
    pub total: f64,
    pub shipping_address: Option<ShippingAddress>,
    pub status: OrderStatus,
    pub clinic_sync: ClinicSync,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrder {
    #[validate(length(min = 1, message = "an order needs at least one item"), nested)]
    pub items: Vec<OrderItem>,
    #[validate(nested)]
    pub shipping_address: Option<ShippingAddress>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

impl Order {
    /// New pending order; the total is always derived from the items.
    ///
    /// Orders with service items start as `partial` and only become
    /// `synced` once every clinic ledger has been written.
    pub fn new(user_id: Uuid, input: CreateOrder) -> Self {
        let now = Utc::now();
        let total = input.items.iter().map(OrderItem::subtotal).sum();
        let clinic_sync = if input.items.iter().any(|i| i.kind == ItemKind::Service) {
            ClinicSync::Partial
        } else {
            ClinicSync::NotRequired
        };
        Self {
            id: Uuid::now_v7(),
            user_id,
            items: input.items,
            total,
            shipping_address: input.shipping_address,
            status: OrderStatus::Pending,
            clinic_sync,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn service_items(&self) -> impl Iterator<Item = &OrderItem> {
        self.items.iter().filter(|i| i.kind == ItemKind::Service)
    }
}
