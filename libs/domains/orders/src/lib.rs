//! Orders Domain
//!
//! Checkout for products and clinic services. Service lines must name a
//! service of the given clinic and are priced from the stored service. They
//! are copied into the owning clinic's purchased-service ledger after the
//! order is stored; the outcome is kept on the order as `clinic_sync` and
//! can be replayed.
//!
//! ```rust,ignore
//! use domain_orders::{MongoOrderRepository, OrderService, handlers};
//!
//! let repository = MongoOrderRepository::new(&db);
//! repository.ensure_indexes().await?;
//! let service = OrderService::new(repository, clinic_service.clone());
//! let router = handlers::router(service, jwt_auth);
//! ```

pub mod error;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{OrderError, OrderResult};
pub use handlers::ApiDoc;
pub use ledger::ClinicLedger;
pub use models::{
    ClinicSync, CreateOrder, ItemKind, Order, OrderFilter, OrderItem, OrderStatus,
    ShippingAddress, UpdateOrderStatus,
};
pub use mongodb::MongoOrderRepository;
pub use repository::OrderRepository;
pub use service::OrderService;
