//! Catalog Domain
//!
//! Products with embedded reviews, product categories and the curated
//! top-products slot list.
//!
//! The slot list always has the configured length (default
//! [`DEFAULT_TOP_PRODUCTS_SLOTS`]); writes may carry the version they were
//! based on and are rejected with 409 when it is stale.
//!
//! ```rust,ignore
//! use domain_catalog::{CatalogService, MongoCatalogRepository, handlers};
//!
//! let repository = MongoCatalogRepository::new(&db);
//! repository.ensure_indexes().await?;
//! let service = CatalogService::new(repository, config.top_products_slots);
//! let router = handlers::router(service, jwt_auth);
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateProduct, CreateProductCategory, CreateReview, DEFAULT_TOP_PRODUCTS_SLOTS, Product,
    ProductCategory, ProductFilter, Review, TopProducts, TopProductsResponse, UpdateProduct,
    UpdateProductCategory, UpdateTopProducts,
};
pub use mongodb::MongoCatalogRepository;
pub use repository::CatalogRepository;
pub use service::CatalogService;
