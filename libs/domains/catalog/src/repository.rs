use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{Product, ProductCategory, ProductFilter, Review, TopProducts};

/// Repository trait for products, their categories and the top-products list
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn create_category(&self, category: ProductCategory) -> CatalogResult<ProductCategory>;

    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<ProductCategory>>;

    async fn list_categories(&self) -> CatalogResult<Vec<ProductCategory>>;

    async fn category_name_exists(&self, name: &str) -> CatalogResult<bool>;

    async fn update_category(&self, category: ProductCategory) -> CatalogResult<ProductCategory>;

    /// Whether any product still belongs to the category
    async fn category_in_use(&self, id: Uuid) -> CatalogResult<bool>;

    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool>;

    async fn create_product(&self, product: Product) -> CatalogResult<Product>;

    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// Products among `ids` that exist, in no particular order
    async fn find_products(&self, ids: Vec<Uuid>) -> CatalogResult<Vec<Product>>;

    /// Newest first
    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>>;

    /// Replace product fields; reviews and rating are left untouched
    async fn update_product(&self, product: Product) -> CatalogResult<Product>;

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool>;

    /// Append a review and refresh `rating`/`num_reviews`.
    ///
    /// Returns None when the product is missing or the user already reviewed it.
    async fn add_review(&self, product_id: Uuid, review: Review) -> CatalogResult<Option<Product>>;

    /// Remove a review and refresh `rating`/`num_reviews`
    async fn remove_review(&self, product_id: Uuid, review_id: Uuid)
    -> CatalogResult<Option<Product>>;

    async fn get_top_products(&self) -> CatalogResult<Option<TopProducts>>;

    /// Store a new slot list.
    ///
    /// With `expected_version`, the write only applies if the stored version
    /// (0 when nothing is stored yet) matches; None is returned otherwise.
    async fn save_top_products(
        &self,
        slots: Vec<Option<Uuid>>,
        expected_version: Option<i64>,
    ) -> CatalogResult<Option<TopProducts>>;

    /// Null out every slot holding `product_id`
    async fn clear_top_product(&self, product_id: Uuid) -> CatalogResult<()>;
}
