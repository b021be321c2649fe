//! MongoDB implementation of CatalogRepository

use async_trait::async_trait;
use database::mongodb::{
    id_filter, is_duplicate_key_error, now_bson, text_search, to_stored_bson, to_stored_document,
    uuid_bson,
};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Bson, Document, doc},
    options::{FindOptions, IndexOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{Product, ProductCategory, ProductFilter, Review, TopProducts};
use crate::repository::CatalogRepository;

/// `_id` of the top-products singleton document
const TOP_PRODUCTS_KEY: &str = "top_products";

/// MongoDB implementation of the CatalogRepository
pub struct MongoCatalogRepository {
    categories: Collection<ProductCategory>,
    products: Collection<Product>,
    top_products: Collection<TopProducts>,
}

impl MongoCatalogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            categories: db.collection("product_categories"),
            products: db.collection("products"),
            top_products: db.collection("top_products"),
        }
    }

    /// Initialize indexes for listing and uniqueness
    pub async fn ensure_indexes(&self) -> CatalogResult<()> {
        self.categories
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "name": 1 })
                    .options(
                        IndexOptions::builder()
                            .unique(true)
                            .name("idx_name_unique".to_string())
                            .build(),
                    )
                    .build(),
            )
            .await?;

        let product_indexes = vec![
            // Category listing, newest first
            IndexModel::builder()
                .keys(doc! { "category_id": 1, "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category_created".to_string())
                        .build(),
                )
                .build(),
            // Price range queries
            IndexModel::builder()
                .keys(doc! { "price": 1 })
                .options(IndexOptions::builder().name("idx_price".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "created_at": -1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_created".to_string())
                        .build(),
                )
                .build(),
        ];
        self.products.create_indexes(product_indexes).await?;

        tracing::info!("Catalog indexes created successfully");
        Ok(())
    }

    /// Build a MongoDB filter document from ProductFilter
    fn build_filter(filter: &ProductFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref category_id) = filter.category_id {
            doc.insert("category_id", uuid_bson(*category_id));
        }

        let mut price = doc! {};
        if let Some(min) = filter.min_price {
            price.insert("$gte", min);
        }
        if let Some(max) = filter.max_price {
            price.insert("$lte", max);
        }
        if !price.is_empty() {
            doc.insert("price", price);
        }

        if let Some(ref search) = filter.search {
            doc.insert("$or", text_search(&["name", "description", "brand"], search));
        }

        doc
    }

    /// Recompute rating and review count server-side from the embedded array
    async fn refresh_rating(&self, product_id: Uuid) -> CatalogResult<Option<Product>> {
        let pipeline = vec![doc! {
            "$set": {
                "num_reviews": { "$size": "$reviews" },
                "rating": { "$ifNull": [{ "$avg": "$reviews.rating" }, 0.0] },
                "updated_at": now_bson(),
            }
        }];

        Ok(self
            .products
            .find_one_and_update(id_filter(product_id), pipeline)
            .return_document(ReturnDocument::After)
            .await?)
    }
}

/// Filter and upsert flag for a top-products write.
///
/// The document may only be created by a write that expects version 0 (or
/// none); any other expected version has to match an existing document.
fn top_products_write(expected_version: Option<i64>) -> (Document, bool) {
    let mut filter = doc! { "_id": TOP_PRODUCTS_KEY };
    if let Some(version) = expected_version {
        filter.insert("version", version);
    }
    (filter, matches!(expected_version, None | Some(0)))
}

#[async_trait]
impl CatalogRepository for MongoCatalogRepository {
    #[instrument(skip(self, category), fields(name = %category.name))]
    async fn create_category(&self, category: ProductCategory) -> CatalogResult<ProductCategory> {
        self.categories.insert_one(&category).await.map_err(|e| {
            if is_duplicate_key_error(&e) {
                CatalogError::DuplicateCategoryName(category.name.clone())
            } else {
                e.into()
            }
        })?;

        tracing::info!(category_id = %category.id, "Product category created successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn get_category(&self, id: Uuid) -> CatalogResult<Option<ProductCategory>> {
        Ok(self.categories.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> CatalogResult<Vec<ProductCategory>> {
        let cursor = self.categories.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn category_name_exists(&self, name: &str) -> CatalogResult<bool> {
        Ok(self.categories.count_documents(doc! { "name": name }).await? > 0)
    }

    #[instrument(skip(self, category), fields(category_id = %category.id))]
    async fn update_category(&self, category: ProductCategory) -> CatalogResult<ProductCategory> {
        let result = self
            .categories
            .replace_one(id_filter(category.id), &category)
            .await
            .map_err(|e| {
                if is_duplicate_key_error(&e) {
                    CatalogError::DuplicateCategoryName(category.name.clone())
                } else {
                    e.into()
                }
            })?;

        if result.matched_count == 0 {
            return Err(CatalogError::category_not_found(category.id));
        }

        tracing::info!(category_id = %category.id, "Product category updated successfully");
        Ok(category)
    }

    #[instrument(skip(self))]
    async fn category_in_use(&self, id: Uuid) -> CatalogResult<bool> {
        let count = self
            .products
            .count_documents(doc! { "category_id": uuid_bson(id) })
            .await?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_category(&self, id: Uuid) -> CatalogResult<bool> {
        let result = self.categories.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(category_id = %id, "Product category deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, product), fields(name = %product.name))]
    async fn create_product(&self, product: Product) -> CatalogResult<Product> {
        self.products.insert_one(&product).await?;
        tracing::info!(product_id = %product.id, "Product created successfully");
        Ok(product)
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        Ok(self.products.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn find_products(&self, ids: Vec<Uuid>) -> CatalogResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Bson> = ids.into_iter().map(uuid_bson).collect();
        let cursor = self.products.find(doc! { "_id": { "$in": ids } }).await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .products
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update_product(&self, product: Product) -> CatalogResult<Product> {
        let mut fields = to_stored_document(&product)?;
        for owned_by_reviews in ["_id", "reviews", "rating", "num_reviews"] {
            fields.remove(owned_by_reviews);
        }

        let updated = self
            .products
            .find_one_and_update(id_filter(product.id), doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(CatalogError::product_not_found(product.id))?;

        tracing::info!(product_id = %product.id, "Product updated successfully");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        let result = self.products.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(product_id = %id, "Product deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }

    #[instrument(skip(self, review), fields(user_id = %review.user_id))]
    async fn add_review(&self, product_id: Uuid, review: Review) -> CatalogResult<Option<Product>> {
        // One review per user: the filter only matches while the user has none
        let filter = doc! {
            "_id": uuid_bson(product_id),
            "reviews.user_id": { "$ne": uuid_bson(review.user_id) },
        };
        let review_doc = to_stored_bson(&review)?;

        let result = self
            .products
            .update_one(filter, doc! { "$push": { "reviews": review_doc } })
            .await?;
        if result.modified_count == 0 {
            return Ok(None);
        }

        tracing::info!(product_id = %product_id, review_id = %review.id, "Review added");
        self.refresh_rating(product_id).await
    }

    #[instrument(skip(self))]
    async fn remove_review(
        &self,
        product_id: Uuid,
        review_id: Uuid,
    ) -> CatalogResult<Option<Product>> {
        let result = self
            .products
            .update_one(
                id_filter(product_id),
                doc! { "$pull": { "reviews": { "_id": uuid_bson(review_id) } } },
            )
            .await?;
        if result.modified_count == 0 {
            return Ok(None);
        }

        tracing::info!(product_id = %product_id, review_id = %review_id, "Review removed");
        self.refresh_rating(product_id).await
    }

    #[instrument(skip(self))]
    async fn get_top_products(&self) -> CatalogResult<Option<TopProducts>> {
        Ok(self
            .top_products
            .find_one(doc! { "_id": TOP_PRODUCTS_KEY })
            .await?)
    }

    #[instrument(skip(self, slots))]
    async fn save_top_products(
        &self,
        slots: Vec<Option<Uuid>>,
        expected_version: Option<i64>,
    ) -> CatalogResult<Option<TopProducts>> {
        let (filter, upsert) = top_products_write(expected_version);
        let update = doc! {
            "$set": {
                "slots": to_stored_bson(&slots)?,
                "updated_at": now_bson(),
            },
            "$inc": { "version": 1_i64 },
        };

        // With upsert on, a mismatch against an existing document becomes an
        // insert of a duplicate _id
        let saved = self
            .top_products
            .find_one_and_update(filter, update)
            .upsert(upsert)
            .return_document(ReturnDocument::After)
            .await;

        match saved {
            Ok(top) => {
                if let Some(ref top) = top {
                    tracing::info!(version = top.version, "Top products saved");
                }
                Ok(top)
            }
            Err(e) if is_duplicate_key_error(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn clear_top_product(&self, product_id: Uuid) -> CatalogResult<()> {
        let id = uuid_bson(product_id);
        let pipeline = vec![doc! {
            "$set": {
                "slots": {
                    "$map": {
                        "input": "$slots",
                        "as": "slot",
                        "in": { "$cond": [{ "$eq": ["$$slot", id.clone()] }, null, "$$slot"] },
                    }
                },
                "version": { "$add": ["$version", 1_i64] },
                "updated_at": now_bson(),
            }
        }];

        let result = self
            .top_products
            .update_one(doc! { "_id": TOP_PRODUCTS_KEY, "slots": id }, pipeline)
            .await?;
        if result.modified_count > 0 {
            tracing::info!(product_id = %product_id, "Removed product from top products");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoCatalogRepository::build_filter(&ProductFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_price_range() {
        let filter = ProductFilter {
            min_price: Some(10.0),
            max_price: Some(50.0),
            ..Default::default()
        };
        let doc = MongoCatalogRepository::build_filter(&filter);
        let price = doc.get_document("price").unwrap();
        assert_eq!(price.get_f64("$gte").unwrap(), 10.0);
        assert_eq!(price.get_f64("$lte").unwrap(), 50.0);
    }

    #[test]
    fn test_build_filter_min_price_only() {
        let filter = ProductFilter {
            min_price: Some(5.0),
            ..Default::default()
        };
        let doc = MongoCatalogRepository::build_filter(&filter);
        let price = doc.get_document("price").unwrap();
        assert!(price.contains_key("$gte"));
        assert!(!price.contains_key("$lte"));
    }

    #[test]
    fn test_build_filter_category_and_search() {
        let filter = ProductFilter {
            category_id: Some(Uuid::now_v7()),
            search: Some("serum".to_string()),
            ..Default::default()
        };
        let doc = MongoCatalogRepository::build_filter(&filter);
        assert!(doc.contains_key("category_id"));
        assert_eq!(doc.get_array("$or").unwrap().len(), 3);
    }

    #[test]
    fn test_search_is_matched_literally() {
        let filter = ProductFilter {
            search: Some("c++ (v2)".to_string()),
            ..Default::default()
        };
        let doc = MongoCatalogRepository::build_filter(&filter);
        let clauses = doc.get_array("$or").unwrap();
        let name = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "c\\+\\+ \\(v2\\)");
    }

    #[test]
    fn test_only_initial_writes_may_create_top_products() {
        let (filter, upsert) = top_products_write(None);
        assert!(upsert);
        assert!(!filter.contains_key("version"));

        let (filter, upsert) = top_products_write(Some(0));
        assert!(upsert);
        assert_eq!(filter.get_i64("version").unwrap(), 0);

        let (filter, upsert) = top_products_write(Some(5));
        assert!(!upsert);
        assert_eq!(filter.get_i64("version").unwrap(), 5);
    }

    #[test]
    fn test_category_filter_matches_stored_encoding() {
        let category_id = Uuid::now_v7();
        let filter = ProductFilter {
            category_id: Some(category_id),
            ..Default::default()
        };
        let doc = MongoCatalogRepository::build_filter(&filter);
        assert_eq!(doc.get("category_id"), Some(&uuid_bson(category_id)));
    }

    async fn test_db(prefix: &str) -> Database {
        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
        client.database(&format!("{prefix}_{}", Uuid::now_v7().simple()))
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_top_products_version_conflict() {
        let db = test_db("catalog_test").await;
        let repo = MongoCatalogRepository::new(&db);

        // Nothing stored yet: only version 0 (or none) may create the document
        let ahead = repo.save_top_products(vec![None; 8], Some(5)).await.unwrap();
        assert!(ahead.is_none());
        assert!(repo.get_top_products().await.unwrap().is_none());

        let first = repo.save_top_products(vec![None; 8], Some(0)).await.unwrap();
        assert_eq!(first.unwrap().version, 1);

        let stale = repo.save_top_products(vec![None; 8], Some(0)).await.unwrap();
        assert!(stale.is_none());

        let unversioned = repo.save_top_products(vec![None; 8], None).await.unwrap();
        assert_eq!(unversioned.unwrap().version, 2);

        db.drop().await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_deleted_product_leaves_top_slots() {
        use crate::models::CreateProduct;

        let db = test_db("catalog_test").await;
        let repo = MongoCatalogRepository::new(&db);

        let product = repo
            .create_product(Product::new(CreateProduct {
                name: "Serum".to_string(),
                description: String::new(),
                brand: None,
                price: 12.0,
                images: vec!["https://img.example.com/serum.png".to_string()],
                category_id: Uuid::now_v7(),
                stock: 3,
            }))
            .await
            .unwrap();
        assert!(repo.get_product(product.id).await.unwrap().is_some());

        repo.save_top_products(vec![Some(product.id), None], None)
            .await
            .unwrap();
        repo.clear_top_product(product.id).await.unwrap();

        let top = repo.get_top_products().await.unwrap().unwrap();
        assert_eq!(top.slots, vec![None, None]);
        assert_eq!(top.version, 2);

        db.drop().await.unwrap();
    }
}
