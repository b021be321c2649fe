//! Catalog Service - products, categories, reviews and the top-products list

use axum_helpers::JwtClaims;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    CreateProduct, CreateProductCategory, CreateReview, Product, ProductCategory, ProductFilter,
    Review, TopProducts, TopProductsResponse, UpdateProduct, UpdateProductCategory,
    UpdateTopProducts, normalize_slots,
};
use crate::repository::CatalogRepository;

fn validation<E: std::fmt::Display>(err: E) -> CatalogError {
    CatalogError::Validation(err.to_string())
}

pub struct CatalogService<R: CatalogRepository> {
    repository: Arc<R>,
    /// Fixed length of the top-products slot list
    top_slots: usize,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repository: R, top_slots: usize) -> Self {
        Self {
            repository: Arc::new(repository),
            top_slots,
        }
    }

    pub fn top_slots(&self) -> usize {
        self.top_slots
    }

    async fn require_category(&self, id: Uuid) -> CatalogResult<ProductCategory> {
        self.repository
            .get_category(id)
            .await?
            .ok_or(CatalogError::category_not_found(id))
    }

    // Categories

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> CatalogResult<Vec<ProductCategory>> {
        self.repository.list_categories().await
    }

    #[instrument(skip(self))]
    pub async fn get_category(&self, id: Uuid) -> CatalogResult<ProductCategory> {
        self.require_category(id).await
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_category(
        &self,
        input: CreateProductCategory,
    ) -> CatalogResult<ProductCategory> {
        input.validate().map_err(validation)?;

        let category = ProductCategory::new(input);
        if self.repository.category_name_exists(&category.name).await? {
            return Err(CatalogError::DuplicateCategoryName(category.name));
        }
        self.repository.create_category(category).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_category(
        &self,
        id: Uuid,
        input: UpdateProductCategory,
    ) -> CatalogResult<ProductCategory> {
        input.validate().map_err(validation)?;

        let mut category = self.require_category(id).await?;
        let previous_name = category.name.clone();
        category.apply_update(input);

        if category.name != previous_name
            && self.repository.category_name_exists(&category.name).await?
        {
            return Err(CatalogError::DuplicateCategoryName(category.name));
        }
        self.repository.update_category(category).await
    }

    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: Uuid) -> CatalogResult<()> {
        self.require_category(id).await?;
        if self.repository.category_in_use(id).await? {
            return Err(CatalogError::CategoryInUse(id));
        }
        if !self.repository.delete_category(id).await? {
            return Err(CatalogError::category_not_found(id));
        }
        Ok(())
    }

    // Products

    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: ProductFilter) -> CatalogResult<Vec<Product>> {
        if matches!((filter.min_price, filter.max_price), (Some(min), Some(max)) if min > max) {
            return Err(CatalogError::Validation(
                "min_price must not exceed max_price".to_string(),
            ));
        }
        self.repository.list_products(filter).await
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> CatalogResult<Product> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(CatalogError::product_not_found(id))
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_product(&self, input: CreateProduct) -> CatalogResult<Product> {
        input.validate().map_err(validation)?;
        self.require_category(input.category_id).await?;

        self.repository.create_product(Product::new(input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(&self, id: Uuid, input: UpdateProduct) -> CatalogResult<Product> {
        input.validate().map_err(validation)?;

        let mut product = self.get_product(id).await?;
        if let Some(category_id) = input.category_id {
            self.require_category(category_id).await?;
        }

        product.apply_update(input);
        self.repository.update_product(product).await
    }

    /// Delete a product and drop it from the top-products slots
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> CatalogResult<()> {
        if !self.repository.delete_product(id).await? {
            return Err(CatalogError::product_not_found(id));
        }
        self.repository.clear_top_product(id).await
    }

    // Reviews

    #[instrument(skip(self))]
    pub async fn list_reviews(&self, product_id: Uuid) -> CatalogResult<Vec<Review>> {
        Ok(self.get_product(product_id).await?.reviews)
    }

    #[instrument(skip(self, actor, input), fields(actor = %actor.sub))]
    pub async fn add_review(
        &self,
        actor: &JwtClaims,
        product_id: Uuid,
        input: CreateReview,
    ) -> CatalogResult<Product> {
        input.validate().map_err(validation)?;
        let user_id = actor
            .subject_id()
            .ok_or_else(|| CatalogError::Forbidden("Token subject is not a user id".to_string()))?;

        let product = self.get_product(product_id).await?;
        if product.has_review_from(user_id) {
            return Err(CatalogError::DuplicateReview);
        }

        let review = Review::new(user_id, actor.name.clone(), input);
        // The conditional write also catches a review that raced in
        self.repository
            .add_review(product_id, review)
            .await?
            .ok_or(CatalogError::DuplicateReview)
    }

    /// Remove a review; allowed to admins and to the review's author
    #[instrument(skip(self, actor), fields(actor = %actor.sub))]
    pub async fn delete_review(
        &self,
        actor: &JwtClaims,
        product_id: Uuid,
        review_id: Uuid,
    ) -> CatalogResult<Product> {
        let product = self.get_product(product_id).await?;
        let review = product
            .reviews
            .iter()
            .find(|r| r.id == review_id)
            .ok_or(CatalogError::review_not_found(review_id))?;

        let is_author = actor.subject_id() == Some(review.user_id);
        if !actor.is_admin() && !is_author {
            return Err(CatalogError::Forbidden(
                "Only an admin or the author may delete this review".to_string(),
            ));
        }

        self.repository
            .remove_review(product_id, review_id)
            .await?
            .ok_or(CatalogError::review_not_found(review_id))
    }

    // Top products

    /// Stored slots fitted to the configured length
    async fn current_top_products(&self) -> CatalogResult<TopProducts> {
        let mut top = self
            .repository
            .get_top_products()
            .await?
            .unwrap_or_else(|| TopProducts::empty(self.top_slots));
        top.slots.resize(self.top_slots, None);
        Ok(top)
    }

    async fn populate(&self, top: TopProducts) -> CatalogResult<TopProductsResponse> {
        let ids: Vec<Uuid> = top.slots.iter().flatten().copied().collect();
        let mut products: HashMap<Uuid, Product> = self
            .repository
            .find_products(ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // Deleted products resolve to null
        let slots = top
            .slots
            .iter()
            .map(|slot| slot.and_then(|id| products.remove(&id)))
            .collect();

        Ok(TopProductsResponse {
            slots,
            version: top.version,
            updated_at: top.updated_at,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_top_products(&self) -> CatalogResult<TopProductsResponse> {
        let top = self.current_top_products().await?;
        self.populate(top).await
    }

    #[instrument(skip(self, input), fields(version = ?input.version))]
    pub async fn set_top_products(
        &self,
        input: UpdateTopProducts,
    ) -> CatalogResult<TopProductsResponse> {
        let slots =
            normalize_slots(input.slots, self.top_slots).map_err(CatalogError::InvalidTopProducts)?;

        let ids: Vec<Uuid> = slots.iter().flatten().copied().collect();
        let found = self.repository.find_products(ids.clone()).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|p| p.id == **id)) {
            return Err(CatalogError::InvalidTopProducts(format!(
                "unknown product {}",
                missing
            )));
        }

        let saved = self
            .repository
            .save_top_products(slots, input.version)
            .await?;

        let top = match saved {
            Some(top) => top,
            None => {
                let actual = self
                    .repository
                    .get_top_products()
                    .await?
                    .map(|t| t.version)
                    .unwrap_or(0);
                tracing::warn!(
                    expected = ?input.version,
                    actual,
                    "Top products version conflict"
                );
                return Err(CatalogError::VersionConflict {
                    expected: input.version.unwrap_or(0),
                    actual,
                });
            }
        };

        self.populate(top).await
    }
}

impl<R: CatalogRepository> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            top_slots: self.top_slots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockCatalogRepository;
    use axum_helpers::{JwtAuth, JwtConfig, Role};
    use chrono::Utc;
    use mockall::predicate::{always, eq};

    fn claims(role: Role, id: Uuid) -> JwtClaims {
        let auth = JwtAuth::new(&JwtConfig::new("catalog-test-secret-long-enough-01234"));
        let token = auth.create_token(id, "jane@example.com", "Jane", role).unwrap();
        auth.verify_token(&token).unwrap()
    }

    fn product() -> Product {
        Product::new(CreateProduct {
            name: "Serum".to_string(),
            description: String::new(),
            price: 19.5,
            images: vec!["https://img.example.com/serum.png".to_string()],
            category_id: Uuid::now_v7(),
            stock: 3,
            brand: None,
        })
    }

    #[tokio::test]
    async fn test_create_product_requires_existing_category() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_get_category().returning(|_| Ok(None));
        repo.expect_create_product().never();

        let service = CatalogService::new(repo, 8);
        let err = service
            .create_product(CreateProduct {
                name: "Serum".to_string(),
                description: String::new(),
                price: 19.5,
                images: vec!["https://img.example.com/serum.png".to_string()],
                category_id: Uuid::now_v7(),
                stock: 1,
                brand: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { entity: "Product category", .. }));
    }

    #[tokio::test]
    async fn test_delete_product_clears_top_slot() {
        let id = Uuid::now_v7();
        let mut repo = MockCatalogRepository::new();
        repo.expect_delete_product()
            .with(eq(id))
            .returning(|_| Ok(true));
        repo.expect_clear_top_product()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(()));

        let service = CatalogService::new(repo, 8);
        service.delete_product(id).await.unwrap();
    }

    #[tokio::test]
    async fn test_second_review_from_same_user_conflicts() {
        let user_id = Uuid::now_v7();
        let mut stored = product();
        stored.reviews.push(Review::new(
            user_id,
            "Jane".to_string(),
            CreateReview {
                rating: 4,
                comment: String::new(),
            },
        ));
        let product_id = stored.id;

        let mut repo = MockCatalogRepository::new();
        repo.expect_get_product()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_add_review().never();

        let service = CatalogService::new(repo, 8);
        let err = service
            .add_review(
                &claims(Role::User, user_id),
                product_id,
                CreateReview {
                    rating: 5,
                    comment: String::new(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateReview));
    }

    #[tokio::test]
    async fn test_review_by_other_user_cannot_be_deleted() {
        let mut stored = product();
        let review = Review::new(
            Uuid::now_v7(),
            "Jane".to_string(),
            CreateReview {
                rating: 4,
                comment: String::new(),
            },
        );
        let review_id = review.id;
        stored.reviews.push(review);
        let product_id = stored.id;

        let mut repo = MockCatalogRepository::new();
        repo.expect_get_product()
            .returning(move |_| Ok(Some(stored.clone())));
        repo.expect_remove_review().never();

        let service = CatalogService::new(repo, 8);
        let err = service
            .delete_review(&claims(Role::User, Uuid::now_v7()), product_id, review_id)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_top_products_defaults_to_empty_slots() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_get_top_products().returning(|| Ok(None));
        repo.expect_find_products().returning(|_| Ok(vec![]));

        let service = CatalogService::new(repo, 8);
        let top = service.get_top_products().await.unwrap();
        assert_eq!(top.slots.len(), 8);
        assert!(top.slots.iter().all(Option::is_none));
        assert_eq!(top.version, 0);
    }

    #[tokio::test]
    async fn test_get_top_products_reports_deleted_product_as_null() {
        let live = product();
        let live_id = live.id;
        let gone = Uuid::now_v7();

        let mut repo = MockCatalogRepository::new();
        repo.expect_get_top_products().returning(move || {
            Ok(Some(TopProducts {
                slots: vec![Some(gone), Some(live_id)],
                version: 3,
                updated_at: Utc::now(),
            }))
        });
        repo.expect_find_products()
            .returning(move |_| Ok(vec![live.clone()]));

        let service = CatalogService::new(repo, 4);
        let top = service.get_top_products().await.unwrap();
        assert_eq!(top.slots.len(), 4);
        assert!(top.slots[0].is_none());
        assert_eq!(top.slots[1].as_ref().unwrap().id, live_id);
    }

    #[tokio::test]
    async fn test_set_top_products_rejects_unknown_ids() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_products().returning(|_| Ok(vec![]));
        repo.expect_save_top_products().never();

        let service = CatalogService::new(repo, 8);
        let err = service
            .set_top_products(UpdateTopProducts {
                slots: vec![Some(Uuid::now_v7())],
                version: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTopProducts(_)));
    }

    #[tokio::test]
    async fn test_set_top_products_version_conflict() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_products().returning(|_| Ok(vec![]));
        repo.expect_save_top_products()
            .with(always(), eq(Some(2)))
            .returning(|_, _| Ok(None));
        repo.expect_get_top_products().returning(|| {
            Ok(Some(TopProducts {
                slots: vec![None; 8],
                version: 5,
                updated_at: Utc::now(),
            }))
        });

        let service = CatalogService::new(repo, 8);
        let err = service
            .set_top_products(UpdateTopProducts {
                slots: vec![],
                version: Some(2),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::VersionConflict {
                expected: 2,
                actual: 5
            }
        ));
    }

    #[tokio::test]
    async fn test_set_top_products_pads_before_saving() {
        let featured = product();
        let featured_id = featured.id;

        let mut repo = MockCatalogRepository::new();
        repo.expect_find_products()
            .returning(move |_| Ok(vec![featured.clone()]));
        repo.expect_save_top_products()
            .withf(move |slots, version| {
                slots.len() == 8 && slots[0] == Some(featured_id) && version.is_none()
            })
            .returning(|slots, _| {
                Ok(Some(TopProducts {
                    slots,
                    version: 1,
                    updated_at: Utc::now(),
                }))
            });

        let service = CatalogService::new(repo, 8);
        let top = service
            .set_top_products(UpdateTopProducts {
                slots: vec![Some(featured_id)],
                version: None,
            })
            .await
            .unwrap();
        assert_eq!(top.version, 1);
        assert_eq!(top.slots.len(), 8);
    }
}
