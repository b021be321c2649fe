use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Default length of the top-products slot list
pub const DEFAULT_TOP_PRODUCTS_SLOTS: usize = 8;

fn default_limit() -> i64 {
    50
}

/// Product category (e.g. "Skin care", "Supplements")
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductCategory {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub image: Option<String>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(url)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
}

impl ProductCategory {
    pub fn new(input: CreateProductCategory) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description,
            image: input.image,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProductCategory) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        self.updated_at = Utc::now();
    }
}

/// Customer review embedded in a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Review {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub user_id: Uuid,
    /// Display name of the reviewer at the time of writing
    pub name: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: String,
}

impl Review {
    pub fn new(user_id: Uuid, name: String, input: CreateReview) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            name,
            rating: input.rating,
            comment: input.comment,
            created_at: Utc::now(),
        }
    }
}

/// Product entity as stored in the `products` collection
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    /// Image URLs, never empty
    pub images: Vec<String>,
    pub category_id: Uuid,
    #[serde(default)]
    pub stock: u32,
    pub brand: Option<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
    /// Mean review rating, 0 without reviews
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_reviews: u32,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 10000))]
    pub description: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub images: Vec<String>,
    pub category_id: Uuid,
    #[serde(default)]
    pub stock: u32,
    #[validate(length(max = 100))]
    pub brand: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(length(min = 1, message = "at least one image is required"))]
    pub images: Option<Vec<String>>,
    pub category_id: Option<Uuid>,
    pub stock: Option<u32>,
    #[validate(length(max = 100))]
    pub brand: Option<String>,
}

/// Query filters for listing products
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductFilter {
    pub category_id: Option<Uuid>,
    /// Search in name and description
    pub search: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: u64,
}

impl Product {
    pub fn new(input: CreateProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name.trim().to_string(),
            description: input.description,
            price: input.price,
            images: input.images,
            category_id: input.category_id,
            stock: input.stock,
            brand: input.brand,
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(category_id) = update.category_id {
            self.category_id = category_id;
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(brand) = update.brand {
            self.brand = Some(brand);
        }
        self.updated_at = Utc::now();
    }

    pub fn has_review_from(&self, user_id: Uuid) -> bool {
        self.reviews.iter().any(|r| r.user_id == user_id)
    }

    /// Recompute `rating` and `num_reviews` from the embedded reviews
    pub fn recompute_rating(&mut self) {
        self.num_reviews = self.reviews.len() as u32;
        self.rating = if self.reviews.is_empty() {
            0.0
        } else {
            let sum: u32 = self.reviews.iter().map(|r| r.rating as u32).sum();
            sum as f64 / self.reviews.len() as f64
        };
    }
}

/// Stored top-products singleton
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TopProducts {
    pub slots: Vec<Option<Uuid>>,
    /// Incremented on every successful write
    pub version: i64,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

impl TopProducts {
    pub fn empty(len: usize) -> Self {
        Self {
            slots: vec![None; len],
            version: 0,
            updated_at: Utc::now(),
        }
    }
}

/// Top products with each slot resolved to its product
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopProductsResponse {
    pub slots: Vec<Option<Product>>,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Replace the slot list. `version` enables optimistic concurrency.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTopProducts {
    pub slots: Vec<Option<Uuid>>,
    pub version: Option<i64>,
}

/// Pad `slots` with nulls to exactly `len` entries.
///
/// Rejects lists longer than `len` and repeated product ids.
pub fn normalize_slots(
    mut slots: Vec<Option<Uuid>>,
    len: usize,
) -> Result<Vec<Option<Uuid>>, String> {
    if slots.len() > len {
        return Err(format!(
            "at most {} slots are allowed, got {}",
            len,
            slots.len()
        ));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = slots.iter().flatten().find(|id| !seen.insert(**id)) {
        return Err(format!("product {} appears more than once", dup));
    }

    slots.resize(len, None);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_recompute_rating() {
        let mut product = product();
        product.recompute_rating();
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.num_reviews, 0);

        for rating in [5, 4] {
            product.reviews.push(Review::new(
                Uuid::now_v7(),
                "Jane".to_string(),
                CreateReview {
                    rating,
                    comment: String::new(),
                },
            ));
        }
        product.recompute_rating();
        assert_eq!(product.rating, 4.5);
        assert_eq!(product.num_reviews, 2);
    }

    #[test]
    fn test_review_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let input = CreateReview {
                rating,
                comment: String::new(),
            };
            assert_eq!(input.validate().is_ok(), ok, "rating {rating}");
        }
    }

    #[test]
    fn test_normalize_slots_pads_with_nulls() {
        let id = Uuid::now_v7();
        let slots = normalize_slots(vec![Some(id)], 4).unwrap();
        assert_eq!(slots, vec![Some(id), None, None, None]);
    }

    #[test]
    fn test_normalize_slots_rejects_too_many() {
        let slots = vec![None; 9];
        assert!(normalize_slots(slots, 8).is_err());
    }

    #[test]
    fn test_normalize_slots_rejects_duplicates() {
        let id = Uuid::now_v7();
        let err = normalize_slots(vec![Some(id), None, Some(id)], 8).unwrap_err();
        assert!(err.contains(&id.to_string()));
    }

    #[test]
    fn test_create_product_requires_images() {
        let input = CreateProduct {
            name: "Serum".to_string(),
            description: String::new(),
            price: 1.0,
            images: vec![],
            category_id: Uuid::now_v7(),
            stock: 0,
            brand: None,
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("images"));
    }
}
