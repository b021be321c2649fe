use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ContentResult;
use crate::models::{Offer, Quiz, Short};

/// Repository trait for quizzes, offers and shorts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn create_quiz(&self, quiz: Quiz) -> ContentResult<Quiz>;

    async fn get_quiz(&self, id: Uuid) -> ContentResult<Option<Quiz>>;

    /// Newest first; inactive quizzes only when asked for
    async fn list_quizzes(&self, include_inactive: bool) -> ContentResult<Vec<Quiz>>;

    async fn update_quiz(&self, quiz: Quiz) -> ContentResult<Quiz>;

    async fn delete_quiz(&self, id: Uuid) -> ContentResult<bool>;

    async fn create_offer(&self, offer: Offer) -> ContentResult<Offer>;

    async fn get_offer(&self, id: Uuid) -> ContentResult<Option<Offer>>;

    /// Newest first
    async fn list_offers(&self, clinic_id: Option<Uuid>) -> ContentResult<Vec<Offer>>;

    async fn update_offer(&self, offer: Offer) -> ContentResult<Offer>;

    async fn delete_offer(&self, id: Uuid) -> ContentResult<bool>;

    async fn create_short(&self, short: Short) -> ContentResult<Short>;

    async fn get_short(&self, id: Uuid) -> ContentResult<Option<Short>>;

    /// Newest first
    async fn list_shorts(&self) -> ContentResult<Vec<Short>>;

    async fn update_short(&self, short: Short) -> ContentResult<Short>;

    async fn delete_short(&self, id: Uuid) -> ContentResult<bool>;
}
