//! Content Service - quizzes, promotional offers and video shorts

use chrono::Utc;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::embed;
use crate::error::{ContentError, ContentResult};
use crate::models::{
    CreateOffer, CreateQuiz, CreateShort, Offer, OfferFilter, Quiz, QuizFilter, QuizResponse,
    QuizScore, QuizSubmission, Short, ShortPlatform, UpdateOffer, UpdateQuiz, UpdateShort,
};
use crate::repository::ContentRepository;

fn validation<E: std::fmt::Display>(err: E) -> ContentError {
    ContentError::Validation(err.to_string())
}

fn resolve_embed(url: &str) -> ContentResult<(ShortPlatform, String)> {
    embed::resolve(url).ok_or_else(|| ContentError::UnsupportedShortUrl(url.to_string()))
}

pub struct ContentService<R: ContentRepository> {
    repository: Arc<R>,
}

impl<R: ContentRepository> ContentService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    // Quizzes

    async fn find_quiz(&self, id: Uuid) -> ContentResult<Quiz> {
        self.repository
            .get_quiz(id)
            .await?
            .ok_or(ContentError::quiz_not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn list_quizzes(&self, filter: QuizFilter) -> ContentResult<Vec<QuizResponse>> {
        let quizzes = self
            .repository
            .list_quizzes(filter.include_inactive)
            .await?;
        Ok(quizzes.into_iter().map(QuizResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_quiz(&self, id: Uuid) -> ContentResult<QuizResponse> {
        Ok(self.find_quiz(id).await?.into())
    }

    #[instrument(skip(self, input))]
    pub async fn create_quiz(&self, input: CreateQuiz) -> ContentResult<Quiz> {
        input.validate().map_err(validation)?;
        self.repository.create_quiz(Quiz::new(input)).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_quiz(&self, id: Uuid, input: UpdateQuiz) -> ContentResult<Quiz> {
        input.validate().map_err(validation)?;
        let mut quiz = self.find_quiz(id).await?;
        quiz.apply_update(input);
        self.repository.update_quiz(quiz).await
    }

    #[instrument(skip(self))]
    pub async fn delete_quiz(&self, id: Uuid) -> ContentResult<()> {
        if !self.repository.delete_quiz(id).await? {
            return Err(ContentError::quiz_not_found(id));
        }
        Ok(())
    }

    /// Score a submission against an active quiz
    #[instrument(skip(self, submission))]
    pub async fn submit_quiz(
        &self,
        id: Uuid,
        submission: QuizSubmission,
    ) -> ContentResult<QuizScore> {
        let quiz = self.find_quiz(id).await?;
        if !quiz.active {
            return Err(ContentError::QuizInactive(id));
        }
        Ok(quiz.score(&submission.answers))
    }

    // Offers

    async fn find_offer(&self, id: Uuid) -> ContentResult<Offer> {
        self.repository
            .get_offer(id)
            .await?
            .ok_or(ContentError::offer_not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn list_offers(&self, filter: OfferFilter) -> ContentResult<Vec<Offer>> {
        let offers = self.repository.list_offers(filter.clinic_id).await?;
        if !filter.current {
            return Ok(offers);
        }
        let now = Utc::now();
        Ok(offers.into_iter().filter(|o| o.is_current(now)).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_offer(&self, id: Uuid) -> ContentResult<Offer> {
        self.find_offer(id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_offer(&self, input: CreateOffer) -> ContentResult<Offer> {
        input.validate().map_err(validation)?;
        self.repository.create_offer(Offer::new(input)).await
    }

    /// Partial update; the merged validity window is checked again
    #[instrument(skip(self, input))]
    pub async fn update_offer(&self, id: Uuid, input: UpdateOffer) -> ContentResult<Offer> {
        input.validate().map_err(validation)?;
        let mut offer = self.find_offer(id).await?;
        offer.apply_update(input);
        if !offer.validity_window_ok() {
            return Err(ContentError::Validation(
                "valid_until must not be before valid_from".to_string(),
            ));
        }
        self.repository.update_offer(offer).await
    }

    #[instrument(skip(self))]
    pub async fn delete_offer(&self, id: Uuid) -> ContentResult<()> {
        if !self.repository.delete_offer(id).await? {
            return Err(ContentError::offer_not_found(id));
        }
        Ok(())
    }

    // Shorts

    async fn find_short(&self, id: Uuid) -> ContentResult<Short> {
        self.repository
            .get_short(id)
            .await?
            .ok_or(ContentError::short_not_found(id))
    }

    #[instrument(skip(self))]
    pub async fn list_shorts(&self) -> ContentResult<Vec<Short>> {
        self.repository.list_shorts().await
    }

    #[instrument(skip(self))]
    pub async fn get_short(&self, id: Uuid) -> ContentResult<Short> {
        self.find_short(id).await
    }

    #[instrument(skip(self, input))]
    pub async fn create_short(&self, input: CreateShort) -> ContentResult<Short> {
        input.validate().map_err(validation)?;
        let url = input.url.trim().to_string();
        let (platform, embed_url) = resolve_embed(&url)?;
        self.repository
            .create_short(Short::new(input.title, url, platform, embed_url))
            .await
    }

    /// A new url re-derives platform and embed url
    #[instrument(skip(self, input))]
    pub async fn update_short(&self, id: Uuid, input: UpdateShort) -> ContentResult<Short> {
        input.validate().map_err(validation)?;
        let mut short = self.find_short(id).await?;

        if let Some(url) = input.url {
            let url = url.trim().to_string();
            let (platform, embed_url) = resolve_embed(&url)?;
            short.url = url;
            short.platform = platform;
            short.embed_url = embed_url;
        }
        if let Some(title) = input.title {
            short.title = title;
        }
        short.updated_at = Utc::now();

        self.repository.update_short(short).await
    }

    #[instrument(skip(self))]
    pub async fn delete_short(&self, id: Uuid) -> ContentResult<()> {
        if !self.repository.delete_short(id).await? {
            return Err(ContentError::short_not_found(id));
        }
        Ok(())
    }
}

impl<R: ContentRepository> Clone for ContentService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
