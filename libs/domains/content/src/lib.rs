//! Content Domain
//!
//! Marketing content managed by admins and read anonymously: quizzes with
//! server-side scoring, promotional offers and YouTube/Instagram shorts.
//!
//! ```rust,ignore
//! use domain_content::{ContentService, MongoContentRepository, handlers};
//!
//! let repository = MongoContentRepository::new(&db);
//! repository.ensure_indexes().await?;
//! let router = handlers::router(ContentService::new(repository), jwt_auth);
//! ```

pub mod embed;
pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ContentError, ContentResult};
pub use handlers::ApiDoc;
pub use models::{
    CreateOffer, CreateQuiz, CreateShort, Offer, OfferFilter, PublicQuestion, Question, Quiz,
    QuizFilter, QuizResponse, QuizScore, QuizSubmission, Short, ShortPlatform, UpdateOffer,
    UpdateQuiz, UpdateShort,
};
pub use mongodb::MongoContentRepository;
pub use repository::ContentRepository;
pub use service::ContentService;
