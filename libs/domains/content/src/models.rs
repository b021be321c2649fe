use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Quizzes
// ---------------------------------------------------------------------------

/// `correct_option`, when set, has to point at one of the options
fn validate_question(question: &Question) -> Result<(), ValidationError> {
    match question.correct_option {
        Some(index) if index >= question.options.len() => {
            Err(ValidationError::new("correct_option_out_of_range"))
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_question"))]
pub struct Question {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    #[validate(length(min = 2, max = 10, message = "a question needs at least two options"))]
    pub options: Vec<String>,
    /// Index into `options`; questions without one are not scored
    pub correct_option: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Quiz {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub questions: Vec<Question>,
    pub active: bool,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateQuiz {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(length(min = 1), nested)]
    pub questions: Vec<Question>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateQuiz {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(length(min = 1), nested)]
    pub questions: Option<Vec<Question>>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct QuizFilter {
    /// Also list quizzes that are switched off
    #[serde(default)]
    pub include_inactive: bool,
}

/// Question as served to quiz takers, without the answer
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicQuestion {
    pub text: String,
    pub options: Vec<String>,
}

/// Quiz read model for anonymous callers
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct QuizResponse {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub questions: Vec<PublicQuestion>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Quiz> for QuizResponse {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            title: quiz.title,
            description: quiz.description,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| PublicQuestion {
                    text: q.text,
                    options: q.options,
                })
                .collect(),
            active: quiz.active,
            created_at: quiz.created_at,
        }
    }
}

/// Chosen option index per question, in question order; null skips
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct QuizSubmission {
    pub answers: Vec<Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QuizScore {
    pub score: usize,
    /// Number of questions that have a correct option
    pub total: usize,
}

impl Quiz {
    pub fn new(input: CreateQuiz) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            questions: input.questions,
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateQuiz) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(questions) = update.questions {
            self.questions = questions;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        self.updated_at = Utc::now();
    }

    pub fn score(&self, answers: &[Option<usize>]) -> QuizScore {
        let mut score = QuizScore { score: 0, total: 0 };
        for (i, question) in self.questions.iter().enumerate() {
            let Some(correct) = question.correct_option else {
                continue;
            };
            score.total += 1;
            if answers.get(i).copied().flatten() == Some(correct) {
                score.score += 1;
            }
        }
        score
    }
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

fn validate_offer_window(input: &CreateOffer) -> Result<(), ValidationError> {
    check_window(input.valid_from, input.valid_until)
}

fn check_window(
    from: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match (from, until) {
        (Some(from), Some(until)) if until < from => {
            Err(ValidationError::new("valid_until_before_valid_from"))
        }
        _ => Ok(()),
    }
}

/// Promotional offer, optionally tied to a clinic
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Offer {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub discount_percent: f64,
    pub image: Option<String>,
    pub clinic_id: Option<Uuid>,
    #[serde(default, with = "database::mongodb::codec::datetime_opt")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, with = "database::mongodb::codec::datetime_opt")]
    pub valid_until: Option<DateTime<Utc>>,
    pub active: bool,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_offer_window"))]
pub struct CreateOffer {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount_percent: f64,
    #[validate(url)]
    pub image: Option<String>,
    pub clinic_id: Option<Uuid>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOffer {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub discount_percent: Option<f64>,
    #[validate(url)]
    pub image: Option<String>,
    pub clinic_id: Option<Uuid>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct OfferFilter {
    /// Only active offers whose validity window contains now
    #[serde(default)]
    pub current: bool,
    pub clinic_id: Option<Uuid>,
}

impl Offer {
    pub fn new(input: CreateOffer) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            discount_percent: input.discount_percent,
            image: input.image,
            clinic_id: input.clinic_id,
            valid_from: input.valid_from,
            valid_until: input.valid_until,
            active: input.active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: UpdateOffer) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(discount_percent) = update.discount_percent {
            self.discount_percent = discount_percent;
        }
        if let Some(image) = update.image {
            self.image = Some(image);
        }
        if let Some(clinic_id) = update.clinic_id {
            self.clinic_id = Some(clinic_id);
        }
        if let Some(valid_from) = update.valid_from {
            self.valid_from = Some(valid_from);
        }
        if let Some(valid_until) = update.valid_until {
            self.valid_until = Some(valid_until);
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        self.updated_at = Utc::now();
    }

    pub fn validity_window_ok(&self) -> bool {
        check_window(self.valid_from, self.valid_until).is_ok()
    }

    pub fn is_current(&self, now: DateTime<Utc>) -> bool {
        self.active
            && self.valid_from.is_none_or(|from| from <= now)
            && self.valid_until.is_none_or(|until| now <= until)
    }
}

// ---------------------------------------------------------------------------
// Shorts
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ShortPlatform {
    Youtube,
    Instagram,
}

/// Short-form video shown on the landing page
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Short {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub platform: ShortPlatform,
    pub embed_url: String,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "database::mongodb::codec::datetime")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateShort {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(url)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateShort {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(url)]
    pub url: Option<String>,
}

impl Short {
    pub fn new(title: String, url: String, platform: ShortPlatform, embed_url: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title,
            url,
            platform,
            embed_url,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn question(options: usize, correct: Option<usize>) -> Question {
        Question {
            text: "Which?".to_string(),
            options: (0..options).map(|i| format!("option {i}")).collect(),
            correct_option: correct,
        }
    }

    #[test]
    fn test_question_validation() {
        assert!(question(2, Some(1)).validate().is_ok());
        assert!(question(2, None).validate().is_ok());
        assert!(question(1, None).validate().is_err());
        assert!(question(3, Some(3)).validate().is_err());
    }

    #[test]
    fn test_create_quiz_validates_nested_questions() {
        let input = CreateQuiz {
            title: "Skin type".to_string(),
            description: String::new(),
            questions: vec![question(2, Some(0)), question(2, Some(5))],
            active: true,
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_quiz_score_counts_only_answerable_questions() {
        let quiz = Quiz::new(CreateQuiz {
            title: "Skin type".to_string(),
            description: String::new(),
            questions: vec![
                question(3, Some(2)),
                question(2, None),
                question(2, Some(0)),
                question(2, Some(1)),
            ],
            active: true,
        });

        let score = quiz.score(&[Some(2), Some(1), Some(1)]);
        assert_eq!(score, QuizScore { score: 1, total: 3 });

        let all = quiz.score(&[Some(2), None, Some(0), Some(1), Some(0)]);
        assert_eq!(all, QuizScore { score: 3, total: 3 });
    }

    #[test]
    fn test_public_quiz_hides_answers() {
        let quiz = Quiz::new(CreateQuiz {
            title: "Skin type".to_string(),
            description: String::new(),
            questions: vec![question(2, Some(1))],
            active: true,
        });
        let json = serde_json::to_value(QuizResponse::from(quiz)).unwrap();
        assert!(json["questions"][0].get("correct_option").is_none());
    }

    fn offer_input(from: Option<DateTime<Utc>>, until: Option<DateTime<Utc>>) -> CreateOffer {
        CreateOffer {
            title: "Spring sale".to_string(),
            description: String::new(),
            discount_percent: 15.0,
            image: None,
            clinic_id: None,
            valid_from: from,
            valid_until: until,
            active: true,
        }
    }

    #[test]
    fn test_offer_window_validation() {
        let now = Utc::now();
        assert!(offer_input(Some(now), Some(now)).validate().is_ok());
        assert!(offer_input(None, Some(now)).validate().is_ok());
        assert!(
            offer_input(Some(now), Some(now - Duration::days(1)))
                .validate()
                .is_err()
        );

        let mut discount = offer_input(None, None);
        discount.discount_percent = 100.5;
        assert!(discount.validate().is_err());
    }

    #[test]
    fn test_offer_is_current() {
        let now = Utc::now();
        let day = Duration::days(1);

        assert!(Offer::new(offer_input(None, None)).is_current(now));
        assert!(Offer::new(offer_input(Some(now - day), Some(now + day))).is_current(now));
        assert!(!Offer::new(offer_input(Some(now + day), None)).is_current(now));
        assert!(!Offer::new(offer_input(None, Some(now - day))).is_current(now));

        let mut inactive = Offer::new(offer_input(None, None));
        inactive.active = false;
        assert!(!inactive.is_current(now));
    }

    #[test]
    fn test_offer_update_can_break_window() {
        let now = Utc::now();
        let mut offer = Offer::new(offer_input(Some(now), None));
        offer.apply_update(UpdateOffer {
            valid_until: Some(now - Duration::hours(1)),
            ..Default::default()
        });
        assert!(!offer.validity_window_ok());
    }
}
