//! MongoDB implementation of ContentRepository

use async_trait::async_trait;
use database::mongodb::{id_filter, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ContentError, ContentResult};
use crate::models::{Offer, Quiz, Short};
use crate::repository::ContentRepository;

async fn find_newest<T>(collection: &Collection<T>, filter: Document) -> ContentResult<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    let cursor = collection
        .find(filter)
        // v7 ids are time-ordered; they break ties within one millisecond
        .sort(doc! { "created_at": -1, "_id": -1 })
        .await?;
    Ok(cursor.try_collect().await?)
}

/// Replace a whole document; false when nothing matched
async fn replace<T>(collection: &Collection<T>, id: Uuid, value: &T) -> ContentResult<bool>
where
    T: Serialize + Send + Sync,
{
    let result = collection.replace_one(id_filter(id), value).await?;
    Ok(result.matched_count > 0)
}

async fn delete<T: Send + Sync>(collection: &Collection<T>, id: Uuid) -> ContentResult<bool> {
    let result = collection.delete_one(id_filter(id)).await?;
    Ok(result.deleted_count > 0)
}

/// MongoDB implementation of the ContentRepository
pub struct MongoContentRepository {
    quizzes: Collection<Quiz>,
    offers: Collection<Offer>,
    shorts: Collection<Short>,
}

impl MongoContentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            quizzes: db.collection("quizzes"),
            offers: db.collection("offers"),
            shorts: db.collection("shorts"),
        }
    }

    pub async fn ensure_indexes(&self) -> ContentResult<()> {
        let plain = |keys: Document| IndexModel::builder().keys(keys).build();

        self.quizzes
            .create_index(plain(doc! { "active": 1, "created_at": -1 }))
            .await?;
        self.offers
            .create_index(plain(doc! { "clinic_id": 1 }))
            .await?;
        self.shorts
            .create_index(plain(doc! { "created_at": -1 }))
            .await?;
        Ok(())
    }

    fn quiz_filter(include_inactive: bool) -> Document {
        if include_inactive {
            Document::new()
        } else {
            doc! { "active": true }
        }
    }

    fn offer_filter(clinic_id: Option<Uuid>) -> Document {
        match clinic_id {
            Some(id) => doc! { "clinic_id": uuid_bson(id) },
            None => Document::new(),
        }
    }
}

#[async_trait]
impl ContentRepository for MongoContentRepository {
    #[instrument(skip(self, quiz), fields(quiz_id = %quiz.id))]
    async fn create_quiz(&self, quiz: Quiz) -> ContentResult<Quiz> {
        self.quizzes.insert_one(&quiz).await?;
        tracing::info!(quiz_id = %quiz.id, "Quiz created successfully");
        Ok(quiz)
    }

    #[instrument(skip(self))]
    async fn get_quiz(&self, id: Uuid) -> ContentResult<Option<Quiz>> {
        Ok(self.quizzes.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_quizzes(&self, include_inactive: bool) -> ContentResult<Vec<Quiz>> {
        find_newest(&self.quizzes, Self::quiz_filter(include_inactive)).await
    }

    #[instrument(skip(self, quiz), fields(quiz_id = %quiz.id))]
    async fn update_quiz(&self, quiz: Quiz) -> ContentResult<Quiz> {
        if !replace(&self.quizzes, quiz.id, &quiz).await? {
            return Err(ContentError::quiz_not_found(quiz.id));
        }
        tracing::info!(quiz_id = %quiz.id, "Quiz updated successfully");
        Ok(quiz)
    }

    #[instrument(skip(self))]
    async fn delete_quiz(&self, id: Uuid) -> ContentResult<bool> {
        let deleted = delete(&self.quizzes, id).await?;
        if deleted {
            tracing::info!(quiz_id = %id, "Quiz deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self, offer), fields(offer_id = %offer.id))]
    async fn create_offer(&self, offer: Offer) -> ContentResult<Offer> {
        self.offers.insert_one(&offer).await?;
        tracing::info!(offer_id = %offer.id, "Offer created successfully");
        Ok(offer)
    }

    #[instrument(skip(self))]
    async fn get_offer(&self, id: Uuid) -> ContentResult<Option<Offer>> {
        Ok(self.offers.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_offers(&self, clinic_id: Option<Uuid>) -> ContentResult<Vec<Offer>> {
        find_newest(&self.offers, Self::offer_filter(clinic_id)).await
    }

    #[instrument(skip(self, offer), fields(offer_id = %offer.id))]
    async fn update_offer(&self, offer: Offer) -> ContentResult<Offer> {
        if !replace(&self.offers, offer.id, &offer).await? {
            return Err(ContentError::offer_not_found(offer.id));
        }
        tracing::info!(offer_id = %offer.id, "Offer updated successfully");
        Ok(offer)
    }

    #[instrument(skip(self))]
    async fn delete_offer(&self, id: Uuid) -> ContentResult<bool> {
        let deleted = delete(&self.offers, id).await?;
        if deleted {
            tracing::info!(offer_id = %id, "Offer deleted successfully");
        }
        Ok(deleted)
    }

    #[instrument(skip(self, short), fields(short_id = %short.id))]
    async fn create_short(&self, short: Short) -> ContentResult<Short> {
        self.shorts.insert_one(&short).await?;
        tracing::info!(short_id = %short.id, platform = %short.platform, "Short created successfully");
        Ok(short)
    }

    #[instrument(skip(self))]
    async fn get_short(&self, id: Uuid) -> ContentResult<Option<Short>> {
        Ok(self.shorts.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_shorts(&self) -> ContentResult<Vec<Short>> {
        find_newest(&self.shorts, Document::new()).await
    }

    #[instrument(skip(self, short), fields(short_id = %short.id))]
    async fn update_short(&self, short: Short) -> ContentResult<Short> {
        if !replace(&self.shorts, short.id, &short).await? {
            return Err(ContentError::short_not_found(short.id));
        }
        tracing::info!(short_id = %short.id, "Short updated successfully");
        Ok(short)
    }

    #[instrument(skip(self))]
    async fn delete_short(&self, id: Uuid) -> ContentResult<bool> {
        let deleted = delete(&self.shorts, id).await?;
        if deleted {
            tracing::info!(short_id = %id, "Short deleted successfully");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiz_filter() {
        assert!(MongoContentRepository::quiz_filter(true).is_empty());
        assert_eq!(
            MongoContentRepository::quiz_filter(false)
                .get_bool("active")
                .unwrap(),
            true
        );
    }

    #[test]
    fn test_offer_filter() {
        assert!(MongoContentRepository::offer_filter(None).is_empty());
        let clinic_id = Uuid::now_v7();
        let filter = MongoContentRepository::offer_filter(Some(clinic_id));
        assert_eq!(filter.get("clinic_id"), Some(&uuid_bson(clinic_id)));
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_shorts_newest_first() {
        use crate::models::ShortPlatform;

        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
        let db = client.database(&format!("content_test_{}", Uuid::now_v7().simple()));
        let repo = MongoContentRepository::new(&db);

        for title in ["first", "second"] {
            repo.create_short(Short::new(
                title.to_string(),
                "https://youtu.be/abc".to_string(),
                ShortPlatform::Youtube,
                "https://www.youtube.com/embed/abc".to_string(),
            ))
            .await
            .unwrap();
        }

        let shorts = repo.list_shorts().await.unwrap();
        assert_eq!(shorts[0].title, "second");

        let found = repo.get_short(shorts[1].id).await.unwrap().unwrap();
        assert_eq!(found.title, "first");

        db.drop().await.unwrap();
    }
}
