//! MongoDB implementation of OrderRepository

use async_trait::async_trait;
use database::mongodb::{id_filter, now_bson, uuid_bson};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc},
    options::{FindOptions, ReturnDocument},
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::OrderResult;
use crate::models::{ClinicSync, Order, OrderFilter, OrderStatus};
use crate::repository::OrderRepository;

/// MongoDB implementation of the OrderRepository
pub struct MongoOrderRepository {
    collection: Collection<Order>,
}

impl MongoOrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("orders"),
        }
    }

    pub async fn ensure_indexes(&self) -> OrderResult<()> {
        self.collection
            .create_indexes([
                IndexModel::builder()
                    .keys(doc! { "user_id": 1, "created_at": -1 })
                    .build(),
                IndexModel::builder().keys(doc! { "status": 1 }).build(),
            ])
            .await?;
        Ok(())
    }

    fn build_filter(filter: &OrderFilter) -> Document {
        let mut doc = Document::new();
        if let Some(status) = filter.status {
            doc.insert("status", status.to_string());
        }
        doc
    }

    async fn set_field(&self, id: Uuid, field: &str, value: String) -> OrderResult<Option<Order>> {
        let mut set = Document::new();
        set.insert(field, value);
        set.insert("updated_at", now_bson());

        Ok(self
            .collection
            .find_one_and_update(id_filter(id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?)
    }
}

#[async_trait]
impl OrderRepository for MongoOrderRepository {
    #[instrument(skip(self, order), fields(user_id = %order.user_id))]
    async fn create_order(&self, order: Order) -> OrderResult<Order> {
        self.collection.insert_one(&order).await?;
        tracing::info!(order_id = %order.id, total = order.total, "Order created successfully");
        Ok(order)
    }

    #[instrument(skip(self))]
    async fn get_order(&self, id: Uuid) -> OrderResult<Option<Order>> {
        Ok(self.collection.find_one(id_filter(id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_orders(&self, filter: OrderFilter) -> OrderResult<Vec<Order>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            .sort(doc! { "created_at": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn list_user_orders(&self, user_id: Uuid) -> OrderResult<Vec<Order>> {
        let cursor = self
            .collection
            .find(doc! { "user_id": uuid_bson(user_id) })
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    #[instrument(skip(self))]
    async fn set_status(&self, id: Uuid, status: OrderStatus) -> OrderResult<Option<Order>> {
        let updated = self.set_field(id, "status", status.to_string()).await?;
        if updated.is_some() {
            tracing::info!(order_id = %id, status = %status, "Order status updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn set_clinic_sync(&self, id: Uuid, sync: ClinicSync) -> OrderResult<Option<Order>> {
        self.set_field(id, "clinic_sync", sync.to_string()).await
    }

    #[instrument(skip(self))]
    async fn delete_order(&self, id: Uuid) -> OrderResult<bool> {
        let result = self.collection.delete_one(id_filter(id)).await?;
        if result.deleted_count > 0 {
            tracing::info!(order_id = %id, "Order deleted successfully");
        }
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoOrderRepository::build_filter(&OrderFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_by_status() {
        let filter = OrderFilter {
            status: Some(OrderStatus::Paid),
            ..Default::default()
        };
        let doc = MongoOrderRepository::build_filter(&filter);
        assert_eq!(doc.get_str("status").unwrap(), "paid");
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_status_and_sync_updates() {
        use crate::models::{CreateOrder, ItemKind, OrderItem};

        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = mongodb::Client::with_uri_str(&uri).await.unwrap();
        let db = client.database(&format!("orders_test_{}", Uuid::now_v7().simple()));
        let repo = MongoOrderRepository::new(&db);

        let order = Order::new(
            Uuid::now_v7(),
            CreateOrder {
                items: vec![OrderItem {
                    kind: ItemKind::Service,
                    item_id: Uuid::now_v7(),
                    clinic_id: Some(Uuid::now_v7()),
                    name: "Cleaning".to_string(),
                    price: 40.0,
                    quantity: 1,
                }],
                shipping_address: None,
            },
        );
        let order = repo.create_order(order).await.unwrap();

        let mine = repo.list_user_orders(order.user_id).await.unwrap();
        assert_eq!(mine.len(), 1);

        let paid = repo.set_status(order.id, OrderStatus::Paid).await.unwrap();
        assert_eq!(paid.unwrap().status, OrderStatus::Paid);

        let synced = repo
            .set_clinic_sync(order.id, ClinicSync::Synced)
            .await
            .unwrap();
        assert_eq!(synced.unwrap().clinic_sync, ClinicSync::Synced);

        db.drop().await.unwrap();
    }
}
