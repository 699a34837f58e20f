use crate::models::{ContactSubmission, StatusCheck, StatusCheckDocument};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc, options::FindOptions, options::IndexOptions, Client as MongoClient, Collection,
    Database, IndexModel,
};
use service_core::error::AppError;

/// Upper bound on status checks returned by a single listing.
pub const STATUS_LIST_LIMIT: i64 = 1000;

/// Persistence seam for the status log and contact submissions.
#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError>;

    /// Status checks in insertion order, at most `limit` of them.
    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError>;

    async fn insert_contact_submission(
        &self,
        submission: &ContactSubmission,
    ) -> Result<(), AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct StudioDb {
    client: MongoClient,
    db: Database,
}

impl StudioDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!("Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for studio-service");

        let status_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .name("status_check_id_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        self.status_checks()
            .create_index(status_id_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create status_checks id index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        let submitted_index = IndexModel::builder()
            .keys(doc! { "timestamp": -1 })
            .options(
                IndexOptions::builder()
                    .name("contact_timestamp_idx".to_string())
                    .build(),
            )
            .build();

        self.contact_submissions()
            .create_index(submitted_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create contact_submissions timestamp index: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub fn status_checks(&self) -> Collection<StatusCheckDocument> {
        self.db.collection("status_checks")
    }

    pub fn contact_submissions(&self) -> Collection<ContactSubmission> {
        self.db.collection("contact_submissions")
    }

    /// Close pooled connections. Called once the HTTP server has drained.
    pub async fn close(self) {
        self.client.shutdown().await;
        tracing::info!("MongoDB client closed");
    }
}

#[async_trait]
impl SiteStore for StudioDb {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError> {
        self.status_checks()
            .insert_one(StatusCheckDocument::from(check), None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert status check: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        // ObjectIds grow monotonically, so `_id` order is insertion order.
        let find_options = FindOptions::builder()
            .sort(doc! { "_id": 1 })
            .limit(limit)
            .projection(doc! { "_id": 0 })
            .build();

        let cursor = self
            .status_checks()
            .find(doc! {}, find_options)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list status checks: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;

        let documents: Vec<StatusCheckDocument> = cursor.try_collect().await.map_err(|e| {
            tracing::error!("Failed to collect status checks: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;

        Ok(documents.into_iter().map(StatusCheck::from).collect())
    }

    async fn insert_contact_submission(
        &self,
        submission: &ContactSubmission,
    ) -> Result<(), AppError> {
        self.contact_submissions()
            .insert_one(submission, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert contact submission: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }
}
