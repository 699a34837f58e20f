//! In-memory [`SiteStore`] for tests and local runs without MongoDB.

use super::database::SiteStore;
use crate::models::{ContactSubmission, StatusCheck};
use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    status_checks: RwLock<Vec<StatusCheck>>,
    contact_submissions: RwLock<Vec<ContactSubmission>>,
    /// When set, contact inserts fail; exercises the best-effort write path.
    fail_contact_writes: bool,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_contact_writes() -> Self {
        Self {
            fail_contact_writes: true,
            ..Self::default()
        }
    }

    pub async fn contact_submissions(&self) -> Vec<ContactSubmission> {
        self.contact_submissions.read().await.clone()
    }
}

#[async_trait]
impl SiteStore for InMemoryStore {
    async fn insert_status_check(&self, check: &StatusCheck) -> Result<(), AppError> {
        self.status_checks.write().await.push(check.clone());
        Ok(())
    }

    async fn list_status_checks(&self, limit: i64) -> Result<Vec<StatusCheck>, AppError> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .status_checks
            .read()
            .await
            .iter()
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_contact_submission(
        &self,
        submission: &ContactSubmission,
    ) -> Result<(), AppError> {
        if self.fail_contact_writes {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "contact submission writes disabled"
            )));
        }
        self.contact_submissions
            .write()
            .await
            .push(submission.clone());
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
