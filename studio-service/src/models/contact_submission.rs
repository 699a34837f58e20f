use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of a contact form that was relayed successfully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
    pub email_sent: bool,
}

impl ContactSubmission {
    pub fn sent(name: String, email: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            message,
            timestamp: Utc::now(),
            email_sent: true,
        }
    }
}
