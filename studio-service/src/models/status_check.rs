use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A client check-in as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusCheck {
    pub id: String,
    pub client_name: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusCheck {
    pub fn new(client_name: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_name,
            timestamp: Utc::now(),
        }
    }
}

/// Stored form of [`StatusCheck`]; Mongo assigns `_id`, which is never read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCheckDocument {
    pub id: String,
    pub client_name: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl From<&StatusCheck> for StatusCheckDocument {
    fn from(check: &StatusCheck) -> Self {
        Self {
            id: check.id.clone(),
            client_name: check.client_name.clone(),
            timestamp: check.timestamp,
        }
    }
}

impl From<StatusCheckDocument> for StatusCheck {
    fn from(doc: StatusCheckDocument) -> Self {
        Self {
            id: doc.id,
            client_name: doc.client_name,
            timestamp: doc.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_check_gets_unique_id() {
        let a = StatusCheck::new("a".to_string());
        let b = StatusCheck::new("a".to_string());
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn api_form_serializes_timestamp_as_rfc3339() {
        let check = StatusCheck::new("client".to_string());
        let json = serde_json::to_value(&check).unwrap();
        let ts = json["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(json.get("_id").is_none());
    }
}
