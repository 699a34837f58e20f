use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStatusCheckRequest {
    #[validate(length(min = 1, message = "client_name cannot be empty"))]
    pub client_name: String,
}
