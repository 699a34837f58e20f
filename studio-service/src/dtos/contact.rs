use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100, message = "name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 10, max = 2000, message = "message must be 10-2000 characters"))]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn message_length_bounds() {
        assert!(request("Ada", "ada@example.com", "123456789").validate().is_err());
        assert!(request("Ada", "ada@example.com", "1234567890").validate().is_ok());
        assert!(request("Ada", "ada@example.com", &"x".repeat(2000)).validate().is_ok());
        assert!(request("Ada", "ada@example.com", &"x".repeat(2001)).validate().is_err());
    }

    #[test]
    fn name_and_email_rules() {
        assert!(request("", "ada@example.com", "1234567890").validate().is_err());
        assert!(request(&"n".repeat(101), "ada@example.com", "1234567890").validate().is_err());
        assert!(request("Ada", "not-an-email", "1234567890").validate().is_err());
    }
}
