use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// Cache key chosen by the caller.
    #[validate(
        length(min = 1, max = 200, message = "section_id must be 1-200 characters"),
        custom(function = "validate_section_id")
    )]
    pub section_id: String,
}

/// Section ids end up as a single path segment of `/generated-image/{id}`.
fn validate_section_id(section_id: &str) -> Result<(), ValidationError> {
    let unsafe_char = section_id
        .chars()
        .any(|c| c.is_control() || matches!(c, '/' | '\\' | '?' | '#' | '%'));
    if unsafe_char {
        let mut err = ValidationError::new("section_id_path_safe");
        err.message =
            Some("section_id must not contain '/', '\\', '?', '#', '%' or control characters".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateImageResponse {
    /// Base64-encoded image.
    pub image_data: String,
    pub section_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(section_id: &str) -> GenerateImageRequest {
        GenerateImageRequest {
            prompt: "a quiet harbour".to_string(),
            section_id: section_id.to_string(),
        }
    }

    #[test]
    fn accepts_plain_section_ids() {
        assert!(request("hero").validate().is_ok());
        assert!(request("about-us_2").validate().is_ok());
        assert!(request("X").validate().is_ok());
    }

    #[test]
    fn rejects_ids_that_are_not_a_single_path_segment() {
        for id in ["a/b", "a\\b", "a?b", "a#b", "a%2Fb", "line\nbreak", "tab\there"] {
            assert!(request(id).validate().is_err(), "accepted {:?}", id);
        }
        assert!(request(&"x".repeat(201)).validate().is_err());
    }
}
