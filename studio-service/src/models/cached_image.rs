use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const DEFAULT_IMAGE_MIME_TYPE: &str = "image/png";

/// A generated image held in the in-process cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedImage {
    pub section_id: String,
    /// Base64 exactly as returned by the provider.
    pub image_data: String,
    pub mime_type: String,
    /// Theme the image was generated from; later requests may reuse the slot.
    pub prompt: String,
}

impl CachedImage {
    /// Raw image bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.image_data.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_base64_payload() {
        let image = CachedImage {
            section_id: "hero".to_string(),
            image_data: STANDARD.encode(b"\x89PNG\r\n"),
            mime_type: DEFAULT_IMAGE_MIME_TYPE.to_string(),
            prompt: "studio".to_string(),
        };
        assert_eq!(image.decode().unwrap(), b"\x89PNG\r\n");
    }

    #[test]
    fn rejects_corrupt_payload() {
        let image = CachedImage {
            section_id: "hero".to_string(),
            image_data: "not base64!!".to_string(),
            mime_type: DEFAULT_IMAGE_MIME_TYPE.to_string(),
            prompt: "studio".to_string(),
        };
        assert!(image.decode().is_err());
    }
}
