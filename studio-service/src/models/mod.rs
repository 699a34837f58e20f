pub mod cached_image;
pub mod contact_submission;
pub mod status_check;

pub use cached_image::CachedImage;
pub use contact_submission::ContactSubmission;
pub use status_check::{StatusCheck, StatusCheckDocument};
