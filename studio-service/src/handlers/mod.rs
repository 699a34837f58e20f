//! HTTP handlers for studio-service.

pub mod contact;
pub mod health;
pub mod images;
pub mod status;

pub use contact::send_contact;
pub use health::{health_check, metrics_endpoint, readiness_check, root};
pub use images::{generate_image, get_generated_image};
pub use status::{create_status_check, list_status_checks};
