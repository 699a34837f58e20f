pub mod contact;
pub mod database;
pub mod image_cache;
pub mod memory;
pub mod providers;

pub use contact::ContactMailer;
pub use database::{SiteStore, StudioDb, STATUS_LIST_LIMIT};
pub use image_cache::ImageCache;
pub use memory::InMemoryStore;
pub use providers::{
    EmailMessage, EmailProvider, GeminiConfig, GeminiImageProvider, ImageProvider,
    MockBehavior, MockEmailProvider, MockImageProvider, ProviderError, SmtpProvider,
};
