pub mod contact;
pub mod images;
pub mod status;
