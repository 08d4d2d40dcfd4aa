pub mod chat;
pub mod error;
pub mod files;
pub mod speech;
pub mod vector_store;

pub use error::ApiError;
