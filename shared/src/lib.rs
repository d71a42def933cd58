//! Aphid Shared Library
//!
//! Request/response types, domain enums and input validation shared by the
//! backend and its clients.

pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use models::PostCategory;
pub use types::*;
