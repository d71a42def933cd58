//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories and external systems.

pub mod ai;
pub mod media;
pub mod post;
pub mod user;

pub use ai::{responder_from_config, AiResponder, DisabledResponder, OpenAiResponder};
pub use media::{ProfilePicPicker, UploadStore};
pub use post::{NewPost, PostService};
pub use user::UserService;
