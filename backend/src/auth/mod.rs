//! Authentication module
//!
//! Provides JWT-based authentication with argon2 password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, InvalidToken, InvalidTokenKind, TokenService};
pub use middleware::{authenticate, require_auth, AuthFailure, AuthUser};
pub use password::PasswordService;
