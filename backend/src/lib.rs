//! Aphid backend library
//!
//! Registration, login and bearer-token protection for a small posting
//! service, plus posts, comments and AI answers to question posts.
//! Exposed as a library so integration tests can build the router.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod test_support;
