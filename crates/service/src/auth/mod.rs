//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, password reset and session-token verification live
//! here; tenant and role resolution is in [`crate::authz`].

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use service::{AuthConfig, AuthService};
