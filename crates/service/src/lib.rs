//! Service layer for the point-of-sale backend.
//! - Business rules on top of the `models` entities.
//! - Every tenant-scoped operation takes a resolved `authz::TenantContext`.
//! - Typed errors per area; the HTTP layer maps them to statuses.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod authz;
pub mod catalog;
pub mod sales;
pub mod staff_service;
pub mod settings_service;
pub mod analytics_service;
pub mod seed;
#[cfg(test)]
pub mod test_support;
