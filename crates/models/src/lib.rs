//! Persistence entities for the point-of-sale backend.
//!
//! Each module holds one sea-orm entity plus the small validation and
//! creation helpers shared by the service layer.

pub mod errors;
pub mod db;
pub mod money;
pub mod organization;
pub mod user;
pub mod user_credentials;
pub mod membership;
pub mod product;
pub mod transaction;
pub mod transaction_item;
pub mod setting;

pub use membership::Role;
pub use money::Money;

#[cfg(test)]
mod tests;
