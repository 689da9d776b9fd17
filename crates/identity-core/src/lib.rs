//! # Identity Core
//! 
//! Domain records, repository traits and the provisioning, licensing and
//! login services of the identity service.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod error;

// Re-export domain entities
pub use domain::*;
pub use error::DomainError;
