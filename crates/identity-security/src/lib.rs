//! # Identity Security
//! 
//! Credential hashing and opaque token generation.

pub mod password;
pub mod token;

pub use password::{CredentialHasher, PasswordError, PasswordService};
pub use token::{TokenGenerator, UuidTokenGenerator};
