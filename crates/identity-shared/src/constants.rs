//! Application-wide constants

pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_TENANT_ADMIN: &str = "tenant_admin";
pub const ROLE_TENANT_USER: &str = "tenant_user";

/// Starter allocation for a freshly provisioned tenant.
pub const DEFAULT_LICENCED_SEATS: i32 = 5;
pub const MAX_FAILED_LOGIN_ATTEMPTS: i32 = 3;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

// Argon2id defaults (OWASP minimum recommendation)
pub const DEFAULT_ARGON2_MEMORY_KIB: u32 = 19_456;
pub const DEFAULT_ARGON2_ITERATIONS: u32 = 2;
pub const DEFAULT_ARGON2_PARALLELISM: u32 = 1;
