/// Authentication and authorization utilities
///
/// This module provides the secure authentication primitives for Teamflow:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and the account password policy
/// - [`jwt`]: JWT access token generation and validation
/// - [`reset`]: Opaque password-reset credentials (random token + SHA-256 digest)
/// - [`context`]: Authenticated request context and role gating
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **JWT Tokens**: HS256 signing, 24 hour lifetime
/// - **Reset Tokens**: 32 random bytes; only the SHA-256 digest is stored
/// - **Constant-time Comparison**: All verification uses constant-time operations

pub mod context;
pub mod jwt;
pub mod password;
pub mod reset;
