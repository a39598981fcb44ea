//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Signed bearer token codec (HS256, purpose-scoped claims)
//! - Gravatar URL derivation

pub mod gravatar;
pub mod password;
pub mod token;
