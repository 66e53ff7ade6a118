//! Shared utilities and common types for the air-quality platform backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Signed access tokens (JWT, HS256)
//! - Password hashing with Argon2id
//! - HMAC tokens for newsletter unsubscribe links
//! - Common field validation

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
