//! Shared utilities and common types for the promo code platform.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT issuance and validation for business and user subjects
//! - Password hashing with Argon2id and the password policy
//! - Field validators used by request DTOs
//! - Offset pagination helpers

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
