//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string`]: agnostic text folding used by every comparison in the crate

pub mod error;
pub mod string;
