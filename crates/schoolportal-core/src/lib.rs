//! # School Portal Core
//!
//! Core types and utilities shared by the School Portal crates:
//!
//! - [`errors`]: Application error type with HTML response conversion
//! - [`file_storage`]: Storage backend for uploaded profile pictures
//! - [`password`]: Password hashing and verification
//!
//! # Example
//!
//! ```ignore
//! use schoolportal_core::errors::AppError;
//! use schoolportal_core::password::{hash_password, verify_password};
//!
//! let error = AppError::not_found(anyhow::anyhow!("Student not found"));
//! let hash = hash_password("defaultpassword123")?;
//! ```

pub mod errors;
pub mod file_storage;
pub mod password;

pub use errors::AppError;
pub use file_storage::{FileStorage, LocalFileStorage, StorageError};
pub use password::{hash_password, verify_password};
