//! Login accounts and account-sync.
//!
//! - [`service`]: account lookup, registration, credential checks
//! - [`sync`]: keeps one account per student record

pub mod service;
pub mod sync;
