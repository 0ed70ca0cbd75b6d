//! Feature modules.
//!
//! - [`pages`]: home and informational pages
//! - [`auth`]: registration, login, logout
//! - [`students`]: student records and their forms
//! - [`teachers`]: teacher records (administered through the CLI)
//! - [`accounts`]: login accounts and account-sync

pub mod accounts;
pub mod auth;
pub mod pages;
pub mod students;
pub mod teachers;
