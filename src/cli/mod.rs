//! Administrative commands behind `schoolportal-cli`.
//!
//! Teachers have no web interface; they are created, listed and deleted
//! here. [`seeder`] fills a development database with fake records.

pub mod seeder;
pub mod teachers;
