//! # School Portal Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`session`]: Session cookie and token signing configuration
//! - [`server`]: Listen address
//! - [`media`]: Uploaded file storage location and limits
//! - [`accounts`]: Credentials issued to accounts derived from student records
//!
//! # Example
//!
//! ```ignore
//! use schoolportal_config::{AccountConfig, MediaConfig, ServerConfig, SessionConfig};
//!
//! let session_config = SessionConfig::from_env();
//! let server_config = ServerConfig::from_env();
//! ```

pub mod accounts;
pub mod media;
pub mod server;
pub mod session;

pub use accounts::AccountConfig;
pub use media::MediaConfig;
pub use server::ServerConfig;
pub use session::SessionConfig;
