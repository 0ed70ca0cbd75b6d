//! Request extractors for caller identity.
//!
//! Every handler states what it needs from the session through its
//! arguments:
//!
//! - [`auth::CurrentSession`]: optional identity, used for navigation
//! - [`auth::RequireSession`]: login required; anonymous callers are
//!   redirected to `/login/?next=<path>`
//!
//! ```ignore
//! use crate::middleware::auth::RequireSession;
//!
//! async fn student_list(RequireSession(user): RequireSession) -> impl IntoResponse {
//!     // Only reached with a valid session
//! }
//! ```

pub mod auth;
