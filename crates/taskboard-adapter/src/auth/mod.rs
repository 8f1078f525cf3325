/*
[INPUT]:  Authentication configuration and credentials
[OUTPUT]: Sessions, approved profiles, and auth errors
[POS]:    Auth layer - handles backend authentication
[UPDATE]: When auth flow or session handling changes
*/

pub mod manager;
pub mod session;

pub use manager::AuthManager;
pub use session::{SessionData, SessionManager};
