/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public board backend adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod backend;
pub mod http;
pub mod types;

// Re-export commonly used types from auth
pub use auth::{AuthManager, SessionData, SessionManager};

pub use backend::{BoardBackend, BoardCatalog};

// Re-export commonly used types from http
pub use http::{ClientConfig, Result, TaskboardClient, TaskboardError};

// Re-export all types
pub use types::*;
