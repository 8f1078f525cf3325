/*
[INPUT]:  Public API exports for taskboard-core crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod notify;
pub mod reorder;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod workspace;

// Re-export main types for convenience
pub use config::AppConfig;
pub use notify::{Notification, NotificationLevel, Notifier};
pub use reorder::{DropTarget, PositionUpdate, Relocation, ResolutionError};
pub use snapshot::{BoardSnapshot, SnapshotError};
pub use store::{BoardStore, FetchError, LoadOutcome, SnapshotSlice};
pub use sync::{MoveOutcome, PersistenceError, PersistenceSynchronizer, SyncError};
pub use workspace::{ColumnDirection, MemberWithProfile, ProjectWorkspace, WorkspaceError};
