/*
[INPUT]:  Backend row identifiers (uuid primary keys)
[OUTPUT]: Distinct id newtypes per table so a task id never passes for a column id
[POS]:    Data layer - identifier types shared by requests, models and the core
[UPDATE]: When a new table with its own primary key is addressed
*/

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random id.
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$name> for Uuid {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }
    };
}

row_id!(
    /// Primary key of `projects`.
    ProjectId
);
row_id!(
    /// Primary key of `boards`.
    BoardId
);
row_id!(
    /// Primary key of `board_columns`.
    ColumnId
);
row_id!(
    /// Primary key of `tasks`.
    TaskId
);
row_id!(
    /// Primary key of `task_checklist_items`.
    ChecklistItemId
);
row_id!(
    /// Primary key of `project_tags`.
    TagId
);
row_id!(
    /// Primary key of `project_members`.
    MemberId
);
row_id!(
    /// Auth user id, also the key of `profiles.user_id`.
    UserId
);
