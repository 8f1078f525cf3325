/*
[INPUT]:  Table row, request and response type modules
[OUTPUT]: Flat re-export of every wire type
[POS]:    Data layer - module wiring
[UPDATE]: When a type module is added
*/

pub mod enums;
pub mod ids;
pub mod models;
pub mod requests;
pub mod responses;

pub use enums::*;
pub use ids::*;
pub use models::*;
pub use requests::*;
pub use responses::*;
