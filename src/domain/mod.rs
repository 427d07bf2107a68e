//! Domain types: records, users, trees, change statuses, surname traditions.

mod change_status;
pub mod record;
pub mod surname_tradition;
mod tree;
pub mod user;

pub use change_status::ChangeStatus;
pub use record::{GedcomRecord, Location, RecordKind};
pub use surname_tradition::{SurnameTradition, SurnameTraditionFactory};
pub use tree::Tree;
pub use user::{preference, User};
