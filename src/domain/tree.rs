use serde::Serialize;

/// A named genealogy database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    pub id: i64,
    pub name: String,
    pub title: String,
}
