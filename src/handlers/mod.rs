//! Request handlers (view-data boundary).
//!
//! Handlers validate request parameters and assemble the data a template
//! needs; rendering itself happens outside this crate.

pub mod pending_changes;
pub mod pending_changes_log;

use crate::app::user_find;
use crate::domain::{preference, User};
use crate::error::AppError;
use crate::infra::{ArrayCache, DbPool};
use serde::Serialize;

pub const ADMINISTRATION_LAYOUT: &str = "layouts/administration";

/// What the presentation layer renders: a view inside a layout.
#[derive(Debug, Serialize)]
pub struct ViewResponse<T: Serialize> {
    pub layout: &'static str,
    pub view: &'static str,
    pub data: T,
}

/// Per-request attributes resolved by the outer routing layer.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// `None` for visitors who are not logged in.
    pub user_id: Option<i64>,
    /// Tree named in the route, if any.
    pub tree: Option<String>,
}

impl RequestContext {
    pub fn new(user_id: Option<i64>, tree: Option<&str>) -> Self {
        Self {
            user_id,
            tree: tree.map(str::to_string),
        }
    }

    /// The logged-in user, resolved once per request.
    pub fn user(&self, pool: &DbPool, cache: &ArrayCache) -> Result<Option<User>, AppError> {
        match self.user_id {
            Some(id) => user_find(pool, cache, id),
            None => Ok(None),
        }
    }
}

/// Site administrators may do everything; others need a tree role.
pub(crate) fn is_administrator(pool: &DbPool, user_id: i64) -> Result<bool, AppError> {
    Ok(crate::app::user_preference(pool, user_id, preference::IS_ADMINISTRATOR, "")? == "1")
}
