//! Changes log page: filter form data and search results.

use super::{is_administrator, RequestContext, ViewResponse, ADMINISTRATION_LAYOUT};
use crate::app::{
    change_log_search, change_time_bounds, tree_find_by_name, tree_titles, user_all,
    user_preference, ChangeLogFilter, ChangeLogRow, CHANGE_TIME_FORMAT,
};
use crate::domain::{preference, ChangeStatus, Tree};
use crate::error::AppError;
use crate::infra::{ArrayCache, DbPool};
use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const VIEW: &str = "admin/changes-log";
pub const TITLE: &str = "Changes log";

/// Query parameters; anything missing takes its default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangesLogParams {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "type")]
    pub status: Option<String>,
    pub oldged: Option<String>,
    pub newged: Option<String>,
    pub xref: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChangesLogView {
    pub earliest: String,
    pub from: String,
    pub latest: String,
    pub newged: String,
    pub oldged: String,
    pub statuses: Vec<(String, String)>,
    pub title: String,
    pub to: String,
    pub tree: Tree,
    pub trees: Vec<(String, String)>,
    #[serde(rename = "type")]
    pub status: String,
    pub username: String,
    pub users: Vec<(String, String)>,
    pub xref: String,
}

/// Labels for the status filter, with a leading blank "any" entry.
pub fn change_statuses() -> Vec<(String, String)> {
    std::iter::once((String::new(), String::new()))
        .chain(
            ChangeStatus::all()
                .iter()
                .map(|s| (s.as_str().to_string(), s.label().to_string())),
        )
        .collect()
}

/// Parse a time zone preference (an IANA name such as `Europe/Paris`).
/// Unknown names fall back to UTC.
pub fn parse_time_zone(name: &str) -> Tz {
    let name = name.trim();
    if name.is_empty() {
        return Tz::UTC;
    }
    name.parse::<Tz>().unwrap_or_else(|_| {
        log::warn!("Unknown time zone '{}', using UTC", name);
        Tz::UTC
    })
}

/// Convert a stored UTC change time to a local `YYYY-MM-DD`.
fn local_date(change_time: &str, tz: &Tz) -> Result<String, AppError> {
    let naive = NaiveDateTime::parse_from_str(change_time, CHANGE_TIME_FORMAT)
        .map_err(|e| AppError::Db(format!("bad change_time '{}': {}", change_time, e)))?;
    Ok(Utc
        .from_utc_datetime(&naive)
        .with_timezone(tz)
        .format("%Y-%m-%d")
        .to_string())
}

fn user_time_zone(pool: &DbPool, user_id: i64) -> Result<Tz, AppError> {
    Ok(parse_time_zone(&user_preference(pool, user_id, preference::TIME_ZONE, "UTC")?))
}

fn current_tree(pool: &DbPool, ctx: &RequestContext) -> Result<Tree, AppError> {
    let name = ctx
        .tree
        .as_deref()
        .ok_or_else(|| AppError::Validation("tree is required".into()))?;
    tree_find_by_name(pool, name)?.ok_or_else(|| AppError::NotFound(format!("tree {}", name)))
}

/// Managers of any tree and site administrators may read the log.
fn require_manager(pool: &DbPool, cache: &ArrayCache, ctx: &RequestContext) -> Result<i64, AppError> {
    let user = ctx
        .user(pool, cache)?
        .ok_or_else(|| AppError::Forbidden("login required".into()))?;
    if is_administrator(pool, user.id)? {
        return Ok(user.id);
    }
    let managers = crate::app::user_managers(pool)?;
    if managers.iter().any(|m| m.id == user.id) {
        Ok(user.id)
    } else {
        Err(AppError::Forbidden("changes log is restricted to managers".into()))
    }
}

pub fn pending_changes_log_page(
    pool: &DbPool,
    cache: &ArrayCache,
    ctx: &RequestContext,
    params: ChangesLogParams,
) -> Result<ViewResponse<ChangesLogView>, AppError> {
    let user_id = require_manager(pool, cache, ctx)?;
    let tree = current_tree(pool, ctx)?;
    let trees = tree_titles(pool)?;

    let users = std::iter::once((String::new(), String::new()))
        .chain(user_all(pool)?.into_iter().map(|u| (u.user_name.clone(), u.user_name)))
        .collect();

    // First and last change in the database
    let now = Utc::now().format(CHANGE_TIME_FORMAT).to_string();
    let (first, last) = change_time_bounds(pool)?;
    let tz = user_time_zone(pool, user_id)?;
    let earliest = local_date(first.as_deref().unwrap_or(&now), &tz)?;
    let latest = local_date(last.as_deref().unwrap_or(&now), &tz)?;

    let data = ChangesLogView {
        from: params.from.unwrap_or_else(|| earliest.clone()),
        to: params.to.unwrap_or_else(|| latest.clone()),
        earliest,
        latest,
        newged: params.newged.unwrap_or_default(),
        oldged: params.oldged.unwrap_or_default(),
        statuses: change_statuses(),
        title: TITLE.to_string(),
        tree,
        trees,
        status: params.status.unwrap_or_default(),
        username: params.username.unwrap_or_default(),
        users,
        xref: params.xref.unwrap_or_default(),
    };

    Ok(ViewResponse {
        layout: ADMINISTRATION_LAYOUT,
        view: VIEW,
        data,
    })
}

/// Rows for the log table, filtered by the same parameters as the page.
pub fn pending_changes_log_data(
    pool: &DbPool,
    cache: &ArrayCache,
    ctx: &RequestContext,
    params: ChangesLogParams,
) -> Result<Vec<ChangeLogRow>, AppError> {
    let user_id = require_manager(pool, cache, ctx)?;
    let tree = current_tree(pool, ctx)?;
    // The form shows days in the user's zone.
    let filter = ChangeLogFilter {
        tree: tree.name,
        time_zone: Some(user_time_zone(pool, user_id)?),
        from: params.from.unwrap_or_default(),
        to: params.to.unwrap_or_default(),
        status: params.status.unwrap_or_default(),
        xref: params.xref.unwrap_or_default(),
        oldged: params.oldged.unwrap_or_default(),
        newged: params.newged.unwrap_or_default(),
        username: params.username.unwrap_or_default(),
    };
    change_log_search(pool, &filter)
}
