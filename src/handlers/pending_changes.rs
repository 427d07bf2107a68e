//! Moderation actions on pending changes.

use super::{is_administrator, RequestContext};
use crate::app::{
    change_accept, change_get, change_reject, location_forget, log_add, user_tree_preference,
    ChangeDto, LogType,
};
use crate::domain::preference;
use crate::error::AppError;
use crate::infra::{ArrayCache, DbPool};

/// Moderators and managers of the change's tree, or administrators.
fn require_moderator(
    pool: &DbPool,
    cache: &ArrayCache,
    ctx: &RequestContext,
    tree_id: i64,
) -> Result<i64, AppError> {
    let user = ctx
        .user(pool, cache)?
        .ok_or_else(|| AppError::Forbidden("login required".into()))?;
    if is_administrator(pool, user.id)? {
        return Ok(user.id);
    }
    let role = user_tree_preference(pool, user.id, tree_id, preference::TREE_ROLE, "")?;
    if role == preference::ROLE_MODERATOR || role == preference::ROLE_MANAGER {
        Ok(user.id)
    } else {
        Err(AppError::Forbidden(format!(
            "{} may not moderate this tree",
            user.user_name
        )))
    }
}

pub fn pending_change_accept(
    pool: &DbPool,
    cache: &ArrayCache,
    ctx: &RequestContext,
    change_id: i64,
) -> Result<ChangeDto, AppError> {
    let change = change_get(pool, change_id)?;
    let user_id = require_moderator(pool, cache, ctx, change.tree_id)?;
    let accepted = change_accept(pool, change_id)?;
    // The overlay and any records built from it are now stale.
    location_forget(cache, change.tree_id, &change.xref);
    log_add(
        pool,
        LogType::Edit,
        &format!("Accepted change {} for {}", change_id, change.xref),
        "",
        Some(user_id),
        Some(change.tree_id),
    )?;
    Ok(accepted)
}

pub fn pending_change_reject(
    pool: &DbPool,
    cache: &ArrayCache,
    ctx: &RequestContext,
    change_id: i64,
) -> Result<ChangeDto, AppError> {
    let change = change_get(pool, change_id)?;
    let user_id = require_moderator(pool, cache, ctx, change.tree_id)?;
    let rejected = change_reject(pool, change_id)?;
    location_forget(cache, change.tree_id, &change.xref);
    log_add(
        pool,
        LogType::Edit,
        &format!("Rejected change {} for {}", change_id, change.xref),
        "",
        Some(user_id),
        Some(change.tree_id),
    )?;
    Ok(rejected)
}
