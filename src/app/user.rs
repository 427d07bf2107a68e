//! User use cases: lookups, role listings, create, update, delete.

use crate::domain::user::{hash_password, verify_password};
use crate::domain::{preference, User};
use crate::error::{is_unique_violation, AppError};
use crate::infra::{get_connection, ArrayCache, DbPool};
use rusqlite::{params, OptionalExtension};
use serde::Deserialize;

const USER_COLUMNS: &str = "user.user_id, user.user_name, user.real_name, user.email";

/// Tree settings that point at a user id and must be handed over on deletion.
const USER_ID_TREE_SETTINGS: [&str; 2] = ["CONTACT_USER_ID", "WEBMASTER_USER_ID"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreateReq {
    pub user_name: String,
    pub real_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateReq {
    pub id: i64,
    pub user_name: Option<String>,
    pub real_name: Option<String>,
    pub email: Option<String>,
}

fn query_one(pool: &DbPool, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Option<User>, AppError> {
    let conn = get_connection(pool);
    let user = conn.query_row(sql, args, User::from_row).optional()?;
    Ok(user)
}

fn query_list(pool: &DbPool, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<User>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(args, User::from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Users joined to a `user_setting` flag.
fn users_with_setting(pool: &DbPool, name: &str, value: &str) -> Result<Vec<User>, AppError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM user
         JOIN user_setting ON user_setting.user_id = user.user_id
              AND user_setting.setting_name = ?1 AND user_setting.setting_value = ?2
         WHERE user.user_id > 0
         ORDER BY user.real_name"
    );
    query_list(pool, &sql, &[&name, &value])
}

/// Users holding a per-tree role in at least one tree.
fn users_with_tree_role(pool: &DbPool, role: &str) -> Result<Vec<User>, AppError> {
    let sql = format!(
        "SELECT DISTINCT {USER_COLUMNS} FROM user
         JOIN user_gedcom_setting ON user_gedcom_setting.user_id = user.user_id
              AND user_gedcom_setting.setting_name = ?1 AND user_gedcom_setting.setting_value = ?2
         WHERE user.user_id > 0
         ORDER BY user.real_name"
    );
    query_list(pool, &sql, &[&preference::TREE_ROLE, &role])
}

/// Find by id, memoized for the lifetime of `cache`.
pub fn user_find(pool: &DbPool, cache: &ArrayCache, user_id: i64) -> Result<Option<User>, AppError> {
    cache.try_remember(&format!("user:{}", user_id), || {
        let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE user_id = ?1");
        query_one(pool, &sql, &[&user_id])
    })
}

pub fn user_find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?1");
    query_one(pool, &sql, &[&email])
}

/// Match a login identifier against user name or email.
pub fn user_find_by_identifier(pool: &DbPool, identifier: &str) -> Result<Option<User>, AppError> {
    // One account's user name may equal another's email; the user name wins.
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM user WHERE user_name = ?1 OR email = ?1
         ORDER BY user_name = ?1 DESC, user_id LIMIT 1"
    );
    query_one(pool, &sql, &[&identifier])
}

/// Accounts linked to the individual `xref` in tree `tree_id`.
pub fn user_find_by_individual(pool: &DbPool, tree_id: i64, xref: &str) -> Result<Vec<User>, AppError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM user
         JOIN user_gedcom_setting ON user_gedcom_setting.user_id = user.user_id
         WHERE user_gedcom_setting.gedcom_id = ?1
           AND user_gedcom_setting.setting_value = ?2
           AND user_gedcom_setting.setting_name = ?3
         ORDER BY user.user_id"
    );
    query_list(pool, &sql, &[&tree_id, &xref, &preference::TREE_ACCOUNT_XREF])
}

pub fn user_find_by_user_name(pool: &DbPool, user_name: &str) -> Result<Option<User>, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE user_name = ?1");
    query_one(pool, &sql, &[&user_name])
}

pub fn user_all(pool: &DbPool) -> Result<Vec<User>, AppError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE user_id > 0 ORDER BY real_name");
    query_list(pool, &sql, &[])
}

pub fn user_administrators(pool: &DbPool) -> Result<Vec<User>, AppError> {
    users_with_setting(pool, preference::IS_ADMINISTRATOR, "1")
}

pub fn user_managers(pool: &DbPool) -> Result<Vec<User>, AppError> {
    users_with_tree_role(pool, preference::ROLE_MANAGER)
}

pub fn user_moderators(pool: &DbPool) -> Result<Vec<User>, AppError> {
    users_with_tree_role(pool, preference::ROLE_MODERATOR)
}

/// Accounts still waiting for an administrator's approval.
pub fn user_unapproved(pool: &DbPool) -> Result<Vec<User>, AppError> {
    users_with_setting(pool, preference::IS_ACCOUNT_APPROVED, "0")
}

/// Accounts whose email address has not been confirmed.
pub fn user_unverified(pool: &DbPool) -> Result<Vec<User>, AppError> {
    users_with_setting(pool, preference::IS_EMAIL_VERIFIED, "0")
}

pub fn user_all_logged_in(pool: &DbPool) -> Result<Vec<User>, AppError> {
    let sql = format!(
        "SELECT DISTINCT {USER_COLUMNS} FROM user
         JOIN session ON session.user_id = user.user_id
         WHERE user.user_id > 0
         ORDER BY user.real_name"
    );
    query_list(pool, &sql, &[])
}

/// Create an account. Callers check for duplicates first; a race that still
/// hits the unique indexes is reported as `Conflict`.
pub fn user_create(pool: &DbPool, req: UserCreateReq) -> Result<User, AppError> {
    let user_name = req.user_name.trim();
    let real_name = req.real_name.trim();
    let email = req.email.trim();
    if user_name.is_empty() {
        return Err(AppError::Validation("user_name is required".into()));
    }
    if email.is_empty() {
        return Err(AppError::Validation("email is required".into()));
    }
    let password = hash_password(&req.password)?;

    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO user (user_name, real_name, email, password) VALUES (?1, ?2, ?3, ?4)",
        params![user_name, real_name, email, password],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("user name or email already in use: {}", user_name))
        } else {
            AppError::Db(e.to_string())
        }
    })?;
    let id = conn.last_insert_rowid();
    log::info!("Created user {} ({})", user_name, id);

    Ok(User::new(id, user_name, real_name, email))
}

pub fn user_update(pool: &DbPool, req: UserUpdateReq) -> Result<User, AppError> {
    let conn = get_connection(pool);
    let current = conn
        .query_row(
            &format!("SELECT {USER_COLUMNS} FROM user WHERE user_id = ?1"),
            [req.id],
            User::from_row,
        )
        .optional()?
        .filter(|u| u.id > 0)
        .ok_or_else(|| AppError::NotFound(format!("user {}", req.id)))?;

    let user_name = req
        .user_name
        .map(|s| s.trim().to_string())
        .unwrap_or(current.user_name);
    let real_name = req
        .real_name
        .map(|s| s.trim().to_string())
        .unwrap_or(current.real_name);
    let email = req.email.map(|s| s.trim().to_string()).unwrap_or(current.email);
    if user_name.is_empty() || email.is_empty() {
        return Err(AppError::Validation("user_name and email are required".into()));
    }

    conn.execute(
        "UPDATE user SET user_name = ?1, real_name = ?2, email = ?3 WHERE user_id = ?4",
        params![&user_name, &real_name, &email, req.id],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict(format!("user name or email already in use: {}", user_name))
        } else {
            AppError::Db(e.to_string())
        }
    })?;

    Ok(User::new(req.id, &user_name, &real_name, &email))
}

pub fn user_set_password(pool: &DbPool, user_id: i64, password: &str) -> Result<(), AppError> {
    let hash = hash_password(password)?;
    let conn = get_connection(pool);
    let n = conn.execute(
        "UPDATE user SET password = ?1 WHERE user_id = ?2 AND user_id > 0",
        params![hash, user_id],
    )?;
    if n == 0 {
        return Err(AppError::NotFound(format!("user {}", user_id)));
    }
    Ok(())
}

/// False for unknown users as well as wrong passwords.
pub fn user_check_password(pool: &DbPool, user_id: i64, password: &str) -> Result<bool, AppError> {
    let conn = get_connection(pool);
    let stored: Option<String> = conn
        .query_row(
            "SELECT password FROM user WHERE user_id = ?1",
            [user_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(stored.is_some_and(|h| verify_password(password, &h)))
}

pub fn user_preference(pool: &DbPool, user_id: i64, name: &str, default: &str) -> Result<String, AppError> {
    let conn = get_connection(pool);
    let value: Option<String> = conn
        .query_row(
            "SELECT setting_value FROM user_setting WHERE user_id = ?1 AND setting_name = ?2",
            params![user_id, name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or_else(|| default.to_string()))
}

/// Store a preference; an empty value removes it.
pub fn user_set_preference(pool: &DbPool, user_id: i64, name: &str, value: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    if value.is_empty() {
        conn.execute(
            "DELETE FROM user_setting WHERE user_id = ?1 AND setting_name = ?2",
            params![user_id, name],
        )?;
    } else {
        conn.execute(
            "INSERT INTO user_setting (user_id, setting_name, setting_value) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id, setting_name) DO UPDATE SET setting_value = excluded.setting_value",
            params![user_id, name, value],
        )?;
    }
    Ok(())
}

pub fn user_tree_preference(
    pool: &DbPool,
    user_id: i64,
    tree_id: i64,
    name: &str,
    default: &str,
) -> Result<String, AppError> {
    let conn = get_connection(pool);
    let value: Option<String> = conn
        .query_row(
            "SELECT setting_value FROM user_gedcom_setting
             WHERE user_id = ?1 AND gedcom_id = ?2 AND setting_name = ?3",
            params![user_id, tree_id, name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or_else(|| default.to_string()))
}

/// Store a per-tree preference; an empty value removes it.
pub fn user_set_tree_preference(
    pool: &DbPool,
    user_id: i64,
    tree_id: i64,
    name: &str,
    value: &str,
) -> Result<(), AppError> {
    let conn = get_connection(pool);
    if value.is_empty() {
        conn.execute(
            "DELETE FROM user_gedcom_setting WHERE user_id = ?1 AND gedcom_id = ?2 AND setting_name = ?3",
            params![user_id, tree_id, name],
        )?;
    } else {
        conn.execute(
            "INSERT INTO user_gedcom_setting (user_id, gedcom_id, setting_name, setting_value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_id, gedcom_id, setting_name) DO UPDATE SET setting_value = excluded.setting_value",
            params![user_id, tree_id, name, value],
        )?;
    }
    Ok(())
}

/// Delete an account. Its audit log survives anonymised; its pending and
/// accepted edits and contact roles pass to `acting_user_id`.
pub fn user_delete(pool: &DbPool, user_id: i64, acting_user_id: i64) -> Result<(), AppError> {
    if user_id == acting_user_id {
        return Err(AppError::Validation("cannot delete your own account".into()));
    }
    if user_id <= 0 {
        return Err(AppError::Validation("cannot delete the default user".into()));
    }

    let conn = get_connection(pool);
    let tx = conn.unchecked_transaction()?;

    let exists: bool = tx
        .query_row("SELECT 1 FROM user WHERE user_id = ?1", [user_id], |_| Ok(true))
        .optional()?
        .unwrap_or(false);
    if !exists {
        return Err(AppError::NotFound(format!("user {}", user_id)));
    }

    tx.execute("UPDATE log SET user_id = NULL WHERE user_id = ?1", [user_id])?;

    tx.execute(
        "DELETE FROM change WHERE user_id = ?1 AND status = 'rejected'",
        [user_id],
    )?;
    tx.execute(
        "UPDATE change SET user_id = ?1 WHERE user_id = ?2",
        params![acting_user_id, user_id],
    )?;

    for setting in USER_ID_TREE_SETTINGS {
        tx.execute(
            "UPDATE gedcom_setting SET setting_value = ?1 WHERE setting_value = ?2 AND setting_name = ?3",
            params![acting_user_id.to_string(), user_id.to_string(), setting],
        )?;
    }

    tx.execute(
        "DELETE FROM block_setting WHERE block_id IN (SELECT block_id FROM block WHERE user_id = ?1)",
        [user_id],
    )?;
    tx.execute("DELETE FROM block WHERE user_id = ?1", [user_id])?;
    tx.execute("DELETE FROM user_gedcom_setting WHERE user_id = ?1", [user_id])?;
    tx.execute("DELETE FROM user_setting WHERE user_id = ?1", [user_id])?;
    tx.execute("DELETE FROM message WHERE user_id = ?1", [user_id])?;
    tx.execute("DELETE FROM session WHERE user_id = ?1", [user_id])?;
    tx.execute("DELETE FROM user WHERE user_id = ?1", [user_id])?;

    tx.commit()?;
    log::info!("Deleted user {} (changes passed to {})", user_id, acting_user_id);
    Ok(())
}
