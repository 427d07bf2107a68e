//! Audit trail rows in the `log` table.

use crate::error::AppError;
use crate::infra::{get_connection, DbPool};
use rusqlite::params;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Auth,
    Config,
    Debug,
    Edit,
    Error,
    Media,
    Search,
    Spam,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Config => "config",
            Self::Debug => "debug",
            Self::Edit => "edit",
            Self::Error => "error",
            Self::Media => "media",
            Self::Search => "search",
            Self::Spam => "spam",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntryDto {
    pub id: i64,
    pub log_time: String,
    pub log_type: String,
    pub message: String,
    pub ip_address: String,
    pub user_id: Option<i64>,
    pub tree_id: Option<i64>,
}

pub fn log_add(
    pool: &DbPool,
    log_type: LogType,
    message: &str,
    ip_address: &str,
    user_id: Option<i64>,
    tree_id: Option<i64>,
) -> Result<i64, AppError> {
    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO log (log_type, log_message, ip_address, user_id, gedcom_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![log_type.as_str(), message, ip_address, user_id, tree_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Entries whose message contains `needle`, oldest first.
pub fn log_search(pool: &DbPool, needle: &str) -> Result<Vec<LogEntryDto>, AppError> {
    let conn = get_connection(pool);
    let mut stmt = conn.prepare(
        "SELECT log_id, log_time, log_type, log_message, ip_address, user_id, gedcom_id
         FROM log WHERE instr(log_message, ?1) > 0 ORDER BY log_id",
    )?;
    let rows = stmt.query_map([needle], |r| {
        Ok(LogEntryDto {
            id: r.get(0)?,
            log_time: r.get(1)?,
            log_type: r.get(2)?,
            message: r.get(3)?,
            ip_address: r.get(4)?,
            user_id: r.get(5)?,
            tree_id: r.get(6)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
