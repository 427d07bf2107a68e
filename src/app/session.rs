//! Login sessions.

use crate::error::AppError;
use crate::infra::{get_connection, DbPool};
use rusqlite::params;

/// Start (or refresh) a session for a user.
pub fn session_open(pool: &DbPool, session_id: &str, user_id: i64, ip_address: &str) -> Result<(), AppError> {
    if session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id is required".into()));
    }
    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO session (session_id, session_time, user_id, ip_address) VALUES (?1, datetime('now'), ?2, ?3)
         ON CONFLICT (session_id) DO UPDATE SET
            session_time = excluded.session_time,
            user_id = excluded.user_id,
            ip_address = excluded.ip_address",
        params![session_id, user_id, ip_address],
    )?;
    Ok(())
}

pub fn session_close(pool: &DbPool, session_id: &str) -> Result<bool, AppError> {
    let conn = get_connection(pool);
    let n = conn.execute("DELETE FROM session WHERE session_id = ?1", [session_id])?;
    Ok(n > 0)
}
