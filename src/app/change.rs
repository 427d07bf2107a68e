//! Pending changes: record, moderate and search edits.

use crate::domain::record::extract_xref;
use crate::domain::{ChangeStatus, Location, RecordKind};
use crate::error::AppError;
use crate::infra::{get_connection, DbPool};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rusqlite::{params, OptionalExtension, ToSql};
use serde::{Deserialize, Serialize};

/// Format of `change.change_time` (UTC).
pub const CHANGE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeCreateReq {
    pub tree_id: i64,
    pub xref: String,
    pub old_gedcom: String,
    /// Empty to delete the record.
    pub new_gedcom: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeDto {
    pub id: i64,
    pub change_time: String,
    pub status: ChangeStatus,
    pub tree_id: i64,
    pub xref: String,
    pub old_gedcom: String,
    pub new_gedcom: String,
    pub user_id: i64,
}

/// Filters for the changes log. Empty strings mean "any".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangeLogFilter {
    pub tree: String,
    /// Inclusive `YYYY-MM-DD`, a day in `time_zone`.
    pub from: String,
    /// Inclusive `YYYY-MM-DD`, a day in `time_zone`.
    pub to: String,
    /// Zone the `from`/`to` days are read in; UTC when unset.
    #[serde(skip)]
    pub time_zone: Option<Tz>,
    #[serde(rename = "type")]
    pub status: String,
    pub xref: String,
    pub oldged: String,
    pub newged: String,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeLogRow {
    pub id: i64,
    pub change_time: String,
    pub status: ChangeStatus,
    pub tree_name: String,
    pub xref: String,
    pub old_gedcom: String,
    pub new_gedcom: String,
    pub user_name: Option<String>,
}

const CHANGE_COLUMNS: &str =
    "change_id, change_time, status, gedcom_id, xref, old_gedcom, new_gedcom, user_id";

fn parse_status(s: &str) -> rusqlite::Result<ChangeStatus> {
    s.parse::<ChangeStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            e.into(),
        )
    })
}

fn change_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChangeDto> {
    Ok(ChangeDto {
        id: row.get(0)?,
        change_time: row.get(1)?,
        status: parse_status(&row.get::<_, String>(2)?)?,
        tree_id: row.get(3)?,
        xref: row.get(4)?,
        old_gedcom: row.get(5)?,
        new_gedcom: row.get(6)?,
        user_id: row.get(7)?,
    })
}

fn find_change(conn: &rusqlite::Connection, change_id: i64) -> Result<ChangeDto, AppError> {
    conn.query_row(
        &format!("SELECT {CHANGE_COLUMNS} FROM change WHERE change_id = ?1"),
        [change_id],
        change_from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::NotFound(format!("change {}", change_id)))
}

pub fn change_get(pool: &DbPool, change_id: i64) -> Result<ChangeDto, AppError> {
    let conn = get_connection(pool);
    find_change(&conn, change_id)
}

/// Record an edit awaiting moderation.
pub fn change_create(pool: &DbPool, req: ChangeCreateReq) -> Result<ChangeDto, AppError> {
    let xref = req.xref.trim();
    if xref.is_empty() {
        return Err(AppError::Validation("xref is required".into()));
    }
    if req.old_gedcom.is_empty() && req.new_gedcom.is_empty() {
        return Err(AppError::Validation("a change needs an old or a new record".into()));
    }
    if !req.new_gedcom.is_empty() && extract_xref(&req.new_gedcom, "") != xref {
        return Err(AppError::Validation(format!(
            "new record does not start with 0 @{}@",
            xref
        )));
    }
    if !req.new_gedcom.is_empty() {
        // Only records that `change_accept` can store may be proposed.
        record_type(&req.new_gedcom)?;
    }
    let now = Utc::now().format(CHANGE_TIME_FORMAT).to_string();

    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO change (change_time, status, gedcom_id, xref, old_gedcom, new_gedcom, user_id)
         VALUES (?1, 'pending', ?2, ?3, ?4, ?5, ?6)",
        params![now, req.tree_id, xref, req.old_gedcom, req.new_gedcom, req.user_id],
    )?;
    let id = conn.last_insert_rowid();
    log::debug!("Pending change {} for {}@{}", id, xref, req.tree_id);
    find_change(&conn, id)
}

/// Apply a pending change to the stored record and mark it accepted.
pub fn change_accept(pool: &DbPool, change_id: i64) -> Result<ChangeDto, AppError> {
    let conn = get_connection(pool);
    let tx = conn.unchecked_transaction()?;
    let change = find_change(&tx, change_id)?;
    if !change.status.can_moderate() {
        return Err(AppError::Conflict(format!(
            "change {} is already {}",
            change_id,
            change.status.as_str()
        )));
    }

    if change.new_gedcom.is_empty() {
        tx.execute(
            "DELETE FROM other WHERE o_id = ?1 AND o_file = ?2",
            params![change.xref, change.tree_id],
        )?;
    } else {
        let kind = record_type(&change.new_gedcom)?;
        tx.execute(
            "INSERT INTO other (o_id, o_file, o_type, o_gedcom) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (o_id, o_file) DO UPDATE SET o_type = excluded.o_type, o_gedcom = excluded.o_gedcom",
            params![change.xref, change.tree_id, kind.record_type(), change.new_gedcom],
        )?;
    }
    tx.execute(
        "UPDATE change SET status = 'accepted' WHERE change_id = ?1",
        [change_id],
    )?;
    let accepted = find_change(&tx, change_id)?;
    tx.commit()?;
    log::info!("Accepted change {} for {}", change_id, change.xref);
    Ok(accepted)
}

pub fn change_reject(pool: &DbPool, change_id: i64) -> Result<ChangeDto, AppError> {
    let conn = get_connection(pool);
    let change = find_change(&conn, change_id)?;
    if !change.status.can_moderate() {
        return Err(AppError::Conflict(format!(
            "change {} is already {}",
            change_id,
            change.status.as_str()
        )));
    }
    conn.execute(
        "UPDATE change SET status = 'rejected' WHERE change_id = ?1",
        [change_id],
    )?;
    log::info!("Rejected change {} for {}", change_id, change.xref);
    find_change(&conn, change_id)
}

fn record_type(gedcom: &str) -> Result<RecordKind, AppError> {
    if Location::KIND.matches(gedcom) {
        Ok(Location::KIND)
    } else {
        Err(AppError::Validation(
            "only location records can be stored".into(),
        ))
    }
}

/// First and last change time, `None` when there are no changes.
pub fn change_time_bounds(pool: &DbPool) -> Result<(Option<String>, Option<String>), AppError> {
    let conn = get_connection(pool);
    let bounds = conn.query_row(
        "SELECT MIN(change_time), MAX(change_time) FROM change",
        [],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    Ok(bounds)
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{} must be YYYY-MM-DD, got '{}'", field, value)))
}

/// UTC `change_time` at which `date` starts in `tz`.
fn day_start_utc(date: NaiveDate, tz: &Tz) -> String {
    let midnight = date.and_time(NaiveTime::default());
    // A DST jump can skip midnight; the day then starts at the first valid hour.
    (0..3)
        .find_map(|h| tz.from_local_datetime(&(midnight + Duration::hours(h))).earliest())
        .map(|local| local.naive_utc())
        .unwrap_or(midnight)
        .format(CHANGE_TIME_FORMAT)
        .to_string()
}

/// Search the changes log, newest first.
pub fn change_log_search(pool: &DbPool, filter: &ChangeLogFilter) -> Result<Vec<ChangeLogRow>, AppError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Box<dyn ToSql>> = Vec::new();
    let mut push = |clause: &str, arg: Box<dyn ToSql>| {
        args.push(arg);
        clauses.push(clause.replace('?', &format!("?{}", args.len())));
    };

    if !filter.tree.is_empty() {
        push("g.gedcom_name = ?", Box::new(filter.tree.clone()));
    }
    let tz = filter.time_zone.unwrap_or(Tz::UTC);
    if !filter.from.is_empty() {
        let from = parse_date("from", &filter.from)?;
        push("c.change_time >= ?", Box::new(day_start_utc(from, &tz)));
    }
    if !filter.to.is_empty() {
        let to = parse_date("to", &filter.to)?;
        // Inclusive day: stop before the next local midnight.
        if let Some(next) = to.succ_opt() {
            push("c.change_time < ?", Box::new(day_start_utc(next, &tz)));
        }
    }
    if !filter.status.is_empty() {
        let status = filter
            .status
            .parse::<ChangeStatus>()
            .map_err(AppError::Validation)?;
        push("c.status = ?", Box::new(status.as_str()));
    }
    if !filter.xref.is_empty() {
        push("c.xref = ?", Box::new(filter.xref.clone()));
    }
    if !filter.oldged.is_empty() {
        push("instr(c.old_gedcom, ?) > 0", Box::new(filter.oldged.clone()));
    }
    if !filter.newged.is_empty() {
        push("instr(c.new_gedcom, ?) > 0", Box::new(filter.newged.clone()));
    }
    if !filter.username.is_empty() {
        push("u.user_name = ?", Box::new(filter.username.clone()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let sql = format!(
        "SELECT c.change_id, c.change_time, c.status, g.gedcom_name, c.xref, c.old_gedcom, c.new_gedcom, u.user_name
         FROM change c
         JOIN gedcom g ON g.gedcom_id = c.gedcom_id
         LEFT JOIN user u ON u.user_id = c.user_id
         {where_sql}
         ORDER BY c.change_time DESC, c.change_id DESC"
    );

    let conn = get_connection(pool);
    let mut stmt = conn.prepare(&sql)?;
    let bound: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let rows = stmt.query_map(bound.as_slice(), |r| {
        Ok(ChangeLogRow {
            id: r.get(0)?,
            change_time: r.get(1)?,
            status: parse_status(&r.get::<_, String>(2)?)?,
            tree_name: r.get(3)?,
            xref: r.get(4)?,
            old_gedcom: r.get(5)?,
            new_gedcom: r.get(6)?,
            user_name: r.get(7)?,
        })
    })?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
