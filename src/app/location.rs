//! Location records: built from `other` rows plus the tree's pending edits.

use crate::domain::record::extract_xref;
use crate::domain::Location;
use crate::error::AppError;
use crate::infra::{get_connection, ArrayCache, DbPool};
use rusqlite::{params, OptionalExtension};
use std::collections::HashMap;

/// A raw `(o_id, o_gedcom)` row.
#[derive(Debug, Clone)]
pub struct LocationRow {
    pub o_id: String,
    pub o_gedcom: String,
}

fn pending_changes_key(tree_id: i64) -> String {
    format!("pending-changes:{}", tree_id)
}

fn location_key(xref: &str, tree_id: i64) -> String {
    format!("location:{}@{}", xref, tree_id)
}

/// Drop cached state for one record after its pending changes were moderated.
pub fn location_forget(cache: &ArrayCache, tree_id: i64, xref: &str) {
    cache.forget(&pending_changes_key(tree_id));
    cache.forget(&location_key(xref, tree_id));
}

/// Newest pending edit per xref for one tree, memoized per request.
pub fn pending_changes(
    pool: &DbPool,
    cache: &ArrayCache,
    tree_id: i64,
) -> Result<HashMap<String, String>, AppError> {
    cache.try_remember(&pending_changes_key(tree_id), || {
        let conn = get_connection(pool);
        let mut stmt = conn.prepare(
            "SELECT xref, new_gedcom FROM change
             WHERE status = 'pending' AND gedcom_id = ?1
             ORDER BY change_id",
        )?;
        let rows = stmt.query_map([tree_id], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
        let mut out = HashMap::new();
        for r in rows {
            let (xref, gedcom) = r?;
            // Later changes supersede earlier ones.
            out.insert(xref, gedcom);
        }
        Ok(out)
    })
}

fn stored_gedcom(pool: &DbPool, tree_id: i64, xref: &str) -> Result<Option<String>, AppError> {
    let conn = get_connection(pool);
    let gedcom = conn
        .query_row(
            "SELECT o_gedcom FROM other WHERE o_id = ?1 AND o_file = ?2 AND o_type = ?3",
            params![xref, tree_id, Location::KIND.record_type()],
            |r| r.get(0),
        )
        .optional()?;
    Ok(gedcom)
}

/// Build a location, or `None` when neither an accepted record nor a pending
/// `_LOC` addition exists. Pass `gedcom` when the caller already has the row.
pub fn location_make(
    pool: &DbPool,
    cache: &ArrayCache,
    tree_id: i64,
    xref: &str,
    gedcom: Option<&str>,
) -> Result<Option<Location>, AppError> {
    cache.try_remember(&location_key(xref, tree_id), || {
        let gedcom = match gedcom {
            Some(g) => Some(g.to_string()),
            None => stored_gedcom(pool, tree_id, xref)?,
        };
        let pending = pending_changes(pool, cache, tree_id)?.remove(xref);

        let source = match (&gedcom, &pending) {
            (Some(g), _) => g.as_str(),
            (None, Some(p)) if Location::KIND.matches(p) => p.as_str(),
            _ => return Ok(None),
        };
        let xref = extract_xref(source, xref);

        Ok(Some(location_new(
            &xref,
            gedcom.as_deref().unwrap_or(""),
            pending.as_deref(),
            tree_id,
        )))
    })
}

/// Construct directly. `gedcom` is empty for records that only exist as a
/// pending addition; `pending` is `Some("")` for a pending deletion.
pub fn location_new(xref: &str, gedcom: &str, pending: Option<&str>, tree_id: i64) -> Location {
    Location::new(xref, gedcom, pending, tree_id)
}

/// Row mapper for queries that already selected `o_id, o_gedcom`.
pub fn location_mapper<'a>(
    pool: &'a DbPool,
    cache: &'a ArrayCache,
    tree_id: i64,
) -> impl Fn(&LocationRow) -> Result<Option<Location>, AppError> + 'a {
    move |row| location_make(pool, cache, tree_id, &row.o_id, Some(&row.o_gedcom))
}

/// Every accepted location in a tree, ordered by xref.
pub fn location_list(pool: &DbPool, cache: &ArrayCache, tree_id: i64) -> Result<Vec<Location>, AppError> {
    let rows: Vec<LocationRow> = {
        let conn = get_connection(pool);
        let mut stmt = conn.prepare(
            "SELECT o_id, o_gedcom FROM other WHERE o_file = ?1 AND o_type = ?2 ORDER BY o_id",
        )?;
        let mapped = stmt.query_map(params![tree_id, Location::KIND.record_type()], |r| {
            Ok(LocationRow {
                o_id: r.get(0)?,
                o_gedcom: r.get(1)?,
            })
        })?;
        mapped.collect::<Result<Vec<_>, _>>()?
    }; // release conn before mapping, which queries again

    let mapper = location_mapper(pool, cache, tree_id);
    let mut out = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(location) = mapper(row)? {
            out.push(location);
        }
    }
    Ok(out)
}
