//! Tree use cases.

use crate::domain::Tree;
use crate::error::{is_unique_violation, AppError};
use crate::infra::{get_connection, DbPool};
use rusqlite::{params, OptionalExtension};

const TITLE: &str = "title";

const TREE_SELECT: &str = "SELECT g.gedcom_id, g.gedcom_name, COALESCE(s.setting_value, g.gedcom_name)
     FROM gedcom g
     LEFT JOIN gedcom_setting s ON s.gedcom_id = g.gedcom_id AND s.setting_name = 'title'";

fn tree_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tree> {
    Ok(Tree {
        id: row.get(0)?,
        name: row.get(1)?,
        title: row.get(2)?,
    })
}

pub fn tree_create(pool: &DbPool, name: &str, title: &str) -> Result<Tree, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("tree name is required".into()));
    }
    let title = match title.trim() {
        "" => name,
        t => t,
    };

    let conn = get_connection(pool);
    let tx = conn.unchecked_transaction()?;
    tx.execute("INSERT INTO gedcom (gedcom_name) VALUES (?1)", [name])
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("tree {} already exists", name))
            } else {
                AppError::Db(e.to_string())
            }
        })?;
    let id = tx.last_insert_rowid();
    tx.execute(
        "INSERT INTO gedcom_setting (gedcom_id, setting_name, setting_value) VALUES (?1, ?2, ?3)",
        params![id, TITLE, title],
    )?;
    tx.commit()?;
    log::info!("Created tree {} ({})", name, id);

    Ok(Tree {
        id,
        name: name.to_string(),
        title: title.to_string(),
    })
}

pub fn tree_find(pool: &DbPool, id: i64) -> Result<Option<Tree>, AppError> {
    let conn = get_connection(pool);
    let sql = format!("{TREE_SELECT} WHERE g.gedcom_id = ?1");
    Ok(conn.query_row(&sql, [id], tree_from_row).optional()?)
}

pub fn tree_find_by_name(pool: &DbPool, name: &str) -> Result<Option<Tree>, AppError> {
    let conn = get_connection(pool);
    let sql = format!("{TREE_SELECT} WHERE g.gedcom_name = ?1 AND g.gedcom_id > 0");
    Ok(conn.query_row(&sql, [name], tree_from_row).optional()?)
}

/// All real trees (the default tree is excluded), in display order.
pub fn tree_all(pool: &DbPool) -> Result<Vec<Tree>, AppError> {
    let conn = get_connection(pool);
    let sql = format!("{TREE_SELECT} WHERE g.gedcom_id > 0 ORDER BY g.sort_order, g.gedcom_name");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], tree_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// `(name, title)` pairs for tree pickers.
pub fn tree_titles(pool: &DbPool) -> Result<Vec<(String, String)>, AppError> {
    Ok(tree_all(pool)?
        .into_iter()
        .map(|t| (t.name, t.title))
        .collect())
}

pub fn tree_preference(pool: &DbPool, tree_id: i64, name: &str, default: &str) -> Result<String, AppError> {
    let conn = get_connection(pool);
    let value: Option<String> = conn
        .query_row(
            "SELECT setting_value FROM gedcom_setting WHERE gedcom_id = ?1 AND setting_name = ?2",
            params![tree_id, name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(value.unwrap_or_else(|| default.to_string()))
}

pub fn tree_set_preference(pool: &DbPool, tree_id: i64, name: &str, value: &str) -> Result<(), AppError> {
    let conn = get_connection(pool);
    conn.execute(
        "INSERT INTO gedcom_setting (gedcom_id, setting_name, setting_value) VALUES (?1, ?2, ?3)
         ON CONFLICT (gedcom_id, setting_name) DO UPDATE SET setting_value = excluded.setting_value",
        params![tree_id, name, value],
    )?;
    Ok(())
}
