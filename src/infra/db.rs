//! SQLite connection, migrations and seeding.

use crate::error::AppError;
use crate::infra::seed::seed_database;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

pub struct DbPool(pub Mutex<Connection>);

const MIGRATIONS: &[(i32, &str)] = &[
    (1, include_str!("../../migrations/0001_init.sql")),
    (2, include_str!("../../migrations/0002_change_indexes.sql")),
];

/// Initialize DB at path, run migrations and seeders, return managed pool.
pub fn init_db(db_path: &Path) -> Result<DbPool, AppError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AppError::Db(e.to_string()))?;
    }
    let conn = Connection::open(db_path)?;
    log::info!("Opened database at {:?}", db_path);
    prepare(conn)
}

/// In-memory database with the full schema and seed rows, for tests.
pub fn init_test_db() -> DbPool {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    prepare(conn).expect("prepare in-memory db")
}

fn prepare(mut conn: Connection) -> Result<DbPool, AppError> {
    conn.pragma_update(None, "foreign_keys", "ON")?;
    run_migrations(&mut conn)?;
    seed_database(&conn)?;
    Ok(DbPool(Mutex::new(conn)))
}

fn run_migrations(conn: &mut Connection) -> Result<(), AppError> {
    let tx = conn.transaction()?;

    // Ensure schema_migrations exists (first run)
    tx.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (version INTEGER PRIMARY KEY, applied_at TEXT NOT NULL DEFAULT (datetime('now')))",
        [],
    )?;

    let applied: Vec<i32> = tx
        .prepare("SELECT version FROM schema_migrations ORDER BY version")?
        .query_map([], |r| r.get(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for (version, sql) in MIGRATIONS {
        if applied.contains(version) {
            continue;
        }
        let statements = sql.split(';').map(str::trim).filter(|s| !s.is_empty());
        for stmt in statements {
            tx.execute(stmt, [])?;
        }
        tx.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, datetime('now'))",
            [version],
        )?;
        log::info!("Applied migration {}", version);
    }

    tx.commit()?;
    Ok(())
}

/// Get connection from pool (for use in use cases).
pub fn get_connection(pool: &DbPool) -> std::sync::MutexGuard<'_, Connection> {
    // A poisoned lock still guards a usable connection.
    pool.0.lock().unwrap_or_else(|e| e.into_inner())
}
