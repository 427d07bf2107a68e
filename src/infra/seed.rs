//! Seed rows every database needs: the default tree and the default user.
//!
//! Both rows carry id `-1` and hold site-wide default settings; they never
//! show up in user or tree listings (those filter on `id > 0`).

use crate::error::AppError;
use rusqlite::{params, Connection};

pub const DEFAULT_TREE_ID: i64 = -1;
pub const DEFAULT_TREE_NAME: &str = "DEFAULT_TREE";
pub const DEFAULT_USER_ID: i64 = -1;
pub const DEFAULT_USER_NAME: &str = "DEFAULT_USER";

pub trait Seeder {
    fn name(&self) -> &'static str;

    fn run(&self, conn: &Connection) -> Result<(), AppError>;
}

/// Populate the gedcom table.
pub struct SeedGedcomTable;

impl Seeder for SeedGedcomTable {
    fn name(&self) -> &'static str {
        "gedcom"
    }

    fn run(&self, conn: &Connection) -> Result<(), AppError> {
        conn.execute(
            "INSERT INTO gedcom (gedcom_id, gedcom_name) VALUES (?1, ?2)
             ON CONFLICT (gedcom_id) DO UPDATE SET gedcom_name = excluded.gedcom_name",
            params![DEFAULT_TREE_ID, DEFAULT_TREE_NAME],
        )?;
        Ok(())
    }
}

/// Populate the user table.
pub struct SeedUserTable;

impl Seeder for SeedUserTable {
    fn name(&self) -> &'static str {
        "user"
    }

    fn run(&self, conn: &Connection) -> Result<(), AppError> {
        conn.execute(
            "INSERT INTO user (user_id, user_name, real_name, email, password) VALUES (?1, ?2, ?2, ?2, ?2)
             ON CONFLICT (user_id) DO UPDATE SET
                user_name = excluded.user_name,
                real_name = excluded.real_name,
                email = excluded.email,
                password = excluded.password",
            params![DEFAULT_USER_ID, DEFAULT_USER_NAME],
        )?;
        Ok(())
    }
}

/// Run every seeder. Safe to call on each start-up.
pub fn seed_database(conn: &Connection) -> Result<(), AppError> {
    let seeders: [&dyn Seeder; 2] = [&SeedGedcomTable, &SeedUserTable];
    for seeder in seeders {
        seeder.run(conn)?;
        log::debug!("Seeded {} table", seeder.name());
    }
    Ok(())
}
