//! Infrastructure: SQLite connection, migrations, seeders, request cache.

pub mod cache;
pub mod db;
pub mod seed;

pub use cache::ArrayCache;
pub(crate) use db::get_connection;
pub use db::{init_db, init_test_db, DbPool};
