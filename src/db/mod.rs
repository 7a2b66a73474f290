//! Database layer
//!
//! Pool abstraction over SQLite and MySQL, embedded migrations and the
//! repositories for every table the site reads or writes.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, is_unique_violation, DatabasePool, DynDatabasePool,
    MysqlDatabase, SqliteDatabase,
};
