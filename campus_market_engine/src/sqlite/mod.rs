//! SQLite backend for the campus market engine.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;
