//! Storage Layer - SQLite-backed relational store
//!
//! System of record is SQLite with tables:
//! - teachers(id, fullname)
//! - disciplines(id, name, teacher_id)
//! - groups(id, name)
//! - students(id, fullname, group_id)
//! - grades(id, student_id, discipline_id, grade, date_of)

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteStore, DbStats};
