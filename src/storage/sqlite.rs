//! SQLite storage implementation

use std::path::Path;
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use crate::Result;
use crate::model::{Dataset, Discipline, Grade, Group, Student, Teacher};
use crate::query::executor::{Record, RelationalStore, Value};
use crate::query::spec::QuerySpec;
use super::schema;

/// SQLite-backed relational store for the gradebook
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an existing database file for reporting only.
    ///
    /// Fails if the file does not exist; the schema is never touched.
    pub fn open_read_only(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    // ========== Write Path ==========

    /// Load a whole dataset in one transaction, parents before children.
    ///
    /// Any constraint violation rolls back every row of the dataset.
    pub fn import(&self, dataset: &Dataset) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for teacher in &dataset.teachers {
            insert_teacher(&tx, teacher)?;
        }
        for group in &dataset.groups {
            insert_group(&tx, group)?;
        }
        for discipline in &dataset.disciplines {
            insert_discipline(&tx, discipline)?;
        }
        for student in &dataset.students {
            insert_student(&tx, student)?;
        }
        for grade in &dataset.grades {
            insert_grade(&tx, grade)?;
        }
        tx.commit()?;
        tracing::debug!(records = dataset.total_records(), "dataset imported");
        Ok(())
    }

    // ========== Statistics ==========

    fn count_rows(&self, table: &str) -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM \"{}\"", table);
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            teachers: self.count_rows("teachers")?,
            groups: self.count_rows("groups")?,
            disciplines: self.count_rows("disciplines")?,
            students: self.count_rows("students")?,
            grades: self.count_rows("grades")?,
        })
    }
}

impl RelationalStore for SqliteStore {
    /// Render the spec and run it as one prepared statement
    fn select(&self, query: &QuerySpec) -> Result<Vec<Record>> {
        let rendered = query.render()?;
        tracing::debug!(sql = %rendered.sql, params = ?rendered.params, "executing query");

        let mut stmt = self.conn.prepare(&rendered.sql)?;
        let width = stmt.column_count();
        let records = stmt
            .query_map(params_from_iter(rendered.params.iter()), |row| {
                let mut values = Vec::with_capacity(width);
                for idx in 0..width {
                    values.push(Value::from(row.get_ref(idx)?));
                }
                Ok(Record::new(values))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        tracing::debug!(rows = records.len(), "query complete");
        Ok(records)
    }
}

fn insert_teacher(conn: &Connection, teacher: &Teacher) -> Result<()> {
    conn.execute(
        r#"INSERT INTO "teachers" ("id", "fullname") VALUES (?1, ?2)"#,
        params![teacher.id.get(), teacher.fullname],
    )?;
    Ok(())
}

fn insert_group(conn: &Connection, group: &Group) -> Result<()> {
    conn.execute(
        r#"INSERT INTO "groups" ("id", "name") VALUES (?1, ?2)"#,
        params![group.id.get(), group.name],
    )?;
    Ok(())
}

fn insert_discipline(conn: &Connection, discipline: &Discipline) -> Result<()> {
    conn.execute(
        r#"INSERT INTO "disciplines" ("id", "name", "teacher_id") VALUES (?1, ?2, ?3)"#,
        params![discipline.id.get(), discipline.name, discipline.teacher_id.get()],
    )?;
    Ok(())
}

fn insert_student(conn: &Connection, student: &Student) -> Result<()> {
    conn.execute(
        r#"INSERT INTO "students" ("id", "fullname", "group_id") VALUES (?1, ?2, ?3)"#,
        params![student.id.get(), student.fullname, student.group_id.get()],
    )?;
    Ok(())
}

fn insert_grade(conn: &Connection, grade: &Grade) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO "grades" ("id", "student_id", "discipline_id", "grade", "date_of")
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![
            grade.id.get(),
            grade.student_id.get(),
            grade.discipline_id.get(),
            grade.grade,
            grade.date_of,
        ],
    )?;
    Ok(())
}

/// Database statistics
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DbStats {
    pub teachers: usize,
    pub groups: usize,
    pub disciplines: usize,
    pub students: usize,
    pub grades: usize,
}

impl DbStats {
    pub fn rows(&self) -> [(&'static str, usize); 5] {
        [
            ("Teachers", self.teachers),
            ("Groups", self.groups),
            ("Disciplines", self.disciplines),
            ("Students", self.students),
            ("Grades", self.grades),
        ]
    }
}
