//! Database schema definitions
//!
//! Identifiers are always double-quoted: `groups` is a keyword in newer
//! SQLite window-frame syntax.

/// SQL to create the teachers table
pub const CREATE_TEACHERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "teachers" (
    "id" INTEGER PRIMARY KEY,
    "fullname" TEXT NOT NULL
)
"#;

/// SQL to create the groups table
pub const CREATE_GROUPS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "groups" (
    "id" INTEGER PRIMARY KEY,
    "name" TEXT NOT NULL
)
"#;

/// SQL to create the disciplines table
pub const CREATE_DISCIPLINES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "disciplines" (
    "id" INTEGER PRIMARY KEY,
    "name" TEXT NOT NULL,
    "teacher_id" INTEGER NOT NULL REFERENCES "teachers"("id") ON DELETE CASCADE
)
"#;

/// SQL to create the students table
pub const CREATE_STUDENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "students" (
    "id" INTEGER PRIMARY KEY,
    "fullname" TEXT NOT NULL,
    "group_id" INTEGER NOT NULL REFERENCES "groups"("id") ON DELETE CASCADE
)
"#;

/// SQL to create the grades table
/// `date_of` holds ISO-8601 dates so text order is calendar order
pub const CREATE_GRADES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS "grades" (
    "id" INTEGER PRIMARY KEY,
    "student_id" INTEGER NOT NULL REFERENCES "students"("id") ON DELETE CASCADE,
    "discipline_id" INTEGER NOT NULL REFERENCES "disciplines"("id") ON DELETE CASCADE,
    "grade" INTEGER NOT NULL CHECK ("grade" BETWEEN 0 AND 100),
    "date_of" TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    r#"CREATE INDEX IF NOT EXISTS "idx_disciplines_teacher" ON "disciplines"("teacher_id")"#,
    r#"CREATE INDEX IF NOT EXISTS "idx_students_group" ON "students"("group_id")"#,
    r#"CREATE INDEX IF NOT EXISTS "idx_grades_student" ON "grades"("student_id")"#,
    r#"CREATE INDEX IF NOT EXISTS "idx_grades_discipline_date" ON "grades"("discipline_id", "date_of")"#,
];

/// All schema creation statements, in foreign-key order
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_TEACHERS_TABLE,
        CREATE_GROUPS_TABLE,
        CREATE_DISCIPLINES_TABLE,
        CREATE_STUDENTS_TABLE,
        CREATE_GRADES_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
