//! Shared test dataset
//!
//! Per-student means: Anna 4.50, Bohdan 2.50, Dmytro 4.00, Iryna 4.50,
//! Kateryna 4.00, Oleh 3.00. Petro has no grades, group EF-13 has no
//! students and Chemistry has no grades.

use crate::model::{Dataset, Discipline, Grade, Group, RecordId, Student, Teacher};
use crate::storage::SqliteStore;
use chrono::NaiveDate;

fn id(value: i64) -> RecordId {
    RecordId::new(value).unwrap()
}

fn grade(grade_id: i64, student: i64, discipline: i64, value: i64, date: &str) -> Grade {
    Grade {
        id: id(grade_id),
        student_id: id(student),
        discipline_id: id(discipline),
        grade: value,
        date_of: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
    }
}

pub fn dataset() -> Dataset {
    let teachers = [(1, "Olena Kovalenko"), (2, "Ivan Petrenko"), (4, "Maria Shevchenko")]
        .into_iter()
        .map(|(i, name)| Teacher { id: id(i), fullname: name.to_string() })
        .collect();

    let groups = [(1, "AB-11"), (2, "CD-12"), (3, "EF-13")]
        .into_iter()
        .map(|(i, name)| Group { id: id(i), name: name.to_string() })
        .collect();

    let disciplines = [
        (1, "Mathematics", 1),
        (2, "Physics", 1),
        (3, "History", 2),
        (7, "Algebra", 4),
        (8, "Chemistry", 2),
    ]
    .into_iter()
    .map(|(i, name, teacher)| Discipline {
        id: id(i),
        name: name.to_string(),
        teacher_id: id(teacher),
    })
    .collect();

    let students = [
        (1, "Anna Bondar", 1),
        (2, "Bohdan Hrytsenko", 1),
        (3, "Dmytro Lysenko", 2),
        (4, "Iryna Melnyk", 2),
        (5, "Kateryna Savchuk", 2),
        (6, "Oleh Tkachenko", 1),
        (7, "Petro Zinchenko", 2),
    ]
    .into_iter()
    .map(|(i, name, group)| Student {
        id: id(i),
        fullname: name.to_string(),
        group_id: id(group),
    })
    .collect();

    let grades = vec![
        // Mathematics, CD-12
        grade(1, 3, 1, 4, "2024-01-05"),
        grade(2, 3, 1, 3, "2024-01-10"),
        grade(3, 4, 1, 5, "2024-01-10"),
        // Mathematics, AB-11
        grade(4, 1, 1, 5, "2024-01-12"),
        grade(5, 2, 1, 2, "2024-01-12"),
        grade(6, 6, 1, 4, "2024-01-08"),
        // Physics
        grade(7, 1, 2, 5, "2024-02-01"),
        grade(8, 1, 2, 4, "2024-02-03"),
        grade(9, 5, 2, 3, "2024-02-01"),
        grade(10, 2, 2, 3, "2024-02-02"),
        // History
        grade(11, 3, 3, 5, "2024-03-01"),
        grade(12, 4, 3, 4, "2024-03-01"),
        grade(13, 6, 3, 2, "2024-03-02"),
        grade(14, 5, 3, 5, "2024-03-02"),
        // Algebra
        grade(15, 1, 7, 4, "2024-03-05"),
        grade(16, 6, 7, 3, "2024-03-05"),
    ];

    Dataset { teachers, groups, disciplines, students, grades }
}

pub fn seeded_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    store.import(&dataset()).unwrap();
    store
}

/// One teacher, group, discipline and student holding exactly `values`
pub fn store_with_grades(values: &[i64]) -> SqliteStore {
    let grades = values
        .iter()
        .enumerate()
        .map(|(i, &value)| grade(i as i64 + 1, 1, 1, value, "2024-01-01"))
        .collect();

    let dataset = Dataset {
        teachers: vec![Teacher { id: id(1), fullname: "Solo Teacher".to_string() }],
        groups: vec![Group { id: id(1), name: "Solo".to_string() }],
        disciplines: vec![Discipline {
            id: id(1),
            name: "Solo Course".to_string(),
            teacher_id: id(1),
        }],
        students: vec![Student {
            id: id(1),
            fullname: "Solo Student".to_string(),
            group_id: id(1),
        }],
        grades,
    };

    let store = SqliteStore::open_in_memory().unwrap();
    store.import(&dataset).unwrap();
    store
}
