//! Analytics engine - the twelve fixed reports
//!
//! Provides:
//! - Average-grade rankings (top students, best in discipline, per group)
//! - Scalar averages (overall, per teacher, per teacher and student)
//! - Listings (teacher disciplines, group roster, student disciplines)
//! - Latest-session lookup for a group in a discipline
//!
//! No report treats a missing identifier as an error: lists come back
//! empty and scalar averages come back as `None`.

use crate::model::{Average, RecordId};
use crate::query::catalog;
use crate::query::executor::{Record, RelationalStore};
use crate::query::spec::QuerySpec;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

/// Report 1 row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct StudentAverage {
    #[tabled(rename = "Student")]
    pub student: String,
    #[tabled(rename = "Average")]
    pub avg_grade: Average,
}

/// Report 2 row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct DisciplineLeader {
    #[tabled(rename = "Discipline")]
    pub discipline: String,
    #[tabled(rename = "Student")]
    pub student: String,
    #[tabled(rename = "Average")]
    pub avg_grade: Average,
}

/// Report 3 row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct GroupAverage {
    #[tabled(rename = "Discipline")]
    pub discipline: String,
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Average")]
    pub avg_grade: Average,
}

/// Report 7 row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct GroupGrade {
    #[tabled(rename = "Discipline")]
    pub discipline: String,
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Grade")]
    pub grade: i64,
}

/// Report 12 row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Tabled)]
pub struct SessionGrade {
    #[tabled(rename = "Discipline")]
    pub discipline: String,
    #[tabled(rename = "Student")]
    pub student: String,
    #[tabled(rename = "Group")]
    pub group: String,
    #[tabled(rename = "Date")]
    pub date_of: NaiveDate,
    #[tabled(rename = "Grade")]
    pub grade: i64,
}

/// Runs the fixed reports against an injected store.
///
/// Holds nothing but the borrow; every call is an independent read.
pub struct AnalyticsEngine<'a, S: RelationalStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: RelationalStore + ?Sized> AnalyticsEngine<'a, S> {
    /// Create a new analytics engine
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// 1. Top five students by average grade over all disciplines
    pub fn top_students(&self) -> Result<Vec<StudentAverage>> {
        self.fetch(&catalog::top_students(), |r| {
            Ok(Some(StudentAverage {
                student: r.text(0)?,
                avg_grade: group_average(r, 1)?,
            }))
        })
    }

    /// 2. Student with the highest average in a discipline
    pub fn best_student_in_discipline(&self, discipline_id: RecordId) -> Result<Option<DisciplineLeader>> {
        let rows = self.fetch(&catalog::best_student_in_discipline(discipline_id), |r| {
            Ok(Some(DisciplineLeader {
                discipline: r.text(0)?,
                student: r.text(1)?,
                avg_grade: group_average(r, 2)?,
            }))
        })?;
        Ok(rows.into_iter().next())
    }

    /// 3. Average grade of each group in a discipline, best first
    pub fn group_averages_in_discipline(&self, discipline_id: RecordId) -> Result<Vec<GroupAverage>> {
        self.fetch(&catalog::group_averages_in_discipline(discipline_id), |r| {
            Ok(Some(GroupAverage {
                discipline: r.text(0)?,
                group: r.text(1)?,
                avg_grade: group_average(r, 2)?,
            }))
        })
    }

    /// 4. Average over every grade in the store
    pub fn overall_average(&self) -> Result<Option<Average>> {
        self.scalar_average(&catalog::overall_average())
    }

    /// 5. Disciplines taught by a teacher
    pub fn teacher_disciplines(&self, teacher_id: RecordId) -> Result<Vec<String>> {
        self.names(&catalog::teacher_disciplines(teacher_id))
    }

    /// 6. Students enrolled in a group
    pub fn group_students(&self, group_id: RecordId) -> Result<Vec<String>> {
        self.names(&catalog::group_students(group_id))
    }

    /// 7. Every grade a group received in a discipline
    pub fn group_grades_in_discipline(
        &self,
        group_id: RecordId,
        discipline_id: RecordId,
    ) -> Result<Vec<GroupGrade>> {
        self.fetch(&catalog::group_grades_in_discipline(group_id, discipline_id), |r| {
            Ok(Some(GroupGrade {
                discipline: r.text(0)?,
                group: r.text(1)?,
                grade: r.integer(2)?,
            }))
        })
    }

    /// 8. Average grade a teacher gives across their disciplines
    pub fn teacher_average(&self, teacher_id: RecordId) -> Result<Option<Average>> {
        self.scalar_average(&catalog::teacher_average(teacher_id))
    }

    /// 9. Distinct disciplines a student has been graded in
    pub fn student_disciplines(&self, student_id: RecordId) -> Result<Vec<String>> {
        self.names(&catalog::student_disciplines(student_id))
    }

    /// 10. Distinct disciplines a teacher grades a student in
    pub fn student_disciplines_by_teacher(
        &self,
        student_id: RecordId,
        teacher_id: RecordId,
    ) -> Result<Vec<String>> {
        self.names(&catalog::student_disciplines_by_teacher(student_id, teacher_id))
    }

    /// 11. Average grade a teacher gives a student
    pub fn student_average_by_teacher(
        &self,
        student_id: RecordId,
        teacher_id: RecordId,
    ) -> Result<Option<Average>> {
        self.scalar_average(&catalog::student_average_by_teacher(student_id, teacher_id))
    }

    /// Date of the latest graded session of a discipline within a group
    pub fn latest_session_date(
        &self,
        discipline_id: RecordId,
        group_id: RecordId,
    ) -> Result<Option<NaiveDate>> {
        let rows = self.fetch(&catalog::latest_session_date(discipline_id, group_id), |r| {
            r.opt_date(0)
        })?;
        Ok(rows.into_iter().next())
    }

    /// 12. Grades of a group in a discipline on its latest session
    ///
    /// The latest date is a scalar subquery of the same statement, so the
    /// date and the rows come from one snapshot.
    pub fn latest_session_grades(
        &self,
        discipline_id: RecordId,
        group_id: RecordId,
    ) -> Result<Vec<SessionGrade>> {
        self.fetch(&catalog::latest_session_grades(discipline_id, group_id), |r| {
            Ok(Some(SessionGrade {
                discipline: r.text(0)?,
                student: r.text(1)?,
                group: r.text(2)?,
                date_of: r.date(3)?,
                grade: r.integer(4)?,
            }))
        })
    }

    /// Run a spec and decode each record; `None` rows are dropped
    fn fetch<T>(
        &self,
        spec: &QuerySpec,
        mut decode: impl FnMut(&Record) -> Result<Option<T>>,
    ) -> Result<Vec<T>> {
        let records = self.store.select(spec)?;
        let mut rows = Vec::with_capacity(records.len());
        for record in &records {
            if let Some(row) = decode(record)? {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    fn names(&self, spec: &QuerySpec) -> Result<Vec<String>> {
        self.fetch(spec, |r| r.text(0).map(Some))
    }

    fn scalar_average(&self, spec: &QuerySpec) -> Result<Option<Average>> {
        let rows = self.fetch(spec, |r| average_at(r, 0))?;
        Ok(rows.into_iter().next())
    }
}

/// Decode the `SUM, COUNT` pair starting at `idx`
fn average_at(record: &Record, idx: usize) -> Result<Option<Average>> {
    let sum = record.opt_integer(idx)?.unwrap_or(0);
    let count = record.integer(idx + 1)?;
    Ok(Average::from_sum_count(sum, count))
}

/// Grouped rows always hold at least one grade
fn group_average(record: &Record, idx: usize) -> Result<Average> {
    average_at(record, idx)?
        .ok_or_else(|| Error::Decode(format!("column {}: group without grades", idx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::query::executor::Value;
    use crate::storage::SqliteStore;
    use std::cell::RefCell;

    fn id(value: i64) -> RecordId {
        RecordId::new(value).unwrap()
    }

    fn avg(text: &str) -> Average {
        let hundredths = text.replace('.', "").parse().unwrap();
        Average::from_hundredths(hundredths)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> SqliteStore {
        fixtures::seeded_store()
    }

    #[test]
    fn test_top_students_ranked_with_id_tie_break() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        let top = engine.top_students().unwrap();
        let names: Vec<_> = top.iter().map(|r| r.student.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Anna Bondar",
                "Iryna Melnyk",
                "Dmytro Lysenko",
                "Kateryna Savchuk",
                "Oleh Tkachenko"
            ]
        );
        assert_eq!(top[0].avg_grade, avg("4.50"));
        assert_eq!(top[2].avg_grade, avg("4.00"));
        assert_eq!(top[4].avg_grade, avg("3.00"));
        assert!(top.windows(2).all(|w| w[0].avg_grade >= w[1].avg_grade));
    }

    #[test]
    fn test_top_students_at_most_five() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        // Six students have grades; the lowest one is cut
        let top = engine.top_students().unwrap();
        assert_eq!(top.len(), 5);
        assert!(top.iter().all(|r| r.student != "Bohdan Hrytsenko"));
    }

    #[test]
    fn test_best_student_in_discipline() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        // Anna and Iryna both have 5.00 in Mathematics; lower id wins
        let best = engine.best_student_in_discipline(id(1)).unwrap().unwrap();
        assert_eq!(best.discipline, "Mathematics");
        assert_eq!(best.student, "Anna Bondar");
        assert_eq!(best.avg_grade, avg("5.00"));

        let physics = engine.best_student_in_discipline(id(2)).unwrap().unwrap();
        assert_eq!(physics.student, "Anna Bondar");
        assert_eq!(physics.avg_grade, avg("4.50"));
    }

    #[test]
    fn test_best_student_for_ungraded_discipline_is_empty() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        // Chemistry exists but has no grades
        assert!(engine.best_student_in_discipline(id(8)).unwrap().is_none());
        assert!(engine.best_student_in_discipline(id(999)).unwrap().is_none());
    }

    #[test]
    fn test_group_averages_in_discipline() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        let rows = engine.group_averages_in_discipline(id(1)).unwrap();
        assert_eq!(
            rows,
            vec![
                GroupAverage {
                    discipline: "Mathematics".to_string(),
                    group: "CD-12".to_string(),
                    avg_grade: avg("4.00"),
                },
                GroupAverage {
                    discipline: "Mathematics".to_string(),
                    group: "AB-11".to_string(),
                    avg_grade: avg("3.67"),
                },
            ]
        );
        assert!(engine.group_averages_in_discipline(id(8)).unwrap().is_empty());
    }

    #[test]
    fn test_overall_average() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        // 61 points over 16 grades = 3.8125
        assert_eq!(engine.overall_average().unwrap(), Some(avg("3.81")));
    }

    #[test]
    fn test_overall_average_of_empty_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        let engine = AnalyticsEngine::new(&store);
        assert_eq!(engine.overall_average().unwrap(), None);
    }

    #[test]
    fn test_overall_average_rounds_half_up() {
        let store = fixtures::store_with_grades(&[2, 2, 2, 2, 2, 2, 2, 3]);
        let engine = AnalyticsEngine::new(&store);

        // 17 / 8 = 2.125 exactly
        assert_eq!(engine.overall_average().unwrap(), Some(avg("2.13")));
    }

    #[test]
    fn test_teacher_disciplines() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        assert_eq!(engine.teacher_disciplines(id(4)).unwrap(), vec!["Algebra"]);
        assert_eq!(
            engine.teacher_disciplines(id(1)).unwrap(),
            vec!["Mathematics", "Physics"]
        );
        // Includes disciplines nobody has been graded in
        assert_eq!(
            engine.teacher_disciplines(id(2)).unwrap(),
            vec!["History", "Chemistry"]
        );
        assert!(engine.teacher_disciplines(id(99)).unwrap().is_empty());
    }

    #[test]
    fn test_group_students() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        assert_eq!(
            engine.group_students(id(2)).unwrap(),
            vec![
                "Dmytro Lysenko",
                "Iryna Melnyk",
                "Kateryna Savchuk",
                "Petro Zinchenko"
            ]
        );
        assert!(engine.group_students(id(3)).unwrap().is_empty());
    }

    #[test]
    fn test_group_grades_in_discipline() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        let rows = engine.group_grades_in_discipline(id(2), id(1)).unwrap();
        let grades: Vec<_> = rows.iter().map(|r| r.grade).collect();
        assert_eq!(grades, vec![4, 3, 5]);
        assert!(rows.iter().all(|r| r.discipline == "Mathematics" && r.group == "CD-12"));

        assert!(engine.group_grades_in_discipline(id(3), id(1)).unwrap().is_empty());
    }

    #[test]
    fn test_teacher_average() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        assert_eq!(engine.teacher_average(id(1)).unwrap(), Some(avg("3.80")));
        assert_eq!(engine.teacher_average(id(2)).unwrap(), Some(avg("4.00")));
        assert_eq!(engine.teacher_average(id(4)).unwrap(), Some(avg("3.50")));
        assert_eq!(engine.teacher_average(id(99)).unwrap(), None);
    }

    #[test]
    fn test_student_disciplines_are_distinct() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        // Anna has two Physics grades
        assert_eq!(
            engine.student_disciplines(id(1)).unwrap(),
            vec!["Algebra", "Mathematics", "Physics"]
        );
        assert!(engine.student_disciplines(id(7)).unwrap().is_empty());
    }

    #[test]
    fn test_student_disciplines_by_teacher() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        assert_eq!(
            engine.student_disciplines_by_teacher(id(1), id(1)).unwrap(),
            vec!["Mathematics", "Physics"]
        );
        assert!(engine.student_disciplines_by_teacher(id(1), id(2)).unwrap().is_empty());
        assert!(engine.student_disciplines_by_teacher(id(7), id(1)).unwrap().is_empty());
    }

    #[test]
    fn test_student_average_by_teacher() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        // 5 + 5 + 4 over 3 grades
        assert_eq!(engine.student_average_by_teacher(id(1), id(1)).unwrap(), Some(avg("4.67")));
        assert_eq!(engine.student_average_by_teacher(id(6), id(2)).unwrap(), Some(avg("2.00")));
        assert_eq!(engine.student_average_by_teacher(id(1), id(2)).unwrap(), None);
    }

    #[test]
    fn test_latest_session_grades_only_on_latest_date() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        // Mathematics in CD-12: 2024-01-05 grade 4, 2024-01-10 grades 3 and 5
        let rows = engine.latest_session_grades(id(1), id(2)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.date_of == date(2024, 1, 10)));
        let grades: Vec<_> = rows.iter().map(|r| r.grade).collect();
        assert_eq!(grades, vec![3, 5]);
        assert_eq!(rows[0].student, "Dmytro Lysenko");
        assert_eq!(rows[1].student, "Iryna Melnyk");
        assert!(rows.iter().all(|r| r.discipline == "Mathematics" && r.group == "CD-12"));
    }

    #[test]
    fn test_latest_session_matches_latest_date() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        let latest = engine.latest_session_date(id(1), id(1)).unwrap();
        assert_eq!(latest, Some(date(2024, 1, 12)));

        let rows = engine.latest_session_grades(id(1), id(1)).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| Some(r.date_of) == latest));
    }

    #[test]
    fn test_latest_session_without_grades_is_empty() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        assert_eq!(engine.latest_session_date(id(7), id(2)).unwrap(), None);
        assert!(engine.latest_session_grades(id(7), id(2)).unwrap().is_empty());
        assert!(engine.latest_session_grades(id(1), id(99)).unwrap().is_empty());
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let store = store();
        let engine = AnalyticsEngine::new(&store);

        assert_eq!(engine.top_students().unwrap(), engine.top_students().unwrap());
        assert_eq!(
            engine.latest_session_grades(id(1), id(2)).unwrap(),
            engine.latest_session_grades(id(1), id(2)).unwrap()
        );
        assert_eq!(engine.overall_average().unwrap(), engine.overall_average().unwrap());
    }

    /// Records every spec it receives and answers with canned rows
    struct RecordingStore {
        seen: RefCell<Vec<QuerySpec>>,
        rows: Vec<Record>,
    }

    impl RelationalStore for RecordingStore {
        fn select(&self, query: &QuerySpec) -> Result<Vec<Record>> {
            self.seen.borrow_mut().push(query.clone());
            Ok(self.rows.clone())
        }
    }

    struct UnavailableStore;

    impl RelationalStore for UnavailableStore {
        fn select(&self, _query: &QuerySpec) -> Result<Vec<Record>> {
            Err(Error::Storage(rusqlite::Error::InvalidQuery))
        }
    }

    #[test]
    fn test_each_call_issues_one_read() {
        let store = RecordingStore {
            seen: RefCell::new(Vec::new()),
            rows: vec![Record::new(vec![Value::Integer(9), Value::Integer(2)])],
        };
        let engine = AnalyticsEngine::new(&store);

        assert_eq!(engine.overall_average().unwrap(), Some(avg("4.50")));
        assert_eq!(engine.teacher_average(id(3)).unwrap(), Some(avg("4.50")));

        let seen = store.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], catalog::overall_average());
        assert_eq!(seen[1], catalog::teacher_average(id(3)));
    }

    #[test]
    fn test_store_failure_propagates() {
        let engine = AnalyticsEngine::new(&UnavailableStore);

        assert!(matches!(engine.top_students(), Err(Error::Storage(_))));
        assert!(matches!(engine.overall_average(), Err(Error::Storage(_))));
        assert!(matches!(
            engine.latest_session_grades(id(1), id(2)),
            Err(Error::Storage(_))
        ));
    }

    #[test]
    fn test_malformed_row_is_decode_error() {
        let store = RecordingStore {
            seen: RefCell::new(Vec::new()),
            rows: vec![Record::new(vec![Value::Integer(1)])],
        };
        let engine = AnalyticsEngine::new(&store);

        assert!(matches!(engine.teacher_disciplines(id(1)), Err(Error::Decode(_))));
    }
}
