//! The twelve report definitions, as data
//!
//! Each function returns the `QuerySpec` for one report. Aggregated reports
//! project `SUM` and `COUNT` of the grade so the mean can be rounded exactly
//! by `Average`; ordering uses the unrounded mean with an identifier
//! ascending as the tie-break.

use crate::model::RecordId;
use crate::query::spec::{Column, Entity, Filter, OrderExpr, OrderKey, Projection, QuerySpec};

const TEACHER_ID: Column = Entity::Teacher.col("id");
const DISCIPLINE_ID: Column = Entity::Discipline.col("id");
const DISCIPLINE_NAME: Column = Entity::Discipline.col("name");
const GROUP_ID: Column = Entity::Group.col("id");
const GROUP_NAME: Column = Entity::Group.col("name");
const STUDENT_ID: Column = Entity::Student.col("id");
const STUDENT_NAME: Column = Entity::Student.col("fullname");
const GRADE_ID: Column = Entity::Grade.col("id");
const GRADE_VALUE: Column = Entity::Grade.col("grade");
const GRADE_DISCIPLINE: Column = Entity::Grade.col("discipline_id");
const GRADE_DATE: Column = Entity::Grade.col("date_of");

/// Row cap for the top students report
pub const TOP_STUDENTS_LIMIT: u32 = 5;

fn with_mean(spec: QuerySpec) -> QuerySpec {
    spec.select(Projection::Sum(GRADE_VALUE))
        .select(Projection::Count(GRADE_VALUE))
}

fn eq(column: Column, id: RecordId) -> Filter {
    Filter::Eq(column, id.get())
}

/// 1: five students with the highest average over all disciplines
pub fn top_students() -> QuerySpec {
    with_mean(
        QuerySpec::from_entity(Entity::Grade)
            .join(Entity::Student)
            .select(Projection::Column(STUDENT_NAME)),
    )
    .group_by(STUDENT_ID)
    .order_by(OrderKey::desc(OrderExpr::Mean(GRADE_VALUE)))
    .order_by(OrderKey::asc(OrderExpr::Column(STUDENT_ID)))
    .limit(TOP_STUDENTS_LIMIT)
}

/// 2: the student with the highest average in one discipline
pub fn best_student_in_discipline(discipline_id: RecordId) -> QuerySpec {
    with_mean(
        QuerySpec::from_entity(Entity::Grade)
            .join(Entity::Student)
            .join(Entity::Discipline)
            .select(Projection::Column(DISCIPLINE_NAME))
            .select(Projection::Column(STUDENT_NAME)),
    )
    .filter(eq(DISCIPLINE_ID, discipline_id))
    .group_by(STUDENT_ID)
    .group_by(DISCIPLINE_NAME)
    .order_by(OrderKey::desc(OrderExpr::Mean(GRADE_VALUE)))
    .order_by(OrderKey::asc(OrderExpr::Column(STUDENT_ID)))
    .limit(1)
}

/// 3: average per group in one discipline
pub fn group_averages_in_discipline(discipline_id: RecordId) -> QuerySpec {
    with_mean(
        QuerySpec::from_entity(Entity::Grade)
            .join(Entity::Student)
            .join(Entity::Group)
            .join(Entity::Discipline)
            .select(Projection::Column(DISCIPLINE_NAME))
            .select(Projection::Column(GROUP_NAME)),
    )
    .filter(eq(DISCIPLINE_ID, discipline_id))
    .group_by(GROUP_ID)
    .group_by(DISCIPLINE_NAME)
    .order_by(OrderKey::desc(OrderExpr::Mean(GRADE_VALUE)))
    .order_by(OrderKey::asc(OrderExpr::Column(GROUP_ID)))
}

/// 4: average over the whole grade table
pub fn overall_average() -> QuerySpec {
    with_mean(QuerySpec::from_entity(Entity::Grade))
}

/// 5: disciplines taught by one teacher
pub fn teacher_disciplines(teacher_id: RecordId) -> QuerySpec {
    QuerySpec::from_entity(Entity::Discipline)
        .join(Entity::Teacher)
        .select(Projection::Column(DISCIPLINE_NAME))
        .filter(eq(TEACHER_ID, teacher_id))
        .order_by(OrderKey::asc(OrderExpr::Column(DISCIPLINE_ID)))
}

/// 6: roster of one group
pub fn group_students(group_id: RecordId) -> QuerySpec {
    QuerySpec::from_entity(Entity::Student)
        .join(Entity::Group)
        .select(Projection::Column(STUDENT_NAME))
        .filter(eq(GROUP_ID, group_id))
        .order_by(OrderKey::asc(OrderExpr::Column(STUDENT_ID)))
}

/// 7: every grade of one group in one discipline
pub fn group_grades_in_discipline(group_id: RecordId, discipline_id: RecordId) -> QuerySpec {
    QuerySpec::from_entity(Entity::Grade)
        .join(Entity::Student)
        .join(Entity::Group)
        .join(Entity::Discipline)
        .select(Projection::Column(DISCIPLINE_NAME))
        .select(Projection::Column(GROUP_NAME))
        .select(Projection::Column(GRADE_VALUE))
        .filter(eq(GROUP_ID, group_id))
        .filter(eq(DISCIPLINE_ID, discipline_id))
        .order_by(OrderKey::asc(OrderExpr::Column(GRADE_ID)))
}

/// 8: average grade a teacher gives across their disciplines
pub fn teacher_average(teacher_id: RecordId) -> QuerySpec {
    with_mean(
        QuerySpec::from_entity(Entity::Grade)
            .join(Entity::Discipline)
            .join(Entity::Teacher),
    )
    .filter(eq(TEACHER_ID, teacher_id))
}

/// 9: disciplines a student has grades in
pub fn student_disciplines(student_id: RecordId) -> QuerySpec {
    QuerySpec::from_entity(Entity::Grade)
        .join(Entity::Discipline)
        .join(Entity::Student)
        .select(Projection::Column(DISCIPLINE_NAME))
        .filter(eq(STUDENT_ID, student_id))
        .distinct()
        .order_by(OrderKey::asc(OrderExpr::Column(DISCIPLINE_NAME)))
}

/// 10: disciplines a student takes from one teacher
pub fn student_disciplines_by_teacher(student_id: RecordId, teacher_id: RecordId) -> QuerySpec {
    QuerySpec::from_entity(Entity::Grade)
        .join(Entity::Discipline)
        .join(Entity::Student)
        .join(Entity::Teacher)
        .select(Projection::Column(DISCIPLINE_NAME))
        .filter(eq(STUDENT_ID, student_id))
        .filter(eq(TEACHER_ID, teacher_id))
        .distinct()
        .order_by(OrderKey::asc(OrderExpr::Column(DISCIPLINE_NAME)))
}

/// 11: average grade one teacher gives one student
pub fn student_average_by_teacher(student_id: RecordId, teacher_id: RecordId) -> QuerySpec {
    with_mean(
        QuerySpec::from_entity(Entity::Grade)
            .join(Entity::Discipline)
            .join(Entity::Student)
            .join(Entity::Teacher),
    )
    .filter(eq(STUDENT_ID, student_id))
    .filter(eq(TEACHER_ID, teacher_id))
}

/// Latest session: `MAX(date_of)` of a discipline within a group
pub fn latest_session_date(discipline_id: RecordId, group_id: RecordId) -> QuerySpec {
    QuerySpec::from_entity(Entity::Grade)
        .join(Entity::Student)
        .join(Entity::Group)
        .select(Projection::Max(GRADE_DATE))
        .filter(eq(GRADE_DISCIPLINE, discipline_id))
        .filter(eq(GROUP_ID, group_id))
}

/// 12: grades of a group in a discipline on its latest session
pub fn latest_session_grades(discipline_id: RecordId, group_id: RecordId) -> QuerySpec {
    QuerySpec::from_entity(Entity::Grade)
        .join(Entity::Student)
        .join(Entity::Discipline)
        .join(Entity::Group)
        .select(Projection::Column(DISCIPLINE_NAME))
        .select(Projection::Column(STUDENT_NAME))
        .select(Projection::Column(GROUP_NAME))
        .select(Projection::Column(GRADE_DATE))
        .select(Projection::Column(GRADE_VALUE))
        .filter(eq(DISCIPLINE_ID, discipline_id))
        .filter(eq(GROUP_ID, group_id))
        .filter(Filter::EqSubquery(
            GRADE_DATE,
            Box::new(latest_session_date(discipline_id, group_id)),
        ))
        .order_by(OrderKey::desc(OrderExpr::Column(GRADE_DATE)))
        .order_by(OrderKey::asc(OrderExpr::Column(GRADE_ID)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: i64) -> RecordId {
        RecordId::new(value).unwrap()
    }

    #[test]
    fn test_every_report_renders() {
        let specs = [
            top_students(),
            best_student_in_discipline(id(1)),
            group_averages_in_discipline(id(1)),
            overall_average(),
            teacher_disciplines(id(1)),
            group_students(id(1)),
            group_grades_in_discipline(id(1), id(2)),
            teacher_average(id(1)),
            student_disciplines(id(1)),
            student_disciplines_by_teacher(id(1), id(2)),
            student_average_by_teacher(id(1), id(2)),
            latest_session_date(id(1), id(2)),
            latest_session_grades(id(1), id(2)),
        ];
        for spec in &specs {
            assert!(spec.render().is_ok(), "failed to render {:?}", spec);
        }
    }

    #[test]
    fn test_latest_session_binds_ids_twice() {
        let rendered = latest_session_grades(id(1), id(2)).render().unwrap();
        assert_eq!(rendered.params, vec![1, 2, 1, 2]);
    }

    #[test]
    fn test_top_students_is_capped() {
        let rendered = top_students().render().unwrap();
        assert!(rendered.sql.ends_with("LIMIT 5"));
    }
}
