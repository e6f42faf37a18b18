//! Data model - the five academic-records entities
//!
//! - `Teacher` owns zero or more `Discipline`s
//! - `Group` owns zero or more `Student`s
//! - `Grade` is the fact table linking a student and a discipline on a date
//!
//! Entities are read-only from the query module's point of view. They are
//! only constructed here for dataset import and for typed report rows.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::str::FromStr;

/// Positive row identifier accepted by every report operation.
///
/// Construction is the only validation point: a malformed or non-positive
/// identifier is rejected here, before any store access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(value: i64) -> Result<Self> {
        if value <= 0 {
            return Err(Error::InvalidInput(format!(
                "identifier must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for RecordId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<RecordId> for i64 {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl FromStr for RecordId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("not an identifier: {:?}", s)))?;
        Self::new(value)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mean grade rounded to two decimal places.
///
/// Stored as an exact number of hundredths. Rounding is half away from zero
/// and is computed from the integer sum and count, so `2.125` always becomes
/// `2.13` regardless of binary floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Average {
    hundredths: i64,
}

impl Average {
    /// Mean of `count` grades summing to `sum`; `None` for an empty set.
    pub fn from_sum_count(sum: i64, count: i64) -> Option<Self> {
        if count <= 0 {
            return None;
        }
        let scaled = sum * 100;
        let mut hundredths = scaled / count;
        let remainder = scaled % count;
        if 2 * remainder.abs() >= count {
            hundredths += scaled.signum();
        }
        Some(Self { hundredths })
    }

    pub fn from_hundredths(hundredths: i64) -> Self {
        Self { hundredths }
    }

    pub fn as_f64(&self) -> f64 {
        self.hundredths as f64 / 100.0
    }
}

impl std::fmt::Display for Average {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.hundredths < 0 { "-" } else { "" };
        let abs = self.hundredths.abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Serialize for Average {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: RecordId,
    pub fullname: String,
}

/// A taught subject, owned by exactly one teacher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discipline {
    pub id: RecordId,
    pub name: String,
    pub teacher_id: RecordId,
}

/// A cohort of students sharing the same roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: RecordId,
    pub fullname: String,
    pub group_id: RecordId,
}

/// A single scored event: one student, one discipline, one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grade {
    pub id: RecordId,
    pub student_id: RecordId,
    pub discipline_id: RecordId,
    pub grade: i64,
    pub date_of: NaiveDate,
}

/// A complete set of records, as loaded from a JSON dataset file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub teachers: Vec<Teacher>,
    pub groups: Vec<Group>,
    pub disciplines: Vec<Discipline>,
    pub students: Vec<Student>,
    pub grades: Vec<Grade>,
}

impl Dataset {
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn total_records(&self) -> usize {
        self.teachers.len()
            + self.groups.len()
            + self.disciplines.len()
            + self.students.len()
            + self.grades.len()
    }
}
