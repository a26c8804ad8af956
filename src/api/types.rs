//! Serde models for the backend-owned resources the CLI renders.
//!
//! The backend schema is still moving, so models are deliberately loose:
//! nearly every field is optional, unknown fields are ignored (or preserved
//! via flatten where provenance matters), and ids may be integers, UUIDs,
//! or strings depending on the service.

use std::collections::BTreeMap;
use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Primary key of a remote resource. The academics service uses integer
/// ids, the students service UUIDs, and a few endpoints return them as
/// strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Uuid(Uuid),
    Text(String),
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceId::Int(n) => write!(f, "{}", n),
            ResourceId::Uuid(u) => write!(f, "{}", u),
            ResourceId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for ResourceId {
    fn from(value: i64) -> Self {
        ResourceId::Int(value)
    }
}

impl From<Uuid> for ResourceId {
    fn from(value: Uuid) -> Self {
        ResourceId::Uuid(value)
    }
}

impl From<&str> for ResourceId {
    fn from(value: &str) -> Self {
        match value.parse::<i64>() {
            Ok(n) => ResourceId::Int(n),
            Err(_) => match value.parse::<Uuid>() {
                Ok(u) => ResourceId::Uuid(u),
                Err(_) => ResourceId::Text(value.to_string()),
            },
        }
    }
}

// ---- Academics service ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Option<ResourceId>,
    pub code: Option<String>,
    pub title: Option<String>,
    pub credits: Option<u32>,
    pub department: Option<ResourceId>,
    pub department_name: Option<String>,
    pub level: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Syllabus {
    pub id: Option<ResourceId>,
    pub course: Option<ResourceId>,
    pub course_title: Option<String>,
    pub academic_year: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
    pub approved_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: Option<ResourceId>,
    pub student: Option<ResourceId>,
    pub student_name: Option<String>,
    pub course_section: Option<ResourceId>,
    pub course_title: Option<String>,
    pub status: Option<String>,
    pub enrolled_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timetable {
    pub id: Option<ResourceId>,
    pub course_section: Option<ResourceId>,
    pub course_title: Option<String>,
    pub faculty_name: Option<String>,
    pub day_of_week: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: Option<ResourceId>,
    pub title: Option<String>,
    pub event_type: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_holiday: Option<bool>,
    pub description: Option<String>,
}

// ---- Exams service ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSession {
    pub id: Option<ResourceId>,
    pub name: Option<String>,
    pub academic_year: Option<String>,
    pub semester: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSchedule {
    pub id: Option<ResourceId>,
    pub exam_session: Option<ResourceId>,
    pub course: Option<ResourceId>,
    pub course_title: Option<String>,
    pub exam_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub duration_minutes: Option<u32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRoom {
    pub id: Option<ResourceId>,
    pub room_number: Option<String>,
    pub building: Option<String>,
    pub capacity: Option<u32>,
    pub current_allocation: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HallTicket {
    pub id: Option<ResourceId>,
    pub student: Option<ResourceId>,
    pub student_name: Option<String>,
    pub exam_schedule: Option<ResourceId>,
    pub ticket_number: Option<String>,
    pub status: Option<String>,
    pub issued_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamRegistration {
    pub id: Option<ResourceId>,
    pub student: Option<ResourceId>,
    pub student_name: Option<String>,
    pub exam_schedule: Option<ResourceId>,
    pub status: Option<String>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: Option<ResourceId>,
    pub student: Option<ResourceId>,
    pub exam_schedule: Option<ResourceId>,
    pub marks_obtained: Option<f64>,
    pub max_marks: Option<f64>,
    pub grade: Option<String>,
    pub is_published: Option<bool>,
}

// ---- Students service ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<ResourceId>,
    pub roll_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<ResourceId>,
    pub department_name: Option<String>,
    pub batch: Option<ResourceId>,
    pub status: Option<String>,
    pub admission_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomField {
    pub id: Option<ResourceId>,
    pub name: Option<String>,
    pub field_type: Option<String>,
    pub required: Option<bool>,
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<ResourceId>,
    pub student: Option<ResourceId>,
    pub document_type: Option<String>,
    pub file_name: Option<String>,
    pub uploaded_at: Option<NaiveDateTime>,
    pub verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentHistoryEntry {
    pub id: Option<ResourceId>,
    pub student: Option<ResourceId>,
    pub academic_year: Option<String>,
    pub semester: Option<String>,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

/// Where a batch record came from during endpoint probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchSource {
    /// The canonical student-batches resource (any path spelling).
    Batches,
    /// A divisions record remapped into the batch shape.
    Division,
}

/// A student batch in the canonical shape, regardless of which backend
/// resource supplied it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentBatch {
    pub id: ResourceId,
    pub batch_name: Option<String>,
    pub academic_year: Option<String>,
    pub semester: Option<String>,
    pub section: Option<String>,
    pub department: Option<ResourceId>,
    pub department_name: Option<String>,
    pub academic_program: Option<ResourceId>,
    pub academic_program_name: Option<String>,
    #[serde(default)]
    pub students_count: u64,
    /// Provenance tag; absent on records parsed straight off the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<BatchSource>,
    /// Source fields the remap did not consume, preserved as-is.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Division keys read by the remap. Kept out of `extra` so a remapped batch
/// serializes each value under one name only.
const DIVISION_REMAP_KEYS: [&str; 24] = [
    "id",
    "pk",
    "uuid",
    "division_id",
    "batch_name",
    "name",
    "title",
    "division_name",
    "academic_year_display",
    "academic_year",
    "ay",
    "semester",
    "sem",
    "section",
    "sec",
    "department",
    "department_id",
    "department_name",
    "academic_program",
    "program_id",
    "academic_program_name",
    "program_name",
    "students_count",
    "count",
];

impl StudentBatch {
    /// Remaps a divisions record's heterogeneous field names into the
    /// canonical batch shape. Returns `None` when no usable id exists.
    pub fn from_division(record: &Value) -> Option<Self> {
        let obj = record.as_object()?;
        let pick = |keys: &[&str]| -> Option<Value> {
            keys.iter()
                .find_map(|k| obj.get(*k).filter(|v| !v.is_null()))
                .cloned()
        };
        let pick_str = |keys: &[&str]| -> Option<String> {
            keys.iter()
                .find_map(|k| obj.get(*k).and_then(|v| v.as_str().map(String::from)))
        };

        let id: ResourceId =
            serde_json::from_value(pick(&["id", "pk", "uuid", "division_id"])?).ok()?;
        let batch_name = pick_str(&["batch_name", "name", "title", "division_name"])
            .or_else(|| Some(format!("Division {}", id)));

        let mut extra = BTreeMap::new();
        for (key, value) in obj {
            if !DIVISION_REMAP_KEYS.contains(&key.as_str()) {
                extra.insert(key.clone(), value.clone());
            }
        }

        Some(Self {
            batch_name,
            academic_year: pick_str(&["academic_year_display", "academic_year", "ay"]),
            semester: pick_str(&["semester", "sem"]),
            section: pick_str(&["section", "sec"]),
            department: pick(&["department", "department_id"])
                .and_then(|v| serde_json::from_value(v).ok()),
            department_name: pick_str(&["department_name", "department"]),
            academic_program: pick(&["academic_program", "program_id"])
                .and_then(|v| serde_json::from_value(v).ok()),
            academic_program_name: pick_str(&["academic_program_name", "program_name"]),
            students_count: pick(&["students_count", "count"])
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            source: Some(BatchSource::Division),
            extra,
            id,
        })
    }
}
