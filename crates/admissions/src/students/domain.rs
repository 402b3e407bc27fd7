use serde::Serialize;

use super::form::AdmissionForm;
use super::service::SubmissionError;

/// Form field names as posted by the admission page.
pub mod fields {
    pub const NAME: &str = "name";
    pub const GUARDIAN_NAME: &str = "guardian-name";
    pub const GUARDIAN_PHONE: &str = "guardian-phone";
    pub const STUDENT_PHONE: &str = "student-phone";
    pub const DOB: &str = "dob";
    pub const ADDRESS: &str = "address";
    pub const CLASS: &str = "class";
    pub const SUBJECTS: &str = "subjects";
    pub const PHOTO: &str = "photo";
}

/// Separator used when flattening the multi-valued `subjects` field.
pub const SUBJECT_SEPARATOR: &str = ", ";

/// Applicant data ready for insertion; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub name: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub student_phone: String,
    pub dob: String,
    pub address: String,
    pub class: String,
    pub subjects: String,
    pub photo_path: Option<String>,
}

impl NewStudent {
    /// Read the applicant fields from a submitted form.
    ///
    /// Presence is the only check: an empty value counts as supplied. The photo is resolved
    /// separately by the upload sink, so `photo_path` starts out empty.
    pub fn from_form(form: &AdmissionForm) -> Result<Self, SubmissionError> {
        Ok(Self {
            name: form.required(fields::NAME)?.to_string(),
            guardian_name: form.required(fields::GUARDIAN_NAME)?.to_string(),
            guardian_phone: form.required(fields::GUARDIAN_PHONE)?.to_string(),
            student_phone: form.first(fields::STUDENT_PHONE).unwrap_or_default().to_string(),
            dob: form.required(fields::DOB)?.to_string(),
            address: form.required(fields::ADDRESS)?.to_string(),
            class: form.required(fields::CLASS)?.to_string(),
            subjects: form
                .all(fields::SUBJECTS)
                .collect::<Vec<_>>()
                .join(SUBJECT_SEPARATOR),
            photo_path: None,
        })
    }
}

/// A stored row of the `students` table, serialized column-for-column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub student_phone: Option<String>,
    pub dob: String,
    pub address: String,
    pub class: String,
    pub subjects: Option<String>,
    pub photo_path: Option<String>,
}

impl StudentRecord {
    pub fn from_new(id: i64, student: NewStudent) -> Self {
        Self {
            id,
            name: student.name,
            guardian_name: student.guardian_name,
            guardian_phone: student.guardian_phone,
            student_phone: Some(student.student_phone),
            dob: student.dob,
            address: student.address,
            class: student.class,
            subjects: Some(student.subjects),
            photo_path: student.photo_path,
        }
    }
}
