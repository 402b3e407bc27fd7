//! Admission intake for the `students` table.
//!
//! Submissions arrive as HTML form posts, optionally carrying a photo. The service checks that
//! the required fields are present, hands the photo to the upload sink, and inserts one row into
//! whichever record store the configuration selected. The listing side returns every stored row.

pub mod domain;
pub mod form;
pub mod router;
pub mod service;
pub mod store;
pub mod uploads;

#[cfg(test)]
mod tests;

pub use domain::{NewStudent, StudentRecord};
pub use form::{AdmissionForm, PhotoUpload};
pub use router::admission_router;
pub use service::{AdmissionService, SubmissionError};
pub use store::{
    DatabaseStore, PostgresStudentStore, SqliteStudentStore, StoreError, StudentStore,
};
pub use uploads::UploadSink;
