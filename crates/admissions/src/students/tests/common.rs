use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use serde_json::Value;
use tempfile::TempDir;

use crate::config::ValidationPolicy;
use crate::students::domain::{NewStudent, StudentRecord};
use crate::students::form::{AdmissionForm, PhotoUpload};
use crate::students::service::AdmissionService;
use crate::students::store::{StoreError, StudentStore};
use crate::students::uploads::UploadSink;

pub(super) const BOUNDARY: &str = "----admission-form-boundary";

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<Vec<StudentRecord>>>,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<StudentRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl StudentStore for MemoryStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn insert(&self, student: &NewStudent) -> Result<i64, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let id = guard.len() as i64 + 1;
        guard.push(StudentRecord::from_new(id, student.clone()));
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        Ok(self.records())
    }
}

pub(super) struct UnavailableStore;

impl StudentStore for UnavailableStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn insert(&self, _student: &NewStudent) -> Result<i64, StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
    }
}

pub(super) fn build_service(
    policy: ValidationPolicy,
) -> (AdmissionService<MemoryStore>, MemoryStore, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = MemoryStore::default();
    let uploads = UploadSink::create(dir.path().join("uploads")).expect("upload dir");
    let service = AdmissionService::new(Arc::new(store.clone()), uploads, policy);
    (service, store, dir)
}

pub(super) fn unavailable_service() -> (AdmissionService<UnavailableStore>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let uploads = UploadSink::create(dir.path()).expect("upload dir");
    let service = AdmissionService::new(
        Arc::new(UnavailableStore),
        uploads,
        ValidationPolicy::Legacy,
    );
    (service, dir)
}

pub(super) fn complete_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Asha Rao"),
        ("guardian-name", "Meera Rao"),
        ("guardian-phone", "555-0100"),
        ("student-phone", "555-0199"),
        ("dob", "2012-04-09"),
        ("address", "12 Lake Road"),
        ("class", "6"),
        ("subjects", "Math"),
        ("subjects", "Science"),
    ]
}

pub(super) fn fields_without(field: &str) -> Vec<(&'static str, &'static str)> {
    complete_fields()
        .into_iter()
        .filter(|(name, _)| *name != field)
        .collect()
}

pub(super) fn form(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> AdmissionForm {
    AdmissionForm::new(
        fields
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        photo.map(|(filename, bytes)| PhotoUpload {
            filename: filename.to_string(),
            bytes: bytes.to_vec(),
        }),
    )
}

pub(super) fn multipart_body(fields: &[(&str, &str)], photo: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub(super) fn submit_request(
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Request<Body> {
    Request::post("/submit")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, photo)))
        .expect("request builds")
}

pub(super) fn get_request(path: &str) -> Request<Body> {
    Request::get(path).body(Body::empty()).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
