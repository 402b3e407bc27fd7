use axum::async_trait;
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;

use super::domain::fields;
use super::service::SubmissionError;

/// File part posted under the `photo` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// Client-declared filename, unsanitized.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Decoded admission form: ordered text fields plus the optional photo part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdmissionForm {
    fields: Vec<(String, String)>,
    photo: Option<PhotoUpload>,
}

impl AdmissionForm {
    pub fn new(fields: Vec<(String, String)>, photo: Option<PhotoUpload>) -> Self {
        Self { fields, photo }
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required(&self, name: &'static str) -> Result<&str, SubmissionError> {
        self.first(name)
            .ok_or(SubmissionError::MissingField { field: name })
    }

    pub fn photo(&self) -> Option<&PhotoUpload> {
        self.photo.as_ref()
    }

    pub fn take_photo(&mut self) -> Option<PhotoUpload> {
        self.photo.take()
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, SubmissionError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(malformed)? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let bytes = field.bytes().await.map_err(malformed)?;
                    // Only the first photo part counts; other file parts are ignored.
                    if name == fields::PHOTO && form.photo.is_none() {
                        form.photo = Some(PhotoUpload {
                            filename,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                None => {
                    let value = field.text().await.map_err(malformed)?;
                    form.fields.push((name, value));
                }
            }
        }

        Ok(form)
    }
}

fn malformed(err: axum::extract::multipart::MultipartError) -> SubmissionError {
    SubmissionError::MalformedForm(err.body_text())
}

#[async_trait]
impl<S> FromRequest<S> for AdmissionForm
where
    S: Send + Sync,
{
    type Rejection = SubmissionError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok());

        match content_type {
            Some(mime) if mime.essence_str() == mime::MULTIPART_FORM_DATA.essence_str() => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|rejection| SubmissionError::MalformedForm(rejection.body_text()))?;
                Self::from_multipart(multipart).await
            }
            Some(mime) if mime.essence_str() == mime::APPLICATION_WWW_FORM_URLENCODED.essence_str() => {
                let Form(fields) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|rejection| SubmissionError::MalformedForm(rejection.body_text()))?;
                Ok(Self::new(fields, None))
            }
            // Anything else carries no form data; required-field checks report what is missing.
            _ => Ok(Self::default()),
        }
    }
}
