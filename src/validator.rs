//! Form extractors.
//!
//! [`FormData`] decodes a urlencoded body and turns decoding failures into an
//! [`AppError`]. [`StudentSubmission`] accepts the student forms either
//! urlencoded or as `multipart/form-data`, the latter carrying an optional
//! profile picture.

use anyhow::anyhow;
use axum::{
    Form,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use schoolportal_core::AppError;
use schoolportal_models::{PictureChange, PictureUpload, StudentFields};

pub const PICTURE_FIELD: &str = "profile_picture";
pub const CLEAR_PICTURE_FIELD: &str = "profile_picture-clear";

#[derive(Debug, Clone, Copy, Default)]
pub struct FormData<T>(pub T);

impl<T, S> FromRequest<S> for FormData<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::new(rejection.status(), anyhow!(rejection.body_text())))?;

        Ok(FormData(value))
    }
}

/// A submitted student form.
#[derive(Debug, Clone, Default)]
pub struct StudentSubmission {
    pub fields: StudentFields,
    pub picture: Option<PictureUpload>,
    pub clear_picture: bool,
}

impl StudentSubmission {
    fn from_values(values: HashMap<String, String>, picture: Option<PictureUpload>) -> Self {
        Self {
            fields: StudentFields::from_map(&values),
            picture,
            clear_picture: values.contains_key(CLEAR_PICTURE_FIELD),
        }
    }

    /// A new upload wins over the clear checkbox.
    pub fn picture_change(self) -> PictureChange {
        match (self.picture, self.clear_picture) {
            (Some(upload), _) => PictureChange::Replace(upload),
            (None, true) => PictureChange::Clear,
            (None, false) => PictureChange::Keep,
        }
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

impl<S> FromRequest<S> for StudentSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let FormData(values) = FormData::<HashMap<String, String>>::from_request(req, state).await?;
            return Ok(Self::from_values(values, None));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| AppError::new(rejection.status(), anyhow!(rejection.body_text())))?;

        let mut values = HashMap::new();
        let mut picture = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == PICTURE_FIELD {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?;

                // Browsers send an empty part when no file was chosen.
                if !bytes.is_empty() {
                    picture = Some(PictureUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::new(e.status(), anyhow!(e.body_text())))?;
                values.insert(name, text);
            }
        }

        Ok(Self::from_values(values, picture))
    }
}
