//! Multipart plan forms
//!
//! `POST /plans` and `PATCH /plans/{id}` share one form layout: text fields
//! for the metadata and a `document` file field. Creation requires the
//! document and the core fields; updates accept any subset.

use std::str::FromStr;

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use planmart_common::catalog::parse_price;
use planmart_common::{Error, Result};

use crate::domain::entities::{Difficulty, PlanChanges, PlanDraft, DEFAULT_VERSION};

/// An uploaded document file
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Raw multipart fields, before validation
#[derive(Debug, Default)]
pub struct PlanForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub machine_type: Option<String>,
    pub difficulty: Option<String>,
    pub price: Option<String>,
    pub preview_description: Option<String>,
    pub author: Option<String>,
    pub version: Option<String>,
    pub preview: Option<String>,
    pub document: Option<DocumentUpload>,
}

fn multipart_error(err: MultipartError) -> Error {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(err.body_text())
    } else {
        Error::BadRequest(format!("Malformed multipart body: {}", err.body_text()))
    }
}

impl PlanForm {
    /// Read every field; `document` must be declared as `media_type`
    pub async fn read(mut multipart: Multipart, media_type: &str) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "document" {
                if form.document.is_some() {
                    return Err(Error::BadRequest(
                        "Only one document may be uploaded".to_string(),
                    ));
                }
                let content_type = field.content_type().map(str::to_string);
                if content_type.as_deref() != Some(media_type) {
                    return Err(Error::BadRequest(format!(
                        "The document must be uploaded as {}",
                        media_type
                    )));
                }
                let bytes = field.bytes().await.map_err(multipart_error)?;
                form.document = Some(DocumentUpload {
                    bytes: bytes.to_vec(),
                    content_type,
                });
                continue;
            }

            let slot = match name.as_str() {
                "title" => &mut form.title,
                "description" => &mut form.description,
                "category" => &mut form.category,
                "machine_type" => &mut form.machine_type,
                "difficulty" => &mut form.difficulty,
                "price" => &mut form.price,
                "preview_description" => &mut form.preview_description,
                "author" => &mut form.author,
                "version" => &mut form.version,
                "preview" => &mut form.preview,
                other => {
                    tracing::debug!(field = other, "Ignoring unknown form field");
                    continue;
                }
            };
            *slot = Some(field.text().await.map_err(multipart_error)?);
        }

        Ok(form)
    }

    /// Fields for a new plan; the document is required
    pub fn into_draft(self) -> Result<(PlanDraft, Vec<u8>)> {
        let document = self
            .document
            .ok_or_else(|| Error::BadRequest("A document file is required".to_string()))?;

        let draft = PlanDraft {
            title: required(self.title, "title")?,
            description: self.description.unwrap_or_default(),
            category: required(self.category, "category")?,
            machine_type: required(self.machine_type, "machine_type")?,
            difficulty: required(self.difficulty, "difficulty")?.parse()?,
            price: parse_price(&required(self.price, "price")?)?,
            preview_description: self.preview_description.unwrap_or_default(),
            author: required(self.author, "author")?,
            version: self
                .version
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            preview_pages: self
                .preview
                .as_deref()
                .map(parse_page_list)
                .transpose()?
                .unwrap_or_default(),
            declared_pages: None,
        };

        Ok((draft, document.bytes))
    }

    /// Partial changes plus an optional replacement document
    pub fn into_changes(self) -> Result<(PlanChanges, Option<Vec<u8>>)> {
        let changes = PlanChanges {
            title: self.title,
            description: self.description,
            category: self.category,
            machine_type: self.machine_type,
            difficulty: self
                .difficulty
                .as_deref()
                .map(Difficulty::from_str)
                .transpose()?,
            price: self.price.as_deref().map(parse_price).transpose()?,
            preview_description: self.preview_description,
            author: self.author,
            version: self.version,
            preview_pages: self.preview.as_deref().map(parse_page_list).transpose()?,
        };

        Ok((changes, self.document.map(|d| d.bytes)))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    value.ok_or_else(|| Error::BadRequest(format!("Field '{}' is required", field)))
}

/// Parse `"1,3,5"` or `"[1, 3, 5]"`; blank means an empty list
pub fn parse_page_list(raw: &str) -> Result<Vec<i32>> {
    let inner = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim();
    if inner.is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<i32>()
                .map_err(|_| Error::BadRequest(format!("Invalid page number '{}'", token.trim())))
        })
        .collect()
}
