use std::collections::HashMap;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use log::{info, warn};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use rocket::tokio::fs;
use serde::Serialize;
use thiserror::Error;

use crate::error::ErrorResponse;
use crate::schema::attachments;
use crate::settings::Settings;
use crate::validation::Validator;

const KEY_LEN: usize = 32;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ImageError {
    #[error("can't be empty")]
    Empty,
    #[error("is not valid base64 data")]
    InvalidBase64,
    #[error("must be a PNG, JPEG, GIF or WEBP image")]
    UnsupportedType,
}

#[derive(Queryable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = attachments)]
pub struct Attachment {
    pub id: i32,
    pub storage_key: String,
    pub filename: String,
    pub content_type: String,
    pub byte_size: i64,
    pub created_at: NaiveDateTime,
}

impl Attachment {
    pub fn url(&self, settings: &Settings) -> String {
        format!(
            "{}/api/v1/attachments/{}",
            settings.public_url.trim_end_matches('/'),
            self.storage_key
        )
    }
}

#[derive(Insertable)]
#[diesel(table_name = attachments)]
struct NewAttachment<'a> {
    storage_key: &'a str,
    filename: &'a str,
    content_type: &'a str,
    byte_size: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

/// Decodes a data URI (`data:image/png;base64,...`) or bare base64 string.
///
/// The content type is taken from the image bytes, a data URI header only has to agree
/// that the payload is an image.
pub fn decode_image(encoded: &str, name: &str) -> Result<DecodedImage, ImageError> {
    let encoded = encoded.trim();
    let payload = match encoded.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or(ImageError::InvalidBase64)?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or(ImageError::InvalidBase64)?;
            if !mime.starts_with("image/") {
                return Err(ImageError::UnsupportedType);
            }
            payload
        }
        None => encoded,
    };

    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if payload.is_empty() {
        return Err(ImageError::Empty);
    }

    let bytes = STANDARD
        .decode(payload.as_bytes())
        .map_err(|_| ImageError::InvalidBase64)?;
    if bytes.is_empty() {
        return Err(ImageError::Empty);
    }

    let (content_type, extension) = sniff(&bytes).ok_or(ImageError::UnsupportedType)?;

    Ok(DecodedImage {
        bytes,
        content_type,
        filename: format!("{}.{}", name, extension),
    })
}

fn sniff(bytes: &[u8]) -> Option<(&'static str, &'static str)> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(("image/png", "png"))
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(("image/jpeg", "jpg"))
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some(("image/gif", "gif"))
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some(("image/webp", "webp"))
    } else {
        None
    }
}

fn generate_storage_key() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(KEY_LEN)
        .map(char::from)
        .collect()
}

/// Image bytes written to the image folder but not yet recorded in the database.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub storage_key: String,
    pub filename: String,
    pub content_type: &'static str,
    pub byte_size: i64,
    path: PathBuf,
}

impl StoredImage {
    pub async fn write(folder: &str, image: DecodedImage) -> std::io::Result<StoredImage> {
        fs::create_dir_all(folder).await?;

        let storage_key = generate_storage_key();
        let path = Path::new(folder).join(&storage_key);
        fs::write(&path, &image.bytes).await?;

        Ok(StoredImage {
            storage_key,
            filename: image.filename,
            content_type: image.content_type,
            byte_size: image.bytes.len() as i64,
            path,
        })
    }

    /// Records the attachment row. Meant to run inside the owner's transaction.
    pub fn insert(&self, conn: &mut SqliteConnection) -> QueryResult<Attachment> {
        diesel::insert_into(attachments::table)
            .values(&NewAttachment {
                storage_key: &self.storage_key,
                filename: &self.filename,
                content_type: self.content_type,
                byte_size: self.byte_size,
            })
            .get_result::<Attachment>(conn)
    }

    /// Removes the file again after the owning record could not be saved.
    pub async fn discard(self) {
        if let Err(err) = fs::remove_file(&self.path).await {
            warn!("Couldn't remove orphaned image {:?}: {}", self.path, err);
        }
    }
}

/// Decodes and stores an optional base64 image field.
///
/// Bad payloads become a 422 on `field`, storage failures a 500.
pub async fn prepare_image(
    settings: &Settings,
    field: &str,
    name: &str,
    encoded: Option<&str>,
) -> Result<Option<StoredImage>, ErrorResponse> {
    let encoded = match encoded {
        Some(encoded) => encoded,
        None => return Ok(None),
    };

    let image = decode_image(encoded, name).map_err(|err| {
        let mut validator = Validator::new();
        validator.add(field, err.to_string());
        ErrorResponse::unprocessable(validator.errors().clone())
    })?;

    let stored = StoredImage::write(&settings.image_folder, image)
        .await
        .map_err(|err| ErrorResponse::internal(format!("Couldn't save image: {}", err)))?;

    info!(
        "Stored {} ({} bytes) as {}",
        stored.filename, stored.byte_size, stored.storage_key
    );

    Ok(Some(stored))
}

/// Discards `image` when `result` failed, passing `result` through either way.
pub async fn discard_on_error<T>(
    result: Result<T, ErrorResponse>,
    image: Option<StoredImage>,
) -> Result<T, ErrorResponse> {
    if result.is_err() {
        if let Some(image) = image {
            image.discard().await;
        }
    }
    result
}

pub fn load_by_ids(
    conn: &mut SqliteConnection,
    ids: Vec<i32>,
) -> QueryResult<HashMap<i32, Attachment>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(attachments::table
        .filter(attachments::id.eq_any(ids))
        .load::<Attachment>(conn)?
        .into_iter()
        .map(|attachment| (attachment.id, attachment))
        .collect())
}

/// Deletes attachment rows and returns their storage keys so the files can be removed
/// once the surrounding transaction has committed.
pub fn delete_rows(conn: &mut SqliteConnection, ids: Vec<i32>) -> QueryResult<Vec<String>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let keys = attachments::table
        .filter(attachments::id.eq_any(ids.clone()))
        .select(attachments::storage_key)
        .load::<String>(conn)?;
    diesel::delete(attachments::table.filter(attachments::id.eq_any(ids))).execute(conn)?;

    Ok(keys)
}

pub async fn remove_files(folder: &str, keys: Vec<String>) {
    for key in keys {
        let path = Path::new(folder).join(&key);
        if let Err(err) = fs::remove_file(&path).await {
            warn!("Couldn't remove image {:?}: {}", path, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn decodes_data_uri() {
        let encoded = format!("data:image/png;base64,{}", STANDARD.encode(PNG_HEADER));
        let image = decode_image(&encoded, "flyer_image").unwrap();

        assert_eq!(image.bytes, PNG_HEADER);
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.filename, "flyer_image.png");
    }

    #[test]
    fn decodes_bare_base64_by_sniffing() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        let image = decode_image(&STANDARD.encode(jpeg), "image").unwrap();

        assert_eq!(image.content_type, "image/jpeg");
        assert_eq!(image.filename, "image.jpg");
    }

    #[test]
    fn tolerates_line_breaks_in_payload() {
        let encoded = STANDARD.encode(b"GIF89a\x01\x00\x01\x00");
        let (head, tail) = encoded.split_at(4);
        let image = decode_image(&format!("{}\n{}", head, tail), "image").unwrap();

        assert_eq!(image.content_type, "image/gif");
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert_eq!(decode_image("", "image"), Err(ImageError::Empty));
        assert_eq!(
            decode_image("data:image/png;base64,", "image"),
            Err(ImageError::Empty)
        );
        assert_eq!(
            decode_image("!!not base64!!", "image"),
            Err(ImageError::InvalidBase64)
        );
        assert_eq!(
            decode_image("data:image/png,abc", "image"),
            Err(ImageError::InvalidBase64)
        );
        assert_eq!(
            decode_image(&STANDARD.encode(b"plain text"), "image"),
            Err(ImageError::UnsupportedType)
        );
        assert_eq!(
            decode_image("data:text/plain;base64,aGVsbG8=", "image"),
            Err(ImageError::UnsupportedType)
        );
    }

    #[test]
    fn storage_keys_are_alphanumeric() {
        let key = generate_storage_key();
        assert_eq!(key.len(), KEY_LEN);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
