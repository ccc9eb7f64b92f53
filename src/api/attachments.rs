use diesel::prelude::*;
use log::warn;
use rocket::http::ContentType;
use rocket::tokio::fs::File;
use rocket::State;

use crate::attachment::Attachment;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::attachments;
use crate::settings::Settings;

/// Serves stored image bytes with their recorded content type.
#[get("/attachments/<key>")]
pub(crate) async fn get_attachment(
    key: String,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<(ContentType, File), ErrorResponse> {
    let lookup = key.clone();
    let attachment = conn
        .run(move |c| {
            attachments::table
                .filter(attachments::storage_key.eq(lookup))
                .first::<Attachment>(c)
                .optional()?
                .ok_or_else(|| ErrorResponse::not_found("Attachment not found"))
        })
        .await?;

    let path = std::path::Path::new(&settings.image_folder).join(&attachment.storage_key);
    let file = File::open(&path).await.map_err(|err| {
        warn!("Attachment {} has no file at {:?}: {}", key, path, err);
        ErrorResponse::not_found("Attachment not found")
    })?;

    let content_type =
        ContentType::parse_flexible(&attachment.content_type).unwrap_or(ContentType::Binary);

    Ok((content_type, file))
}
