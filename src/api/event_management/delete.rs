use diesel::prelude::*;
use log::info;
use rocket::http::Status;
use rocket::State;

use super::get_event::find_event;
use crate::api::user_management::models::UserLoggedIn;
use crate::attachment;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{event_pictures, events};
use crate::settings::Settings;

/// Pictures and attendances go with the event through `ON DELETE CASCADE`; their
/// attachments and the flyer are removed here.
#[delete("/events/<eid>")]
pub(crate) async fn delete_event(
    eid: i32,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Status, ErrorResponse> {
    let removed_keys = conn
        .run(move |c| {
            c.transaction::<_, ErrorResponse, _>(|c| {
                let event = find_event(c, eid)?;

                let mut image_ids = event_pictures::table
                    .filter(event_pictures::event_id.eq(event.id))
                    .select(event_pictures::image_id)
                    .load::<i32>(c)?;
                image_ids.extend(event.flyer_image_id);

                diesel::delete(events::table.find(event.id)).execute(c)?;

                Ok(attachment::delete_rows(c, image_ids)?)
            })
        })
        .await?;

    attachment::remove_files(&settings.image_folder, removed_keys).await;
    info!("User {} deleted event {}", user.0.id, eid);

    Ok(Status::NoContent)
}
