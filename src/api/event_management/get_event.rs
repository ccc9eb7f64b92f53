use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;

use super::models::{Event, EventEnvelope, EventOut};
use crate::api::bar_management::get_bar::find_bar;
use crate::api::bar_management::models::Bar;
use crate::attachment::Attachment;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;
use crate::settings::Settings;

pub(crate) fn find_event(c: &mut SqliteConnection, eid: i32) -> Result<Event, ErrorResponse> {
    use schema::events::dsl::*;

    events
        .find(eid)
        .first::<Event>(c)
        .optional()?
        .ok_or_else(|| ErrorResponse::not_found("Event not found"))
}

/// Loads the event together with its bar and flyer attachment.
pub(crate) fn load_event(
    c: &mut SqliteConnection,
    eid: i32,
) -> Result<(Event, Bar, Option<Attachment>), ErrorResponse> {
    let event = find_event(c, eid)?;
    let bar = find_bar(c, event.bar_id)?;
    let flyer = match event.flyer_image_id {
        Some(flyer_id) => {
            use schema::attachments::dsl::*;
            attachments.find(flyer_id).first::<Attachment>(c).optional()?
        }
        None => None,
    };

    Ok((event, bar, flyer))
}

#[get("/events/<eid>")]
pub(crate) async fn get_event(
    eid: i32,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<EventEnvelope>, ErrorResponse> {
    let (event, bar, flyer) = conn.run(move |c| load_event(c, eid)).await?;

    Ok(Json(EventEnvelope {
        event: EventOut::new(&event, Some(&bar), flyer.as_ref(), settings),
        message: None,
    }))
}
