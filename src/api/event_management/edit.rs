use chrono::{NaiveDate, NaiveDateTime, Utc};
use diesel::prelude::*;
use log::info;
use rocket::serde::json::Json;
use rocket::State;

use super::get_event::{find_event, load_event};
use super::models::{EventEnvelope, EventOut, EventPayload};
use crate::api::user_management::models::UserLoggedIn;
use crate::attachment::{self, discard_on_error, prepare_image};
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{bars, events};
use crate::settings::Settings;
use crate::validation::{non_blank, Validator};

#[derive(AsChangeset)]
#[diesel(table_name = events)]
struct EventChanges {
    name: Option<String>,
    description: Option<Option<String>>,
    date: Option<NaiveDate>,
    bar_id: Option<i32>,
    flyer_image_id: Option<Option<i32>>,
    updated_at: NaiveDateTime,
}

async fn update_event(
    eid: i32,
    payload: EventPayload,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &Settings,
) -> Result<Json<EventEnvelope>, ErrorResponse> {
    conn.run(move |c| find_event(c, eid).map(|_| ())).await?;

    let params = payload.event;
    let (validator, date) = params.validate(true, false);
    validator.finish()?;

    let flyer_image = prepare_image(
        settings,
        "flyer_image",
        "flyer_image",
        params.flyer_image_base64.as_deref(),
    )
    .await?;
    let pending = flyer_image.clone();

    let mut changes = EventChanges {
        name: params.name.map(|name| name.trim().to_string()),
        description: params.description.map(|text| non_blank(Some(text))),
        date,
        bar_id: params.bar_id,
        flyer_image_id: None,
        updated_at: Utc::now().naive_utc(),
    };

    let result = conn
        .run(move |c| {
            c.transaction::<_, ErrorResponse, _>(|c| {
                let event = find_event(c, eid)?;

                if let Some(bid) = changes.bar_id {
                    let bar_exists = bars::table
                        .find(bid)
                        .count()
                        .get_result::<i64>(c)?
                        > 0;
                    if !bar_exists {
                        let mut validator = Validator::new();
                        validator.add("bar", "must exist");
                        validator.finish()?;
                    }
                }

                let mut replaced = Vec::new();
                if let Some(flyer) = pending.as_ref().map(|image| image.insert(c)).transpose()? {
                    changes.flyer_image_id = Some(Some(flyer.id));
                    replaced.extend(event.flyer_image_id);
                }

                diesel::update(events::table.find(eid))
                    .set(&changes)
                    .execute(c)?;
                let removed_keys = attachment::delete_rows(c, replaced)?;

                let (event, bar, flyer) = load_event(c, eid)?;
                Ok((event, bar, flyer, removed_keys))
            })
        })
        .await;
    let (event, bar, flyer, removed_keys) = discard_on_error(result, flyer_image).await?;

    attachment::remove_files(&settings.image_folder, removed_keys).await;
    info!("User {} updated event {}", user.0.id, event.id);

    Ok(Json(EventEnvelope {
        event: EventOut::new(&event, Some(&bar), flyer.as_ref(), settings),
        message: Some("Event updated successfully.".to_string()),
    }))
}

#[put("/events/<eid>", data = "<payload>")]
pub(crate) async fn put_event(
    eid: i32,
    payload: Json<EventPayload>,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<EventEnvelope>, ErrorResponse> {
    update_event(eid, payload.into_inner(), user, conn, settings).await
}

#[patch("/events/<eid>", data = "<payload>")]
pub(crate) async fn patch_event(
    eid: i32,
    payload: Json<EventPayload>,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<EventEnvelope>, ErrorResponse> {
    update_event(eid, payload.into_inner(), user, conn, settings).await
}
