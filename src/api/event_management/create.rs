use chrono::NaiveDate;
use diesel::prelude::*;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::models::{Event, EventEnvelope, EventOut, EventParams, EventPayload};
use crate::api::bar_management::get_bar::find_bar;
use crate::api::bar_management::models::Bar;
use crate::api::user_management::models::UserLoggedIn;
use crate::attachment::{discard_on_error, prepare_image};
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{bars, events};
use crate::settings::Settings;
use crate::validation::{non_blank, Validator};

#[derive(Insertable)]
#[diesel(table_name = events)]
struct NewEvent {
    name: String,
    description: Option<String>,
    date: NaiveDate,
    bar_id: i32,
    flyer_image_id: Option<i32>,
}

async fn create_event(
    bar_in_path: Option<i32>,
    params: EventParams,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &Settings,
) -> Result<(Status, Json<EventEnvelope>), ErrorResponse> {
    if let Some(bid) = bar_in_path {
        conn.run(move |c| find_bar(c, bid).map(|_| ())).await?;
    }

    let (validator, date) = params.validate(false, bar_in_path.is_some());
    validator.finish()?;
    let (date, bid) = match (date, bar_in_path.or(params.bar_id)) {
        (Some(date), Some(bid)) => (date, bid),
        _ => return Err(ErrorResponse::internal("Event fields missing after validation")),
    };

    let flyer_image = prepare_image(
        settings,
        "flyer_image",
        "flyer_image",
        params.flyer_image_base64.as_deref(),
    )
    .await?;
    let pending = flyer_image.clone();

    let name = params.name.unwrap_or_default().trim().to_string();
    let description = non_blank(params.description);

    let result = conn
        .run(move |c| {
            c.transaction::<_, ErrorResponse, _>(|c| {
                let bar = bars::table.find(bid).first::<Bar>(c).optional()?;
                let bar = match bar {
                    Some(bar) => bar,
                    None => {
                        let mut validator = Validator::new();
                        validator.add("bar", "must exist");
                        return Err(ErrorResponse::unprocessable(validator.errors().clone()));
                    }
                };

                let flyer = pending.as_ref().map(|image| image.insert(c)).transpose()?;

                let event = diesel::insert_into(events::table)
                    .values(&NewEvent {
                        name,
                        description,
                        date,
                        bar_id: bar.id,
                        flyer_image_id: flyer.as_ref().map(|flyer| flyer.id),
                    })
                    .get_result::<Event>(c)?;

                Ok((event, bar, flyer))
            })
        })
        .await;
    let (event, bar, flyer) = discard_on_error(result, flyer_image).await?;

    info!("User {} created event {} at bar {}", user.0.id, event.id, bar.id);

    Ok((
        Status::Created,
        Json(EventEnvelope {
            event: EventOut::new(&event, Some(&bar), flyer.as_ref(), settings),
            message: Some("Event created successfully.".to_string()),
        }),
    ))
}

#[post("/events", data = "<payload>")]
pub(crate) async fn post_event(
    payload: Json<EventPayload>,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<(Status, Json<EventEnvelope>), ErrorResponse> {
    create_event(None, payload.into_inner().event, user, conn, settings).await
}

/// The bar in the path wins over any `bar_id` in the payload.
#[post("/bars/<bid>/events", data = "<payload>")]
pub(crate) async fn post_bar_event(
    bid: i32,
    payload: Json<EventPayload>,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<(Status, Json<EventEnvelope>), ErrorResponse> {
    create_event(Some(bid), payload.into_inner().event, user, conn, settings).await
}
