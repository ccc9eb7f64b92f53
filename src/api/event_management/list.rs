use std::collections::HashMap;

use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;

use super::models::{Event, EventList, EventOut};
use crate::api::bar_management::get_bar::find_bar;
use crate::api::bar_management::models::Bar;
use crate::attachment::{self, Attachment};
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;
use crate::settings::Settings;

type EventRows = (Vec<(Event, Bar)>, HashMap<i32, Attachment>);

fn load_events(c: &mut SqliteConnection, bar: Option<i32>) -> Result<EventRows, ErrorResponse> {
    use schema::{bars, events};

    let mut query = events::table
        .inner_join(bars::table)
        .select((events::all_columns, bars::all_columns))
        .order((events::date.asc(), events::id.asc()))
        .into_boxed();
    if let Some(bid) = bar {
        query = query.filter(events::bar_id.eq(bid));
    }
    let rows = query.load::<(Event, Bar)>(c)?;

    let flyer_ids = rows
        .iter()
        .filter_map(|(event, _)| event.flyer_image_id)
        .collect();
    let flyers = attachment::load_by_ids(c, flyer_ids)?;

    Ok((rows, flyers))
}

fn render(rows: EventRows, settings: &Settings) -> EventList {
    let (rows, flyers) = rows;

    EventList {
        events: rows
            .iter()
            .map(|(event, bar)| {
                let flyer = event.flyer_image_id.and_then(|id| flyers.get(&id));
                EventOut::new(event, Some(bar), flyer, settings)
            })
            .collect(),
    }
}

#[get("/events")]
pub(crate) async fn get_events(
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<EventList>, ErrorResponse> {
    let rows = conn.run(|c| load_events(c, None)).await?;

    Ok(Json(render(rows, settings)))
}

#[get("/bars/<bid>/events")]
pub(crate) async fn get_bar_events(
    bid: i32,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<EventList>, ErrorResponse> {
    let rows = conn
        .run(move |c| {
            find_bar(c, bid)?;
            load_events(c, Some(bid))
        })
        .await?;

    Ok(Json(render(rows, settings)))
}
