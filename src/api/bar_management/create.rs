use diesel::prelude::*;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;

use super::models::{Bar, BarEnvelope, BarOut, BarPayload};
use crate::api::user_management::models::UserLoggedIn;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::bars;

#[derive(Insertable)]
#[diesel(table_name = bars)]
struct NewBar {
    name: String,
}

#[post("/bars", data = "<payload>")]
pub(crate) async fn create_bar(
    payload: Json<BarPayload>,
    user: UserLoggedIn,
    conn: DbConn,
) -> Result<(Status, Json<BarEnvelope>), ErrorResponse> {
    let params = payload.into_inner().bar;
    params.validate(false).finish()?;

    let new_bar = NewBar {
        name: params.name.unwrap_or_default().trim().to_string(),
    };

    let bar = conn
        .run(move |c| {
            Ok(diesel::insert_into(bars::table)
                .values(&new_bar)
                .get_result::<Bar>(c)?)
        })
        .await?;

    info!("User {} created bar {}", user.0.id, bar.id);

    Ok((
        Status::Created,
        Json(BarEnvelope {
            bar: BarOut::from(&bar),
            message: Some("Bar created successfully.".to_string()),
        }),
    ))
}
