use diesel::prelude::*;
use rocket::serde::json::Json;

use super::get_bar::find_bar;
use super::models::{Bar, BarEnvelope, BarOut, BarPayload};
use crate::api::user_management::models::UserLoggedIn;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;

async fn update_bar(
    bid: i32,
    payload: BarPayload,
    conn: DbConn,
) -> Result<Json<BarEnvelope>, ErrorResponse> {
    let params = payload.bar;

    let bar = conn
        .run(move |c| {
            let mut bar = find_bar(c, bid)?;
            params.validate(true).finish()?;

            if let Some(new_name) = params.name {
                use schema::bars::dsl::*;

                bar = diesel::update(bars.find(bid))
                    .set(name.eq(new_name.trim()))
                    .get_result::<Bar>(c)?;
            }

            Ok(bar)
        })
        .await?;

    Ok(Json(BarEnvelope {
        bar: BarOut::from(&bar),
        message: Some("Bar updated successfully.".to_string()),
    }))
}

#[put("/bars/<bid>", data = "<payload>")]
pub(crate) async fn put_bar(
    bid: i32,
    payload: Json<BarPayload>,
    _user: UserLoggedIn,
    conn: DbConn,
) -> Result<Json<BarEnvelope>, ErrorResponse> {
    update_bar(bid, payload.into_inner(), conn).await
}

#[patch("/bars/<bid>", data = "<payload>")]
pub(crate) async fn patch_bar(
    bid: i32,
    payload: Json<BarPayload>,
    _user: UserLoggedIn,
    conn: DbConn,
) -> Result<Json<BarEnvelope>, ErrorResponse> {
    update_bar(bid, payload.into_inner(), conn).await
}
