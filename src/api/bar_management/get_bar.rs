use diesel::prelude::*;
use rocket::serde::json::Json;

use super::models::{Bar, BarEnvelope, BarOut};
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;

pub(crate) fn find_bar(c: &mut SqliteConnection, bid: i32) -> Result<Bar, ErrorResponse> {
    use schema::bars::dsl::*;

    bars.find(bid)
        .first::<Bar>(c)
        .optional()?
        .ok_or_else(|| ErrorResponse::not_found("Bar not found"))
}

#[get("/bars/<bid>")]
pub(crate) async fn get_bar(bid: i32, conn: DbConn) -> Result<Json<BarEnvelope>, ErrorResponse> {
    let bar = conn.run(move |c| find_bar(c, bid)).await?;

    Ok(Json(BarEnvelope {
        bar: BarOut::from(&bar),
        message: None,
    }))
}
