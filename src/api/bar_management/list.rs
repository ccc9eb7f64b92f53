use diesel::prelude::*;
use rocket::serde::json::Json;

use super::models::{Bar, BarList, BarOut};
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;

#[get("/bars")]
pub(crate) async fn get_bars(conn: DbConn) -> Result<Json<BarList>, ErrorResponse> {
    let bar_list = conn
        .run(|c| {
            use schema::bars::dsl::*;

            Ok(bars.order(name.asc()).load::<Bar>(c)?)
        })
        .await?;

    Ok(Json(BarList {
        bars: bar_list.iter().map(BarOut::from).collect(),
    }))
}
