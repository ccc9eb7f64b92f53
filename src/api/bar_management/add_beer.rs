use diesel::prelude::*;
use rocket::serde::json::Json;

use super::get_bar::find_bar;
use crate::api::beer_management::get_beer::find_beer;
use crate::api::user_management::models::UserLoggedIn;
use crate::api::MessageOut;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::bars_beers;

#[derive(Insertable)]
#[diesel(table_name = bars_beers)]
struct NewBarBeer {
    bar_id: i32,
    beer_id: i32,
}

/// Marks a beer as served at a bar. Linking twice is a no-op.
#[put("/bars/<bid>/beers/<beer>")]
pub(crate) async fn add_beer(
    bid: i32,
    beer: i32,
    _user: UserLoggedIn,
    conn: DbConn,
) -> Result<Json<MessageOut>, ErrorResponse> {
    conn.run(move |c| {
        let bar = find_bar(c, bid)?;
        let beer = find_beer(c, beer)?;

        diesel::insert_or_ignore_into(bars_beers::table)
            .values(&NewBarBeer {
                bar_id: bar.id,
                beer_id: beer.id,
            })
            .execute(c)?;

        Ok(())
    })
    .await?;

    Ok(Json(MessageOut::new("Beer added to bar.")))
}
