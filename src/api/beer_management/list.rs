use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;

use super::models::{average_by_beer, Beer, BeerList, BeerSummary};
use crate::attachment;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{beers, brands, breweries, reviews};
use crate::settings::Settings;

#[get("/beers")]
pub(crate) async fn get_beers(
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<BeerList>, ErrorResponse> {
    let (rows, ratings, images) = conn
        .run(|c| {
            let rows = beers::table
                .inner_join(brands::table.inner_join(breweries::table))
                .order(beers::name.asc())
                .select((beers::all_columns, breweries::name))
                .load::<(Beer, String)>(c)?;

            let ratings = reviews::table
                .select((reviews::beer_id, reviews::rating))
                .load::<(i32, i32)>(c)?;

            let image_ids = rows.iter().filter_map(|(beer, _)| beer.image_id).collect();
            let images = attachment::load_by_ids(c, image_ids)?;

            Ok((rows, ratings, images))
        })
        .await?;

    let averages = average_by_beer(&ratings);

    Ok(Json(BeerList {
        beers: rows
            .into_iter()
            .map(|(beer, brewery)| BeerSummary {
                id: beer.id,
                avg_rating: averages.get(&beer.id).copied(),
                image_url: beer
                    .image_id
                    .and_then(|id| images.get(&id))
                    .map(|image| image.url(settings)),
                name: beer.name,
                style: beer.style,
                alcohol: beer.alcohol,
                ibu: beer.ibu,
                brewery,
            })
            .collect(),
    }))
}
