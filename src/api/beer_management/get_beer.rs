use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;

use super::models::{Beer, BeerDetail, Brand, BrandOut, Brewery, Review, ReviewOut};
use crate::api::bar_management::models::{Bar, BarOut};
use crate::api::user_management::models::{User, UserOut};
use crate::attachment::Attachment;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{attachments, bars, bars_beers, beers, brands, breweries, reviews, users};
use crate::settings::Settings;

pub(crate) fn find_beer(c: &mut SqliteConnection, bid: i32) -> Result<Beer, ErrorResponse> {
    beers::table
        .find(bid)
        .first::<Beer>(c)
        .optional()?
        .ok_or_else(|| ErrorResponse::not_found("Beer not found"))
}

/// Reviews of a beer with their authors, newest first.
pub(crate) fn load_reviews(
    c: &mut SqliteConnection,
    beer_id: i32,
) -> Result<Vec<ReviewOut>, ErrorResponse> {
    let rows = reviews::table
        .inner_join(users::table)
        .filter(reviews::beer_id.eq(beer_id))
        .order((reviews::created_at.desc(), reviews::id.desc()))
        .select((reviews::all_columns, users::all_columns))
        .load::<(Review, User)>(c)?;

    Ok(rows
        .iter()
        .map(|(review, user)| ReviewOut::new(review, Some(UserOut::from(user))))
        .collect())
}

pub(crate) struct BeerRecord {
    beer: Beer,
    brand: BrandOut,
    image: Option<Attachment>,
    bars: Vec<BarOut>,
    reviews: Vec<ReviewOut>,
}

impl BeerRecord {
    pub(crate) fn render(self, settings: &Settings) -> BeerDetail {
        BeerDetail::new(
            &self.beer,
            self.brand,
            self.image.as_ref(),
            self.bars,
            self.reviews,
            settings,
        )
    }
}

pub(crate) fn load_beer(c: &mut SqliteConnection, bid: i32) -> Result<BeerRecord, ErrorResponse> {
    let beer = find_beer(c, bid)?;

    let (brand, brewery) = brands::table
        .inner_join(breweries::table)
        .filter(brands::id.eq(beer.brand_id))
        .first::<(Brand, Brewery)>(c)?;

    let image = match beer.image_id {
        Some(image_id) => attachments::table
            .find(image_id)
            .first::<Attachment>(c)
            .optional()?,
        None => None,
    };

    let served_at = bars_beers::table
        .inner_join(bars::table)
        .filter(bars_beers::beer_id.eq(beer.id))
        .order(bars::name.asc())
        .select(bars::all_columns)
        .load::<Bar>(c)?;

    let reviews = load_reviews(c, beer.id)?;

    Ok(BeerRecord {
        brand: BrandOut::new(&brand, &brewery),
        beer,
        image,
        bars: served_at.iter().map(BarOut::from).collect(),
        reviews,
    })
}

#[get("/beers/<bid>")]
pub(crate) async fn get_beer(
    bid: i32,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<BeerDetail>, ErrorResponse> {
    let record = conn.run(move |c| load_beer(c, bid)).await?;

    Ok(Json(record.render(settings)))
}
