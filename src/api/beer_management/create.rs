use diesel::prelude::*;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use super::get_beer::load_beer;
use super::models::{BeerEnvelope, BeerPayload};
use crate::api::user_management::models::UserLoggedIn;
use crate::attachment::{discard_on_error, prepare_image};
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{beers, brands};
use crate::settings::Settings;
use crate::validation::{non_blank, Validator};

#[derive(Insertable)]
#[diesel(table_name = beers)]
struct NewBeer {
    name: String,
    brand_id: i32,
    style: Option<String>,
    hop: Option<String>,
    yeast: Option<String>,
    malts: Option<String>,
    ibu: Option<i32>,
    alcohol: Option<f64>,
    blg: Option<f64>,
    image_id: Option<i32>,
}

#[post("/beers", data = "<payload>")]
pub(crate) async fn create_beer(
    payload: Json<BeerPayload>,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<(Status, Json<BeerEnvelope>), ErrorResponse> {
    let params = payload.into_inner().beer;
    params.validate().finish()?;

    let image = prepare_image(settings, "image", "image", params.image_base64.as_deref()).await?;
    let pending = image.clone();

    let mut new_beer = NewBeer {
        name: params.name.unwrap_or_default().trim().to_string(),
        brand_id: params.brand_id.unwrap_or_default(),
        style: non_blank(params.style),
        hop: non_blank(params.hop),
        yeast: non_blank(params.yeast),
        malts: non_blank(params.malts),
        ibu: params.ibu,
        alcohol: params.alcohol,
        blg: params.blg,
        image_id: None,
    };

    let result = conn
        .run(move |c| {
            c.transaction::<_, ErrorResponse, _>(|c| {
                let brand_exists = brands::table
                    .find(new_beer.brand_id)
                    .count()
                    .get_result::<i64>(c)?
                    > 0;
                if !brand_exists {
                    let mut validator = Validator::new();
                    validator.add("brand", "must exist");
                    validator.finish()?;
                }

                if let Some(stored) = pending.as_ref().map(|image| image.insert(c)).transpose()? {
                    new_beer.image_id = Some(stored.id);
                }

                let beer_id = diesel::insert_into(beers::table)
                    .values(&new_beer)
                    .returning(beers::id)
                    .get_result::<i32>(c)?;

                load_beer(c, beer_id)
            })
        })
        .await;
    let record = discard_on_error(result, image).await?;
    let beer = record.render(settings);

    info!("User {} created beer {}", user.0.id, beer.id);

    Ok((
        Status::Created,
        Json(BeerEnvelope {
            beer,
            message: "Beer created successfully.".to_string(),
        }),
    ))
}
