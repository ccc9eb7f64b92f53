use diesel::prelude::*;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

use super::models::{Brand, Brewery, BreweryOut};
use crate::api::user_management::models::UserLoggedIn;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{brands, breweries};
use crate::validation::Validator;

#[derive(Deserialize, Debug, Default)]
pub struct NameParams {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct BreweryPayload {
    pub brewery: NameParams,
}

#[derive(Deserialize, Debug)]
pub struct BrandPayload {
    pub brand: NameParams,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BrandSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BreweryWithBrands {
    pub id: i32,
    pub name: String,
    pub brands: Vec<BrandSummary>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BreweryList {
    pub breweries: Vec<BreweryWithBrands>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BreweryEnvelope {
    pub brewery: BreweryOut,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BrandEnvelope {
    pub brand: BrandSummary,
    pub message: String,
}

fn required_name(params: NameParams) -> Result<String, ErrorResponse> {
    let mut validator = Validator::new();
    validator.require("name", params.name.as_deref());
    validator.finish()?;
    Ok(params.name.unwrap_or_default().trim().to_string())
}

#[get("/breweries")]
pub(crate) async fn get_breweries(conn: DbConn) -> Result<Json<BreweryList>, ErrorResponse> {
    let (brewery_rows, brand_rows) = conn
        .run(|c| {
            let brewery_rows = breweries::table
                .order(breweries::name.asc())
                .load::<Brewery>(c)?;
            let brand_rows = brands::table.order(brands::name.asc()).load::<Brand>(c)?;
            Ok((brewery_rows, brand_rows))
        })
        .await?;

    let list = brewery_rows
        .iter()
        .map(|brewery| BreweryWithBrands {
            id: brewery.id,
            name: brewery.name.clone(),
            brands: brand_rows
                .iter()
                .filter(|brand| brand.brewery_id == brewery.id)
                .map(|brand| BrandSummary {
                    id: brand.id,
                    name: brand.name.clone(),
                })
                .collect(),
        })
        .collect();

    Ok(Json(BreweryList { breweries: list }))
}

#[post("/breweries", data = "<payload>")]
pub(crate) async fn create_brewery(
    payload: Json<BreweryPayload>,
    user: UserLoggedIn,
    conn: DbConn,
) -> Result<(Status, Json<BreweryEnvelope>), ErrorResponse> {
    let name = required_name(payload.into_inner().brewery)?;

    let brewery = conn
        .run(move |c| {
            Ok(diesel::insert_into(breweries::table)
                .values(breweries::name.eq(name))
                .get_result::<Brewery>(c)?)
        })
        .await?;

    info!("User {} created brewery {}", user.0.id, brewery.id);

    Ok((
        Status::Created,
        Json(BreweryEnvelope {
            brewery: BreweryOut::from(&brewery),
            message: "Brewery created successfully.".to_string(),
        }),
    ))
}

#[post("/breweries/<bid>/brands", data = "<payload>")]
pub(crate) async fn create_brand(
    bid: i32,
    payload: Json<BrandPayload>,
    user: UserLoggedIn,
    conn: DbConn,
) -> Result<(Status, Json<BrandEnvelope>), ErrorResponse> {
    let name = required_name(payload.into_inner().brand)?;

    let brand = conn
        .run(move |c| {
            let brewery = breweries::table
                .find(bid)
                .first::<Brewery>(c)
                .optional()?
                .ok_or_else(|| ErrorResponse::not_found("Brewery not found"))?;

            Ok(diesel::insert_into(brands::table)
                .values((brands::name.eq(name), brands::brewery_id.eq(brewery.id)))
                .get_result::<Brand>(c)?)
        })
        .await?;

    info!("User {} created brand {} for brewery {}", user.0.id, brand.id, bid);

    Ok((
        Status::Created,
        Json(BrandEnvelope {
            brand: BrandSummary {
                id: brand.id,
                name: brand.name,
            },
            message: "Brand created successfully.".to_string(),
        }),
    ))
}
