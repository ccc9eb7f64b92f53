use diesel::prelude::*;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;

use super::get_beer::{find_beer, load_reviews};
use super::models::{Review, ReviewEnvelope, ReviewList, ReviewOut, ReviewPayload};
use crate::api::user_management::models::UserLoggedIn;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::reviews;

#[derive(Insertable)]
#[diesel(table_name = reviews)]
struct NewReview {
    beer_id: i32,
    user_id: i32,
    text: String,
    rating: i32,
}

#[get("/beers/<bid>/reviews")]
pub(crate) async fn get_reviews(bid: i32, conn: DbConn) -> Result<Json<ReviewList>, ErrorResponse> {
    let reviews = conn
        .run(move |c| {
            let beer = find_beer(c, bid)?;
            load_reviews(c, beer.id)
        })
        .await?;

    Ok(Json(ReviewList { reviews }))
}

/// Reviews need at least 15 words and a rating from 1 to 5.
#[post("/beers/<bid>/reviews", data = "<payload>")]
pub(crate) async fn create_review(
    bid: i32,
    payload: Json<ReviewPayload>,
    user: UserLoggedIn,
    conn: DbConn,
) -> Result<(Status, Json<ReviewEnvelope>), ErrorResponse> {
    let params = payload.into_inner().review;
    let author = user.0;

    let new_review = NewReview {
        beer_id: bid,
        user_id: author.id,
        text: params.text.clone().unwrap_or_default().trim().to_string(),
        rating: params.rating.unwrap_or_default(),
    };

    let review = conn
        .run(move |c| {
            find_beer(c, bid)?;
            params.validate().finish()?;

            Ok(diesel::insert_into(reviews::table)
                .values(&new_review)
                .get_result::<Review>(c)?)
        })
        .await?;

    info!("User {} reviewed beer {} with {}", author.id, bid, review.rating);

    Ok((
        Status::Created,
        Json(ReviewEnvelope {
            review: ReviewOut::new(&review, Some(author)),
            message: "Review created successfully.".to_string(),
        }),
    ))
}
