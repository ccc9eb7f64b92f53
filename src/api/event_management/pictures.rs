use diesel::prelude::*;
use log::info;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use super::get_event::find_event;
use super::models::{EventPicture, PictureOut};
use crate::api::user_management::models::UserLoggedIn;
use crate::attachment::{self, discard_on_error, prepare_image};
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::event_pictures;
use crate::settings::Settings;
use crate::validation::{non_blank, Validator};

#[derive(Deserialize, Debug)]
pub struct PictureParams {
    pub description: Option<String>,
    pub image_base64: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct PicturePayload {
    pub event_picture: PictureParams,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PictureEnvelope {
    pub event_picture: PictureOut,
    pub message: String,
}

#[derive(Insertable)]
#[diesel(table_name = event_pictures)]
struct NewPicture {
    event_id: i32,
    user_id: i32,
    description: Option<String>,
    image_id: i32,
}

#[get("/events/<eid>/pictures")]
pub(crate) async fn get_pictures(
    eid: i32,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<Json<Vec<PictureOut>>, ErrorResponse> {
    let (pictures, images) = conn
        .run(move |c| {
            let event = find_event(c, eid)?;

            let pictures = event_pictures::table
                .filter(event_pictures::event_id.eq(event.id))
                .order(event_pictures::id.asc())
                .load::<EventPicture>(c)?;
            let images =
                attachment::load_by_ids(c, pictures.iter().map(|p| p.image_id).collect())?;

            Ok((pictures, images))
        })
        .await?;

    Ok(Json(
        pictures
            .iter()
            .map(|picture| PictureOut::new(picture, images.get(&picture.image_id), settings))
            .collect(),
    ))
}

#[post("/events/<eid>/pictures", data = "<payload>")]
pub(crate) async fn post_picture(
    eid: i32,
    payload: Json<PicturePayload>,
    user: UserLoggedIn,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<(Status, Json<PictureEnvelope>), ErrorResponse> {
    conn.run(move |c| find_event(c, eid).map(|_| ())).await?;

    let params = payload.into_inner().event_picture;
    let mut validator = Validator::new();
    validator.require("image", params.image_base64.as_deref());
    validator.finish()?;

    let image = prepare_image(settings, "image", "image", params.image_base64.as_deref()).await?;
    let pending = image.clone();
    let uid = user.0.id;
    let description = non_blank(params.description);

    let result = conn
        .run(move |c| {
            c.transaction::<_, ErrorResponse, _>(|c| {
                let stored = match pending.as_ref() {
                    Some(image) => image.insert(c)?,
                    None => return Err(ErrorResponse::internal("Picture image missing")),
                };

                let picture = diesel::insert_into(event_pictures::table)
                    .values(&NewPicture {
                        event_id: eid,
                        user_id: uid,
                        description,
                        image_id: stored.id,
                    })
                    .get_result::<EventPicture>(c)?;

                Ok((picture, stored))
            })
        })
        .await;
    let (picture, stored) = discard_on_error(result, image).await?;

    info!("User {} added picture {} to event {}", uid, picture.id, eid);

    Ok((
        Status::Created,
        Json(PictureEnvelope {
            event_picture: PictureOut::new(&picture, Some(&stored), settings),
            message: "Picture uploaded successfully.".to_string(),
        }),
    ))
}
