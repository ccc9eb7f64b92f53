use chrono::Utc;
use diesel::prelude::*;
use log::info;
use rocket::serde::json::Json;

use super::get_event::find_event;
use crate::api::user_management::models::{User, UserLoggedIn, UserOut};
use crate::api::MessageOut;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::{event_attendances, users};

#[derive(Insertable)]
#[diesel(table_name = event_attendances)]
struct NewAttendance {
    event_id: i32,
    user_id: i32,
    checked_in_at: chrono::NaiveDateTime,
}

/// Users checked in to the event, in check-in order.
#[get("/events/<eid>/attendees")]
pub(crate) async fn get_attendees(
    eid: i32,
    conn: DbConn,
) -> Result<Json<Vec<UserOut>>, ErrorResponse> {
    let attendees = conn
        .run(move |c| {
            let event = find_event(c, eid)?;

            Ok(event_attendances::table
                .inner_join(users::table)
                .filter(event_attendances::event_id.eq(event.id))
                .order((event_attendances::checked_in_at.asc(), event_attendances::id.asc()))
                .select(users::all_columns)
                .load::<User>(c)?)
        })
        .await?;

    Ok(Json(attendees.iter().map(UserOut::from).collect()))
}

/// Checking in twice keeps the first check-in.
#[post("/events/<eid>/checkin")]
pub(crate) async fn checkin(
    eid: i32,
    user: UserLoggedIn,
    conn: DbConn,
) -> Result<Json<MessageOut>, ErrorResponse> {
    let uid = user.0.id;

    conn.run(move |c| {
        let event = find_event(c, eid)?;

        diesel::insert_or_ignore_into(event_attendances::table)
            .values(&NewAttendance {
                event_id: event.id,
                user_id: uid,
                checked_in_at: Utc::now().naive_utc(),
            })
            .execute(c)?;

        Ok(())
    })
    .await?;

    info!("User {} checked in to event {}", uid, eid);

    Ok(Json(MessageOut::new("Checked in successfully.")))
}
