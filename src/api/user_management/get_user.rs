use diesel::prelude::*;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};

use super::models::{User, UserLoggedIn, UserOut};
use super::signup::normalize_handle;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;

#[derive(Serialize, Deserialize, Debug)]
pub struct UserEnvelope {
    pub user: UserOut,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct UserList {
    pub users: Vec<UserOut>,
}

#[get("/users/current")]
pub(crate) async fn current_user(user: UserLoggedIn) -> Json<UserEnvelope> {
    Json(UserEnvelope { user: user.0 })
}

/// Lists users, optionally narrowed to handles starting with `handle` (`@` optional).
#[get("/users?<handle>")]
pub(crate) async fn get_users(
    handle: Option<String>,
    conn: DbConn,
) -> Result<Json<UserList>, ErrorResponse> {
    let prefix = handle
        .map(|h| normalize_handle(&h))
        .filter(|h| !h.is_empty());

    let user_list = conn
        .run(move |c| {
            use schema::users::dsl;

            let mut query = dsl::users.order(dsl::handle.asc()).into_boxed();
            if let Some(prefix) = prefix {
                let escaped = prefix.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
                query = query.filter(dsl::handle.like(format!("{}%", escaped)).escape('\\'));
            }

            Ok(query.load::<User>(c)?)
        })
        .await?;

    Ok(Json(UserList {
        users: user_list.iter().map(UserOut::from).collect(),
    }))
}

#[get("/users/<uid>")]
pub(crate) async fn get_user(uid: i32, conn: DbConn) -> Result<Json<UserEnvelope>, ErrorResponse> {
    let user = conn
        .run(move |c| {
            use schema::users::dsl::*;

            users
                .find(uid)
                .first::<User>(c)
                .optional()?
                .ok_or_else(|| ErrorResponse::not_found("User not found"))
        })
        .await?;

    Ok(Json(UserEnvelope {
        user: UserOut::from(&user),
    }))
}
