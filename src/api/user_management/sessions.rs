use diesel::prelude::*;
use log::{info, warn};
use rocket::http::Status;
use rocket::outcome::try_outcome;
use rocket::request::{self, FromRequest, Outcome};
use rocket::Request;

use super::models::{User, UserLoggedIn, UserOut};
use super::token::{bearer_token, verify_token};
use crate::db::DbConn;
use crate::error::ApiError;
use crate::schema;
use crate::settings::Settings;

fn unauthorized(reason: &str) -> request::Outcome<UserLoggedIn, ApiError> {
    Outcome::Error((Status::Unauthorized, ApiError::new(reason)))
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserLoggedIn {
    type Error = ApiError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let header = match req.headers().get_one("Authorization") {
            Some(header) => header,
            None => return unauthorized("Missing bearer token"),
        };

        let token = match bearer_token(header) {
            Some(token) => token,
            None => return unauthorized("Malformed Authorization header"),
        };

        let settings = match req.rocket().state::<Settings>() {
            Some(settings) => settings,
            None => {
                return Outcome::Error((
                    Status::InternalServerError,
                    ApiError::new("Couldn't get settings"),
                ))
            }
        };

        let claims = match verify_token(token, settings) {
            Ok(claims) => claims,
            Err(err) => {
                info!("Rejected bearer token: {}", err);
                return unauthorized("Invalid or expired token");
            }
        };

        let uid = match claims.user_id() {
            Some(uid) => uid,
            None => return unauthorized("Invalid token subject"),
        };

        let conn = try_outcome!(req.guard::<DbConn>().await);

        let user = conn
            .run(move |c| {
                use schema::users::dsl::*;

                Ok(users.find(uid).first::<User>(c).optional()?)
            })
            .await;

        match user {
            Ok(Some(user)) => Outcome::Success(UserLoggedIn(UserOut::from(&user))),
            Ok(None) => {
                warn!("Token for missing user {}", uid);
                unauthorized("User no longer exists")
            }
            Err(_) => Outcome::Error((
                Status::InternalServerError,
                ApiError::new("Couldn't load user from database"),
            )),
        }
    }
}
