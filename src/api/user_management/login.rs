use diesel::prelude::*;
use log::info;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use super::models::{User, UserOut};
use super::password::verify_password;
use super::token::issue_token;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema;
use crate::settings::Settings;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub user: Credentials,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct SessionOut {
    pub user: UserOut,
    pub message: String,
}

#[derive(Responder)]
pub(crate) struct LoginResponse {
    inner: Json<SessionOut>,
    authorization: Header<'static>,
}

#[post("/login", data = "<params>")]
pub(crate) async fn login(
    params: Json<LoginParams>,
    conn: DbConn,
    settings: &State<Settings>,
) -> Result<LoginResponse, ErrorResponse> {
    let Credentials { email, password } = params.into_inner().user;
    let email = email.trim().to_lowercase();

    let user = conn
        .run(move |c| {
            use schema::users::dsl;

            let user = dsl::users
                .filter(dsl::email.eq(&email))
                .first::<User>(c)
                .optional()?;

            Ok(user.filter(|user| verify_password(&password, &user.password_hash)))
        })
        .await?
        .ok_or_else(|| ErrorResponse::new(Status::Unauthorized, "Invalid email or password."))?;

    let token = issue_token(&user, settings).map_err(|err| {
        ErrorResponse::internal(format!("Couldn't create token: {}", err))
    })?;

    info!("User {} logged in", user.id);

    Ok(LoginResponse {
        inner: Json(SessionOut {
            user: UserOut::from(&user),
            message: "Logged in successfully.".to_string(),
        }),
        authorization: Header::new("Authorization", format!("Bearer {}", token)),
    })
}
