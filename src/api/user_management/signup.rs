use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::{info, warn};
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;

use super::login::SessionOut;
use super::models::{User, UserOut};
use super::password::hash_password;
use crate::db::DbConn;
use crate::error::ErrorResponse;
use crate::schema::users;
use crate::validation::{is_valid_email, Validator, MIN_PASSWORD_LENGTH};

#[derive(FromForm, Debug, Default)]
pub struct SignupFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub handle: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
}

#[derive(FromForm, Debug)]
pub struct SignupForm {
    pub user: SignupFields,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
struct NewUser {
    first_name: String,
    last_name: String,
    handle: String,
    email: String,
    password_hash: String,
}

fn validate(fields: &SignupFields) -> Validator {
    let mut validator = Validator::new();
    validator.require("first_name", fields.first_name.as_deref());
    validator.require("last_name", fields.last_name.as_deref());
    let handle = fields.handle.as_deref().map(normalize_handle);
    validator.require("handle", handle.as_deref());
    validator.require("email", fields.email.as_deref());
    validator.require("password", fields.password.as_deref());
    validator.require(
        "password_confirmation",
        fields.password_confirmation.as_deref(),
    );

    if let Some(email) = fields.email.as_deref().filter(|e| !e.trim().is_empty()) {
        if !is_valid_email(email) {
            validator.add("email", "is invalid");
        }
    }
    if let Some(password) = fields.password.as_deref().filter(|p| !p.is_empty()) {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            validator.add("password", "is too short (minimum is 6 characters)");
        }
        if fields.password_confirmation.as_deref() != Some(password) {
            validator.add("password_confirmation", "doesn't match Password");
        }
    }

    validator
}

/// A unique-index hit from a concurrent signup becomes the same 422 the pre-check gives.
fn signup_conflict(err: DieselError) -> ErrorResponse {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            warn!("Signup lost a uniqueness race: {}", info.message());
            let field = if info.message().contains("handle") {
                "handle"
            } else {
                "email"
            };
            let mut validator = Validator::new();
            validator.add(field, "has already been taken");
            ErrorResponse::unprocessable(validator.errors().clone())
        }
        err => ErrorResponse::from(err),
    }
}

/// Handles are stored without a leading `@`.
pub(crate) fn normalize_handle(handle: &str) -> String {
    handle.trim().trim_start_matches('@').to_string()
}

#[post("/signup", data = "<form>")]
pub(crate) async fn signup(
    form: Form<SignupForm>,
    conn: DbConn,
) -> Result<(Status, Json<SessionOut>), ErrorResponse> {
    let fields = form.into_inner().user;
    validate(&fields).finish()?;

    let password = fields.password.unwrap_or_default();
    let password_hash = hash_password(&password)
        .map_err(|err| ErrorResponse::internal(format!("Couldn't hash password: {}", err)))?;

    let new_user = NewUser {
        first_name: fields.first_name.unwrap_or_default().trim().to_string(),
        last_name: fields.last_name.unwrap_or_default().trim().to_string(),
        handle: normalize_handle(&fields.handle.unwrap_or_default()),
        email: fields.email.unwrap_or_default().trim().to_lowercase(),
        password_hash,
    };

    let user = conn
        .run(move |c| {
            c.transaction::<_, ErrorResponse, _>(|c| {
                let mut validator = Validator::new();

                let email_taken = users::table
                    .filter(users::email.eq(&new_user.email))
                    .count()
                    .get_result::<i64>(c)?
                    > 0;
                if email_taken {
                    validator.add("email", "has already been taken");
                }

                let handle_taken = users::table
                    .filter(users::handle.eq(&new_user.handle))
                    .count()
                    .get_result::<i64>(c)?
                    > 0;
                if handle_taken {
                    validator.add("handle", "has already been taken");
                }

                validator.finish()?;

                diesel::insert_into(users::table)
                    .values(&new_user)
                    .get_result::<User>(c)
                    .map_err(signup_conflict)
            })
        })
        .await?;

    info!("User {} signed up as @{}", user.id, user.handle);

    Ok((
        Status::Created,
        Json(SessionOut {
            user: UserOut::from(&user),
            message: "Signed up successfully.".to_string(),
        }),
    ))
}
