use std::collections::BTreeMap;

use log::error;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::Request;
use serde::{Deserialize, Serialize};

/// Field name to the list of problems found with it.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ApiError {
    Message { error: String },
    Fields { errors: FieldErrors },
}

impl ApiError {
    pub(crate) fn new(err: impl Into<String>) -> ApiError {
        ApiError::Message { error: err.into() }
    }
}

#[derive(Debug)]
pub struct ErrorResponse {
    json: Json<ApiError>,
    status: Status,
}

impl ErrorResponse {
    pub(crate) fn new(status: Status, err: impl Into<String>) -> ErrorResponse {
        ErrorResponse {
            json: Json(ApiError::new(err)),
            status,
        }
    }

    pub(crate) fn not_found(err: impl Into<String>) -> ErrorResponse {
        ErrorResponse::new(Status::NotFound, err)
    }

    pub(crate) fn internal(err: impl Into<String>) -> ErrorResponse {
        ErrorResponse::new(Status::InternalServerError, err)
    }

    pub(crate) fn unprocessable(errors: FieldErrors) -> ErrorResponse {
        ErrorResponse {
            json: Json(ApiError::Fields { errors }),
            status: Status::UnprocessableEntity,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn body(&self) -> &ApiError {
        &self.json
    }
}

impl From<diesel::result::Error> for ErrorResponse {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => ErrorResponse::not_found("Record not found"),
            err => {
                error!("Database error: {}", err);
                ErrorResponse::internal("Database error")
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        Response::build_from(self.json.respond_to(req)?)
            .status(self.status)
            .header(ContentType::JSON)
            .ok()
    }
}

#[catch(400)]
pub(crate) fn bad_request() -> Json<ApiError> {
    Json(ApiError::new("Bad request"))
}

#[catch(401)]
pub(crate) fn unauthorized() -> Json<ApiError> {
    Json(ApiError::new("Authentication required"))
}

#[catch(404)]
pub(crate) fn not_found() -> Json<ApiError> {
    Json(ApiError::new("Not found"))
}

#[catch(422)]
pub(crate) fn unprocessable_entity() -> Json<ApiError> {
    Json(ApiError::new("Request body could not be parsed"))
}

#[catch(500)]
pub(crate) fn internal_error() -> Json<ApiError> {
    Json(ApiError::new("Internal server error"))
}
