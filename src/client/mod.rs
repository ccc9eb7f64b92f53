//! Typed HTTP client for the `/api/v1` endpoints, plus the form and view state the
//! web and mobile front-ends build on.

pub mod forms;
pub mod views;

use config::{Config, ConfigError, Environment};
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::beer_management::models::{
    BeerDetail, BeerList, BeerSummary, ReviewEnvelope, ReviewOut,
};
use crate::api::event_management::models::{EventEnvelope, EventList, EventOut, PictureOut};
use crate::api::user_management::get_user::UserEnvelope;
use crate::api::user_management::login::SessionOut;
use crate::api::user_management::models::UserOut;
use crate::api::user_management::token::bearer_token;
use crate::api::MessageOut;
use crate::error::{ApiError, FieldErrors};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("login response carried no bearer token")]
    MissingToken,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub api_url: String,
}

impl ClientConfig {
    /// Reads `BREWHUB_API_URL`, falling back to a local server.
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("api_url", DEFAULT_API_URL)?
            .add_source(Environment::with_prefix("BREWHUB"))
            .build()?
            .try_deserialize()
    }
}

/// Review fields as submitted by the review form.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub text: String,
    pub rating: i32,
}

/// Registration fields, sent form-encoded as `user[...]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub handle: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserOut,
    pub token: String,
}

#[rocket::async_trait]
pub trait ReviewApi {
    async fn create_review(&self, beer_id: i32, review: &ReviewDraft)
        -> Result<ReviewOut, ClientError>;
}

#[rocket::async_trait]
pub trait AuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError>;
    async fn signup(&self, registration: &Registration) -> Result<UserOut, ClientError>;
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        ApiClient {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.api_url.as_str())
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!("GET {}", url);
        let response = self.authorized(self.http.get(url)).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self.authorized(self.http.post(url)).json(body).send().await?;
        decode(response).await
    }

    pub async fn events(&self) -> Result<Vec<EventOut>, ClientError> {
        Ok(self.get::<EventList>("events").await?.events)
    }

    pub async fn event(&self, id: i32) -> Result<EventOut, ClientError> {
        Ok(self.get::<EventEnvelope>(&format!("events/{}", id)).await?.event)
    }

    pub async fn attendees(&self, event_id: i32) -> Result<Vec<UserOut>, ClientError> {
        self.get(&format!("events/{}/attendees", event_id)).await
    }

    pub async fn pictures(&self, event_id: i32) -> Result<Vec<PictureOut>, ClientError> {
        self.get(&format!("events/{}/pictures", event_id)).await
    }

    pub async fn checkin(&self, event_id: i32) -> Result<String, ClientError> {
        let out: MessageOut = self
            .post(&format!("events/{}/checkin", event_id), &serde_json::json!({}))
            .await?;
        Ok(out.message)
    }

    pub async fn beers(&self) -> Result<Vec<BeerSummary>, ClientError> {
        Ok(self.get::<BeerList>("beers").await?.beers)
    }

    pub async fn beer(&self, id: i32) -> Result<BeerDetail, ClientError> {
        self.get(&format!("beers/{}", id)).await
    }

    pub async fn current_user(&self) -> Result<UserOut, ClientError> {
        Ok(self.get::<UserEnvelope>("users/current").await?.user)
    }
}

#[rocket::async_trait]
impl ReviewApi for ApiClient {
    async fn create_review(
        &self,
        beer_id: i32,
        review: &ReviewDraft,
    ) -> Result<ReviewOut, ClientError> {
        let body = serde_json::json!({ "review": review });
        let envelope: ReviewEnvelope = self
            .post(&format!("beers/{}/reviews", beer_id), &body)
            .await?;
        Ok(envelope.review)
    }
}

#[rocket::async_trait]
impl AuthApi for ApiClient {
    /// The token comes back in the `Authorization` response header, not the body.
    async fn login(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let body = serde_json::json!({ "user": { "email": email, "password": password } });
        let response = self.http.post(self.url("login")).json(&body).send().await?;

        let token = response
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);
        let session: SessionOut = decode(response).await?;

        Ok(Session {
            user: session.user,
            token: token.ok_or(ClientError::MissingToken)?,
        })
    }

    async fn signup(&self, registration: &Registration) -> Result<UserOut, ClientError> {
        let response = self
            .http
            .post(self.url("signup"))
            .form(&signup_fields(registration))
            .send()
            .await?;
        let session: SessionOut = decode(response).await?;
        Ok(session.user)
    }
}

fn signup_fields(registration: &Registration) -> Vec<(&'static str, &str)> {
    vec![
        ("user[first_name]", registration.first_name.as_str()),
        ("user[last_name]", registration.last_name.as_str()),
        ("user[handle]", registration.handle.as_str()),
        ("user[email]", registration.email.as_str()),
        ("user[password]", registration.password.as_str()),
        (
            "user[password_confirmation]",
            registration.password_confirmation.as_str(),
        ),
    ]
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let error = response.json::<ApiError>().await.ok();
    Err(match error {
        Some(ApiError::Fields { errors }) => ClientError::Validation(errors),
        Some(ApiError::Message { error }) => ClientError::Status {
            status: status.as_u16(),
            message: error,
        },
        None => ClientError::Status {
            status: status.as_u16(),
            message: status.to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_urls_under_api_prefix() {
        let client = ApiClient::new("http://bar.example:8000/");

        assert_eq!(client.url("events"), "http://bar.example:8000/api/v1/events");
        assert_eq!(client.url("/beers/3"), "http://bar.example:8000/api/v1/beers/3");
    }

    #[test]
    fn signup_uses_nested_form_keys() {
        let registration = Registration {
            email: "ana@example.com".to_string(),
            ..Registration::default()
        };
        let fields = signup_fields(&registration);

        assert_eq!(fields.len(), 6);
        assert!(fields.contains(&("user[email]", "ana@example.com")));
    }

    #[test]
    fn token_is_kept_on_client() {
        let client = ApiClient::new(DEFAULT_API_URL).with_token("abc");
        assert_eq!(client.token(), Some("abc"));
    }
}
