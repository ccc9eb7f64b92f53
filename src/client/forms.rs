use thiserror::Error;

use super::{AuthApi, ClientError, Registration, ReviewApi, ReviewDraft, Session};
use crate::api::beer_management::models::ReviewOut;
use crate::api::user_management::models::UserOut;
use crate::error::FieldErrors;
use crate::validation::{
    is_long_enough_review, is_valid_email, is_valid_rating, Validator, MIN_PASSWORD_LENGTH,
    RATING_OUT_OF_RANGE, RATING_RANGE, REVIEW_TOO_SHORT,
};

#[derive(Error, Debug)]
pub enum FormError {
    /// Rejected locally, no request was sent.
    #[error("form is invalid")]
    Invalid(FieldErrors),
    #[error(transparent)]
    Api(#[from] ClientError),
}

fn checked(validator: Validator) -> Result<(), FormError> {
    if validator.is_valid() {
        Ok(())
    } else {
        Err(FormError::Invalid(validator.errors().clone()))
    }
}

fn check_password(validator: &mut Validator, password: &str) {
    if password.is_empty() {
        validator.add("password", "can't be blank");
    } else if password.chars().count() < MIN_PASSWORD_LENGTH {
        validator.add("password", "is too short (minimum is 6 characters)");
    }
}

fn check_email(validator: &mut Validator, email: &str) {
    if email.trim().is_empty() {
        validator.add("email", "can't be blank");
    } else if !is_valid_email(email) {
        validator.add("email", "is invalid");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewForm {
    pub text: String,
    rating: i32,
}

impl Default for ReviewForm {
    fn default() -> Self {
        ReviewForm {
            text: String::new(),
            rating: *RATING_RANGE.start(),
        }
    }
}

impl ReviewForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rating(&self) -> i32 {
        self.rating
    }

    /// Sets the rating as typed; out-of-range values are caught on submit.
    pub fn set_rating(&mut self, rating: i32) {
        self.rating = rating;
    }

    pub fn increase(&mut self) {
        self.rating = self
            .rating
            .saturating_add(1)
            .clamp(*RATING_RANGE.start(), *RATING_RANGE.end());
    }

    pub fn decrease(&mut self) {
        self.rating = self
            .rating
            .saturating_sub(1)
            .clamp(*RATING_RANGE.start(), *RATING_RANGE.end());
    }

    pub fn validate(&self) -> Validator {
        let mut validator = Validator::new();
        if !is_long_enough_review(&self.text) {
            validator.add("text", REVIEW_TOO_SHORT);
        }
        if !is_valid_rating(self.rating) {
            validator.add("rating", RATING_OUT_OF_RANGE);
        }
        validator
    }

    /// Validates locally first; an invalid form never reaches `api`.
    pub async fn submit<A: ReviewApi + Sync>(
        &self,
        api: &A,
        beer_id: i32,
    ) -> Result<ReviewOut, FormError> {
        checked(self.validate())?;

        let draft = ReviewDraft {
            text: self.text.trim().to_string(),
            rating: self.rating,
        };
        Ok(api.create_review(beer_id, &draft).await?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Validator {
        let mut validator = Validator::new();
        check_email(&mut validator, &self.email);
        check_password(&mut validator, &self.password);
        validator
    }

    pub async fn submit<A: AuthApi + Sync>(&self, api: &A) -> Result<Session, FormError> {
        checked(self.validate())?;
        Ok(api.login(self.email.trim(), &self.password).await?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignupForm {
    pub fields: Registration,
}

impl SignupForm {
    pub fn validate(&self) -> Validator {
        let fields = &self.fields;
        let mut validator = Validator::new();
        validator.require("first_name", Some(fields.first_name.as_str()));
        validator.require("last_name", Some(fields.last_name.as_str()));
        validator.require("handle", Some(fields.handle.as_str()));
        check_email(&mut validator, &fields.email);
        check_password(&mut validator, &fields.password);
        if fields.password_confirmation != fields.password {
            validator.add("password_confirmation", "doesn't match Password");
        }
        validator
    }

    pub async fn submit<A: AuthApi + Sync>(&self, api: &A) -> Result<UserOut, FormError> {
        checked(self.validate())?;
        Ok(api.signup(&self.fields).await?)
    }
}
