use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ErrorResponse, FieldErrors};

pub const MIN_REVIEW_WORDS: usize = 15;
pub const RATING_RANGE: RangeInclusive<i32> = 1..=5;
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const REVIEW_TOO_SHORT: &str = "The review must have at least 15 words.";
pub const RATING_OUT_OF_RANGE: &str = "Rating must be between 1 and 5.";

lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

/// Collects per-field messages and turns them into a 422 response when non-empty.
#[derive(Debug, Default)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn require(&mut self, field: &str, value: Option<&str>) {
        if value.map_or(true, |v| v.trim().is_empty()) {
            self.add(field, "can't be blank");
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn finish(self) -> Result<(), ErrorResponse> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ErrorResponse::unprocessable(self.errors))
        }
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn is_long_enough_review(text: &str) -> bool {
    word_count(text) >= MIN_REVIEW_WORDS
}

pub fn is_valid_rating(rating: i32) -> bool {
    RATING_RANGE.contains(&rating)
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email.trim())
}

/// Text fields arrive as optional strings; blank ones are stored as NULL.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
