use chrono::{DateTime, NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::bar_management::models::{Bar, BarOut};
use crate::attachment::Attachment;
use crate::schema::{event_pictures, events};
use crate::settings::Settings;
use crate::validation::Validator;

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = events)]
pub struct Event {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub bar_id: i32,
    pub flyer_image_id: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventOut {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub bar_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar: Option<BarOut>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flyer_image_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl EventOut {
    pub fn new(
        event: &Event,
        bar: Option<&Bar>,
        flyer: Option<&Attachment>,
        settings: &Settings,
    ) -> Self {
        EventOut {
            id: event.id,
            name: event.name.clone(),
            description: event.description.clone(),
            date: event.date,
            bar_id: event.bar_id,
            bar: bar.map(BarOut::from),
            flyer_image_url: flyer.map(|flyer| flyer.url(settings)),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EventEnvelope {
    pub event: EventOut,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct EventList {
    pub events: Vec<EventOut>,
}

/// Allow-listed event fields; anything else in the payload is ignored.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct EventParams {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
    pub bar_id: Option<i32>,
    pub flyer_image_base64: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct EventPayload {
    pub event: EventParams,
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
pub fn parse_event_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

impl EventParams {
    /// Checks presence and format. On create (`partial == false`) name and date are
    /// required, and `bar_id` unless the bar comes from the path.
    pub fn validate(&self, partial: bool, bar_in_path: bool) -> (Validator, Option<NaiveDate>) {
        let mut validator = Validator::new();

        if !partial || self.name.is_some() {
            validator.require("name", self.name.as_deref());
        }

        let mut date = None;
        match self.date.as_deref() {
            Some(value) if !value.trim().is_empty() => {
                date = parse_event_date(value);
                if date.is_none() {
                    validator.add("date", "is not a valid date");
                }
            }
            Some(_) => validator.add("date", "can't be blank"),
            None if !partial => validator.add("date", "can't be blank"),
            None => {}
        }

        if !partial && !bar_in_path && self.bar_id.is_none() {
            validator.add("bar", "must exist");
        }

        (validator, date)
    }
}

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = event_pictures)]
pub struct EventPicture {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub description: Option<String>,
    pub image_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PictureOut {
    pub id: i32,
    pub event_id: i32,
    pub user_id: i32,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl PictureOut {
    pub fn new(picture: &EventPicture, image: Option<&Attachment>, settings: &Settings) -> Self {
        PictureOut {
            id: picture.id,
            event_id: picture.event_id,
            user_id: picture.user_id,
            description: picture.description.clone(),
            image_url: image.map(|image| image.url(settings)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(name: Option<&str>, date: Option<&str>, bar_id: Option<i32>) -> EventParams {
        EventParams {
            name: name.map(str::to_string),
            date: date.map(str::to_string),
            bar_id,
            ..EventParams::default()
        }
    }

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 10);
        assert_eq!(parse_event_date("2025-01-10"), expected);
        assert_eq!(parse_event_date("2025-01-10T21:00:00-03:00"), expected);
        assert_eq!(parse_event_date("10/01/2025"), None);
    }

    #[test]
    fn create_requires_name_date_and_bar() {
        let (validator, date) = params(None, None, None).validate(false, false);
        let errors = validator.errors();

        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("date"));
        assert!(errors.contains_key("bar"));
        assert!(date.is_none());
    }

    #[test]
    fn bar_from_path_satisfies_bar_requirement() {
        let (validator, date) =
            params(Some("Trivia Night"), Some("2025-01-10"), None).validate(false, true);

        assert!(validator.is_valid());
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 10));
    }

    #[test]
    fn partial_update_only_checks_given_fields() {
        let (validator, _) = params(None, None, None).validate(true, false);
        assert!(validator.is_valid());

        let (validator, _) = params(Some(" "), Some("soon"), None).validate(true, false);
        assert!(validator.errors().contains_key("name"));
        assert!(validator.errors().contains_key("date"));
    }
}
