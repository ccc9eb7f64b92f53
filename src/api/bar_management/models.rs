use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::bars;
use crate::validation::Validator;

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = bars)]
pub struct Bar {
    pub id: i32,
    pub name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BarOut {
    pub id: i32,
    pub name: String,
}

impl From<&Bar> for BarOut {
    fn from(bar: &Bar) -> Self {
        BarOut {
            id: bar.id,
            name: bar.name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BarEnvelope {
    pub bar: BarOut,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BarList {
    pub bars: Vec<BarOut>,
}

/// Allow-listed bar fields; anything else in the payload is ignored.
#[derive(Deserialize, Debug, Default)]
pub struct BarParams {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct BarPayload {
    pub bar: BarParams,
}

impl BarParams {
    pub fn validate(&self, partial: bool) -> Validator {
        let mut validator = Validator::new();
        if !partial || self.name.is_some() {
            validator.require("name", self.name.as_deref());
        }
        validator
    }
}
