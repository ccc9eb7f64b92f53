use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::users;

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub handle: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserOut {
    pub id: i32,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub handle: String,
    pub email: String,
}

impl From<&User> for UserOut {
    fn from(user: &User) -> Self {
        UserOut {
            id: user.id,
            name: format!("{} {}", user.first_name, user.last_name),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            handle: user.handle.clone(),
            email: user.email.clone(),
        }
    }
}

/// Request guard for routes that need a valid bearer token.
#[derive(Debug)]
pub struct UserLoggedIn(pub UserOut);
