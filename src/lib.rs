#[macro_use]
extern crate rocket;

pub mod api;
pub mod attachment;
pub mod client;
mod cors;
pub mod db;
pub mod error;
pub mod schema;
pub mod settings;
pub mod validation;

use rocket::fairing::AdHoc;
use rocket::{Build, Rocket};

use settings::Settings;

/// Assembles the server: settings, database, routes under `/api/v1` and JSON catchers.
pub fn rocket(settings: Settings) -> Rocket<Build> {
    rocket::build()
        .manage(settings)
        .attach(AdHoc::try_on_ignite("Database", db::init_database))
        .attach(cors::Cors)
        .mount("/", routes![cors::preflight])
        .mount("/api/v1/", api::routes())
        .register(
            "/",
            catchers![
                error::bad_request,
                error::unauthorized,
                error::not_found,
                error::unprocessable_entity,
                error::internal_error,
            ],
        )
}
