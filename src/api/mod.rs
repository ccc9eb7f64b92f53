use rocket::Route;
use serde::{Deserialize, Serialize};

pub mod attachments;
pub mod bar_management;
pub mod beer_management;
pub mod event_management;
pub mod user_management;

/// Body of actions that have nothing to echo back.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MessageOut {
    pub message: String,
}

impl MessageOut {
    pub fn new(message: impl Into<String>) -> Self {
        MessageOut {
            message: message.into(),
        }
    }
}

pub fn routes() -> Vec<Route> {
    routes![
        user_management::login::login,
        user_management::signup::signup,
        user_management::get_user::current_user,
        user_management::get_user::get_users,
        user_management::get_user::get_user,
        bar_management::list::get_bars,
        bar_management::get_bar::get_bar,
        bar_management::create::create_bar,
        bar_management::edit::put_bar,
        bar_management::edit::patch_bar,
        bar_management::delete::delete_bar,
        bar_management::add_beer::add_beer,
        event_management::list::get_events,
        event_management::list::get_bar_events,
        event_management::get_event::get_event,
        event_management::create::post_event,
        event_management::create::post_bar_event,
        event_management::edit::put_event,
        event_management::edit::patch_event,
        event_management::delete::delete_event,
        event_management::attendees::get_attendees,
        event_management::attendees::checkin,
        event_management::pictures::get_pictures,
        event_management::pictures::post_picture,
        beer_management::list::get_beers,
        beer_management::get_beer::get_beer,
        beer_management::create::create_beer,
        beer_management::reviews::get_reviews,
        beer_management::reviews::create_review,
        beer_management::breweries::get_breweries,
        beer_management::breweries::create_brewery,
        beer_management::breweries::create_brand,
        attachments::get_attachment,
    ]
}
