use log::warn;

use super::{ApiClient, ClientError};
use crate::api::beer_management::models::{BeerDetail, BeerSummary, ReviewOut};
use crate::api::event_management::models::{EventOut, PictureOut};
use crate::api::user_management::models::UserOut;

pub const EVENTS_FAILED: &str = "Could not load events.";
pub const EVENT_FAILED: &str = "Could not load the event.";
pub const ATTENDEES_FAILED: &str = "Could not load attendees.";
pub const PICTURES_FAILED: &str = "Could not load pictures.";
pub const BEERS_FAILED: &str = "Could not load beers.";
pub const BEER_FAILED: &str = "Could not load the beer.";

/// State of a view backed by one fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Loading,
    Failed(String),
    Loaded(T),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Loading
    }
}

impl<T> Loadable<T> {
    /// Any failure collapses into the view's fixed `message`.
    pub fn from_result(result: Result<T, ClientError>, message: &str) -> Self {
        match result {
            Ok(value) => Loadable::Loaded(value),
            Err(err) => {
                warn!("{} ({})", message, err);
                Loadable::Failed(message.to_string())
            }
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }
}

/// Case-insensitive substring match on the beer name; a blank query keeps everything.
pub fn filter_beers<'a>(beers: &'a [BeerSummary], query: &str) -> Vec<&'a BeerSummary> {
    let needle = query.trim().to_lowercase();
    beers
        .iter()
        .filter(|beer| needle.is_empty() || beer.name.to_lowercase().contains(&needle))
        .collect()
}

/// Puts the current user's reviews first, keeping the order within each group.
pub fn order_reviews(reviews: &mut [ReviewOut], current_user: Option<i32>) {
    if let Some(uid) = current_user {
        reviews.sort_by_key(|review| review.user_id != uid);
    }
}

#[derive(Debug, Default)]
pub struct BeerListView {
    pub beers: Loadable<Vec<BeerSummary>>,
    pub query: String,
}

impl BeerListView {
    pub async fn load(client: &ApiClient) -> Self {
        BeerListView {
            beers: Loadable::from_result(client.beers().await, BEERS_FAILED),
            query: String::new(),
        }
    }

    pub fn visible(&self) -> Vec<&BeerSummary> {
        match &self.beers {
            Loadable::Loaded(beers) => filter_beers(beers, &self.query),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct BeerDetailView {
    pub beer: Loadable<BeerDetail>,
}

impl BeerDetailView {
    pub async fn load(client: &ApiClient, beer_id: i32, current_user: Option<&UserOut>) -> Self {
        let mut beer = Loadable::from_result(client.beer(beer_id).await, BEER_FAILED);
        if let Loadable::Loaded(detail) = &mut beer {
            order_reviews(&mut detail.reviews, current_user.map(|user| user.id));
        }
        BeerDetailView { beer }
    }
}

#[derive(Debug)]
pub struct EventListView {
    pub events: Loadable<Vec<EventOut>>,
}

impl EventListView {
    pub async fn load(client: &ApiClient) -> Self {
        EventListView {
            events: Loadable::from_result(client.events().await, EVENTS_FAILED),
        }
    }
}

/// Event page. Attendees and the gallery load on demand.
#[derive(Debug)]
pub struct EventDetailView {
    pub event_id: i32,
    pub event: Loadable<EventOut>,
    pub attendees: Option<Loadable<Vec<UserOut>>>,
    pub pictures: Option<Loadable<Vec<PictureOut>>>,
}

impl EventDetailView {
    pub async fn load(client: &ApiClient, event_id: i32) -> Self {
        EventDetailView {
            event_id,
            event: Loadable::from_result(client.event(event_id).await, EVENT_FAILED),
            attendees: None,
            pictures: None,
        }
    }

    pub async fn show_attendees(&mut self, client: &ApiClient) {
        let result = client.attendees(self.event_id).await;
        self.attendees = Some(Loadable::from_result(result, ATTENDEES_FAILED));
    }

    pub async fn show_pictures(&mut self, client: &ApiClient) {
        let result = client.pictures(self.event_id).await;
        self.pictures = Some(Loadable::from_result(result, PICTURES_FAILED));
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn beer(id: i32, name: &str) -> BeerSummary {
        BeerSummary {
            id,
            name: name.to_string(),
            style: None,
            alcohol: None,
            ibu: None,
            brewery: "Kross".to_string(),
            avg_rating: None,
            image_url: None,
        }
    }

    fn review(id: i32, user_id: i32) -> ReviewOut {
        ReviewOut {
            id,
            beer_id: 1,
            user_id,
            text: String::new(),
            rating: 3,
            created_at: Utc::now().naive_utc(),
            user: None,
        }
    }

    #[test]
    fn search_ignores_case() {
        let beers = vec![beer(1, "Golden Ale"), beer(2, "Stout"), beer(3, "Pale ALE")];

        let ids: Vec<i32> = filter_beers(&beers, "ale").iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(filter_beers(&beers, "  ").len(), 3);
        assert!(filter_beers(&beers, "porter").is_empty());
    }

    #[test]
    fn own_reviews_come_first() {
        let mut reviews = vec![review(1, 7), review(2, 9), review(3, 7), review(4, 9)];
        order_reviews(&mut reviews, Some(9));

        let ids: Vec<i32> = reviews.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn failures_use_fixed_message() {
        let failed: Loadable<Vec<EventOut>> = Loadable::from_result(
            Err(ClientError::Status {
                status: 500,
                message: "Database error".to_string(),
            }),
            EVENTS_FAILED,
        );

        assert_eq!(failed, Loadable::Failed(EVENTS_FAILED.to_string()));
        assert!(failed.loaded().is_none());
        assert!(Loadable::<()>::default().is_loading());
    }

    #[test]
    fn hidden_list_while_loading() {
        let view = BeerListView::default();
        assert!(view.visible().is_empty());
    }
}
