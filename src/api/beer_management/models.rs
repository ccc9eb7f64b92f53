use std::collections::HashMap;

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::api::bar_management::models::BarOut;
use crate::api::user_management::models::UserOut;
use crate::attachment::Attachment;
use crate::schema::{beers, brands, breweries, reviews};
use crate::settings::Settings;
use crate::validation::{
    is_long_enough_review, is_valid_rating, Validator, RATING_OUT_OF_RANGE, REVIEW_TOO_SHORT,
};

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = breweries)]
pub struct Brewery {
    pub id: i32,
    pub name: String,
}

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = brands)]
pub struct Brand {
    pub id: i32,
    pub name: String,
    pub brewery_id: i32,
}

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = beers)]
pub struct Beer {
    pub id: i32,
    pub name: String,
    pub brand_id: i32,
    pub style: Option<String>,
    pub hop: Option<String>,
    pub yeast: Option<String>,
    pub malts: Option<String>,
    pub ibu: Option<i32>,
    pub alcohol: Option<f64>,
    pub blg: Option<f64>,
    pub image_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Debug, Clone)]
#[diesel(table_name = reviews)]
pub struct Review {
    pub id: i32,
    pub beer_id: i32,
    pub user_id: i32,
    pub text: String,
    pub rating: i32,
    pub created_at: NaiveDateTime,
}

/// Mean rating, `None` while a beer has no reviews.
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let total: i32 = ratings.iter().sum();
    Some(f64::from(total) / ratings.len() as f64)
}

/// Groups `(beer_id, rating)` rows into an average per beer.
pub fn average_by_beer(rows: &[(i32, i32)]) -> HashMap<i32, f64> {
    let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
    for (beer_id, rating) in rows {
        grouped.entry(*beer_id).or_default().push(*rating);
    }
    grouped
        .into_iter()
        .filter_map(|(beer_id, ratings)| average_rating(&ratings).map(|avg| (beer_id, avg)))
        .collect()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BreweryOut {
    pub id: i32,
    pub name: String,
}

impl From<&Brewery> for BreweryOut {
    fn from(brewery: &Brewery) -> Self {
        BreweryOut {
            id: brewery.id,
            name: brewery.name.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BrandOut {
    pub id: i32,
    pub name: String,
    pub brewery: BreweryOut,
}

impl BrandOut {
    pub fn new(brand: &Brand, brewery: &Brewery) -> Self {
        BrandOut {
            id: brand.id,
            name: brand.name.clone(),
            brewery: BreweryOut::from(brewery),
        }
    }
}

/// Row of the beer list. `brewery` is the brewery name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BeerSummary {
    pub id: i32,
    pub name: String,
    pub style: Option<String>,
    pub alcohol: Option<f64>,
    pub ibu: Option<i32>,
    pub brewery: String,
    pub avg_rating: Option<f64>,
    pub image_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BeerList {
    pub beers: Vec<BeerSummary>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ReviewOut {
    pub id: i32,
    pub beer_id: i32,
    pub user_id: i32,
    pub text: String,
    pub rating: i32,
    pub created_at: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserOut>,
}

impl ReviewOut {
    pub fn new(review: &Review, user: Option<UserOut>) -> Self {
        ReviewOut {
            id: review.id,
            beer_id: review.beer_id,
            user_id: review.user_id,
            text: review.text.clone(),
            rating: review.rating,
            created_at: review.created_at,
            user,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BeerDetail {
    pub id: i32,
    pub name: String,
    pub brand: BrandOut,
    pub style: Option<String>,
    pub hop: Option<String>,
    pub yeast: Option<String>,
    pub malts: Option<String>,
    pub ibu: Option<i32>,
    pub alcohol: Option<f64>,
    pub blg: Option<f64>,
    pub avg_rating: Option<f64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub bars: Vec<BarOut>,
    #[serde(default)]
    pub reviews: Vec<ReviewOut>,
}

impl BeerDetail {
    pub fn new(
        beer: &Beer,
        brand: BrandOut,
        image: Option<&Attachment>,
        bars: Vec<BarOut>,
        reviews: Vec<ReviewOut>,
        settings: &Settings,
    ) -> Self {
        let ratings: Vec<i32> = reviews.iter().map(|review| review.rating).collect();

        BeerDetail {
            id: beer.id,
            name: beer.name.clone(),
            brand,
            style: beer.style.clone(),
            hop: beer.hop.clone(),
            yeast: beer.yeast.clone(),
            malts: beer.malts.clone(),
            ibu: beer.ibu,
            alcohol: beer.alcohol,
            blg: beer.blg,
            avg_rating: average_rating(&ratings),
            image_url: image.map(|image| image.url(settings)),
            bars,
            reviews,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct BeerEnvelope {
    pub beer: BeerDetail,
    pub message: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct BeerParams {
    pub name: Option<String>,
    pub brand_id: Option<i32>,
    pub style: Option<String>,
    pub hop: Option<String>,
    pub yeast: Option<String>,
    pub malts: Option<String>,
    pub ibu: Option<i32>,
    pub alcohol: Option<f64>,
    pub blg: Option<f64>,
    pub image_base64: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct BeerPayload {
    pub beer: BeerParams,
}

impl BeerParams {
    pub fn validate(&self) -> Validator {
        let mut validator = Validator::new();
        validator.require("name", self.name.as_deref());
        if self.brand_id.is_none() {
            validator.add("brand", "must exist");
        }
        if self.ibu.map_or(false, |ibu| ibu < 0) {
            validator.add("ibu", "must be greater than or equal to 0");
        }
        if self.alcohol.map_or(false, |abv| !(0.0..=100.0).contains(&abv)) {
            validator.add("alcohol", "must be between 0 and 100");
        }
        validator
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ReviewParams {
    pub text: Option<String>,
    pub rating: Option<i32>,
}

#[derive(Deserialize, Debug)]
pub struct ReviewPayload {
    pub review: ReviewParams,
}

impl ReviewParams {
    pub fn validate(&self) -> Validator {
        let mut validator = Validator::new();
        if !self.text.as_deref().map_or(false, is_long_enough_review) {
            validator.add("text", REVIEW_TOO_SHORT);
        }
        if !self.rating.map_or(false, is_valid_rating) {
            validator.add("rating", RATING_OUT_OF_RANGE);
        }
        validator
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReviewEnvelope {
    pub review: ReviewOut,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ReviewList {
    pub reviews: Vec<ReviewOut>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_no_reviews_is_none() {
        assert_eq!(average_rating(&[]), None);
        assert_eq!(average_rating(&[4, 5]), Some(4.5));
    }

    #[test]
    fn averages_are_grouped_per_beer() {
        let averages = average_by_beer(&[(1, 2), (2, 5), (1, 4)]);

        assert_eq!(averages.get(&1), Some(&3.0));
        assert_eq!(averages.get(&2), Some(&5.0));
        assert_eq!(averages.get(&3), None);
    }

    #[test]
    fn review_needs_words_and_rating() {
        let short = ReviewParams {
            text: Some("Too short to count".to_string()),
            rating: Some(6),
        };
        let validator = short.validate();

        assert_eq!(validator.errors()["text"], vec![REVIEW_TOO_SHORT.to_string()]);
        assert_eq!(validator.errors()["rating"], vec![RATING_OUT_OF_RANGE.to_string()]);

        let ok = ReviewParams {
            text: Some(vec!["malty"; 15].join(" ")),
            rating: Some(4),
        };
        assert!(ok.validate().is_valid());
    }

    #[test]
    fn beer_requires_name_and_brand() {
        let validator = BeerParams::default().validate();

        assert!(validator.errors().contains_key("name"));
        assert!(validator.errors().contains_key("brand"));
    }
}
