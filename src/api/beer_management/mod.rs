pub mod breweries;
pub mod create;
pub mod get_beer;
pub mod list;
pub mod models;
pub mod reviews;
