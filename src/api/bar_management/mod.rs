pub mod add_beer;
pub mod create;
pub mod delete;
pub mod edit;
pub mod get_bar;
pub mod list;
pub mod models;
