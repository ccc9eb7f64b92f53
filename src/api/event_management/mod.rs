pub mod attendees;
pub mod create;
pub mod delete;
pub mod edit;
pub mod get_event;
pub mod list;
pub mod models;
pub mod pictures;
