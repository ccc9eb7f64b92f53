pub mod get_user;
pub mod login;
pub mod models;
pub mod password;
pub mod sessions;
pub mod signup;
pub mod token;
