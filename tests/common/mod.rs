#![allow(dead_code)]

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use brewhub_backend::settings::Settings;
use rocket::http::{ContentType, Header, Status};
use rocket::local::blocking::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

pub const PASSWORD: &str = "cerveza123";

/// Smallest byte sequence the image sniffer recognises as PNG.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

pub struct TestApp {
    pub client: Client,
    dir: TempDir,
}

impl TestApp {
    pub fn image_folder(&self) -> PathBuf {
        self.dir.path().join("images")
    }

    pub fn stored_images(&self) -> usize {
        std::fs::read_dir(self.image_folder())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

pub fn app() -> TestApp {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        database_url: dir.path().join("brewhub.sqlite").display().to_string(),
        image_folder: dir.path().join("images").display().to_string(),
        jwt_secret: "test-secret".to_string(),
        token_ttl_hours: 1,
        public_url: String::new(),
    };

    let client = Client::tracked(brewhub_backend::rocket(settings)).unwrap();
    TestApp { client, dir }
}

pub fn png_data_uri() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(PNG_BYTES))
}

pub fn bearer(token: &str) -> Header<'static> {
    Header::new("Authorization", format!("Bearer {}", token))
}

pub fn signup(client: &Client, handle: &str) -> Status {
    let body = format!(
        "user[first_name]=Ana&user[last_name]=Rojas&user[handle]={handle}\
         &user[email]={handle}%40example.com&user[password]={PASSWORD}\
         &user[password_confirmation]={PASSWORD}"
    );
    client
        .post("/api/v1/signup")
        .header(ContentType::Form)
        .body(body)
        .dispatch()
        .status()
}

pub fn login(client: &Client, handle: &str) -> String {
    let response = client
        .post("/api/v1/login")
        .json(&json!({ "user": { "email": format!("{}@example.com", handle), "password": PASSWORD } }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let header = response.headers().get_one("Authorization").unwrap();
    header.strip_prefix("Bearer ").unwrap().to_string()
}

/// Signs a fresh user up and returns a bearer token for them.
pub fn token_for(client: &Client, handle: &str) -> String {
    assert_eq!(signup(client, handle), Status::Created);
    login(client, handle)
}

pub fn create_bar(client: &Client, token: &str, name: &str) -> i64 {
    let response = client
        .post("/api/v1/bars")
        .header(bearer(token))
        .json(&json!({ "bar": { "name": name } }))
        .dispatch();
    assert_eq!(response.status(), Status::Created);

    let body: Value = response.into_json().unwrap();
    body["bar"]["id"].as_i64().unwrap()
}

pub fn create_event(client: &Client, token: &str, bar_id: i64, name: &str) -> Value {
    let response = client
        .post("/api/v1/events")
        .header(bearer(token))
        .json(&json!({ "event": { "name": name, "date": "2025-01-10", "bar_id": bar_id } }))
        .dispatch();
    assert_eq!(response.status(), Status::Created);

    response.into_json::<Value>().unwrap()["event"].clone()
}

/// Creates brewery, brand and beer; returns the beer id.
pub fn create_beer(client: &Client, token: &str, name: &str) -> i64 {
    let brewery: Value = client
        .post("/api/v1/breweries")
        .header(bearer(token))
        .json(&json!({ "brewery": { "name": "Kross" } }))
        .dispatch()
        .into_json()
        .unwrap();
    let brewery_id = brewery["brewery"]["id"].as_i64().unwrap();

    let brand: Value = client
        .post(format!("/api/v1/breweries/{}/brands", brewery_id))
        .header(bearer(token))
        .json(&json!({ "brand": { "name": "Kross Classics" } }))
        .dispatch()
        .into_json()
        .unwrap();
    let brand_id = brand["brand"]["id"].as_i64().unwrap();

    let response = client
        .post("/api/v1/beers")
        .header(bearer(token))
        .json(&json!({ "beer": {
            "name": name,
            "brand_id": brand_id,
            "style": "Golden Ale",
            "ibu": 20,
            "alcohol": 5.2,
        } }))
        .dispatch();
    assert_eq!(response.status(), Status::Created);

    let body: Value = response.into_json().unwrap();
    body["beer"]["id"].as_i64().unwrap()
}

pub fn get_json(client: &Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri.to_string()).dispatch();
    let status = response.status();
    (status, response.into_json().unwrap_or(Value::Null))
}
