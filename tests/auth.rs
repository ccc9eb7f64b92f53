mod common;

use common::{app, bearer, signup, token_for};
use rocket::http::{ContentType, Status};
use serde_json::{json, Value};

#[test]
fn signup_and_login_round_trip() {
    let app = app();
    let client = &app.client;

    let token = token_for(client, "ana");

    let response = client
        .get("/api/v1/users/current")
        .header(bearer(&token))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().unwrap();
    assert_eq!(body["user"]["handle"], "ana");
    assert_eq!(body["user"]["name"], "Ana Rojas");
    assert!(body["user"].get("password_hash").is_none());
}

#[test]
fn login_body_carries_user_and_message() {
    let app = app();
    let client = &app.client;
    assert_eq!(signup(client, "ana"), Status::Created);

    let response = client
        .post("/api/v1/login")
        .json(&json!({ "user": { "email": "ANA@example.com", "password": common::PASSWORD } }))
        .dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert!(response
        .headers()
        .get_one("Authorization")
        .unwrap()
        .starts_with("Bearer "));

    let body: Value = response.into_json().unwrap();
    assert_eq!(body["message"], "Logged in successfully.");
    assert_eq!(body["user"]["email"], "ana@example.com");
}

#[test]
fn wrong_password_is_unauthorized() {
    let app = app();
    let client = &app.client;
    assert_eq!(signup(client, "ana"), Status::Created);

    let response = client
        .post("/api/v1/login")
        .json(&json!({ "user": { "email": "ana@example.com", "password": "wrong-password" } }))
        .dispatch();

    assert_eq!(response.status(), Status::Unauthorized);
    assert!(response.headers().get_one("Authorization").is_none());
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["error"], "Invalid email or password.");
}

#[test]
fn signup_reports_field_errors() {
    let app = app();
    let response = app
        .client
        .post("/api/v1/signup")
        .header(ContentType::Form)
        .body("user[first_name]=Ana&user[email]=nope&user[password]=abc&user[password_confirmation]=abd")
        .dispatch();

    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().unwrap();
    let errors = &body["errors"];
    assert_eq!(errors["last_name"][0], "can't be blank");
    assert_eq!(errors["handle"][0], "can't be blank");
    assert_eq!(errors["email"][0], "is invalid");
    assert_eq!(errors["password"][0], "is too short (minimum is 6 characters)");
    assert_eq!(errors["password_confirmation"][0], "doesn't match Password");
}

#[test]
fn duplicate_email_is_rejected() {
    let app = app();
    let client = &app.client;

    assert_eq!(signup(client, "ana"), Status::Created);
    assert_eq!(signup(client, "ana"), Status::UnprocessableEntity);
}

#[test]
fn bad_tokens_are_rejected_before_persisting() {
    let app = app();
    let client = &app.client;
    let token = token_for(client, "ana");

    let response = client
        .post("/api/v1/bars")
        .json(&json!({ "bar": { "name": "El Bar" } }))
        .dispatch();
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().unwrap();
    assert!(body["error"].is_string());

    let response = client
        .post("/api/v1/bars")
        .header(bearer(&format!("{}x", token)))
        .json(&json!({ "bar": { "name": "El Bar" } }))
        .dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .post("/api/v1/events")
        .header(bearer("not-a-jwt"))
        .json(&json!({ "event": { "name": "Quiz", "date": "2025-01-10", "bar_id": 1 } }))
        .dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    let (_, bars) = common::get_json(client, "/api/v1/bars");
    assert_eq!(bars["bars"], json!([]));
    let (_, events) = common::get_json(client, "/api/v1/events");
    assert_eq!(events["events"], json!([]));
}

#[test]
fn users_are_searchable_by_handle_prefix() {
    let app = app();
    let client = &app.client;
    assert_eq!(signup(client, "ana"), Status::Created);
    assert_eq!(signup(client, "andres"), Status::Created);
    assert_eq!(signup(client, "bea"), Status::Created);

    let (status, body) = common::get_json(client, "/api/v1/users?handle=@an");
    assert_eq!(status, Status::Ok);
    let handles: Vec<&str> = body["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|user| user["handle"].as_str().unwrap())
        .collect();
    assert_eq!(handles, vec!["ana", "andres"]);

    let (_, body) = common::get_json(client, "/api/v1/users?handle=zz");
    assert_eq!(body["users"], json!([]));

    let (status, body) = common::get_json(client, "/api/v1/users/99");
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["error"], "User not found");
}

#[test]
fn handle_without_characters_is_rejected() {
    let app = app();
    let response = app
        .client
        .post("/api/v1/signup")
        .header(ContentType::Form)
        .body(
            "user[first_name]=Ana&user[last_name]=Rojas&user[handle]=%40\
             &user[email]=ana%40example.com&user[password]=cerveza123\
             &user[password_confirmation]=cerveza123",
        )
        .dispatch();

    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["errors"]["handle"][0], "can't be blank");

    let (_, users) = common::get_json(&app.client, "/api/v1/users");
    assert_eq!(users["users"], json!([]));
}
