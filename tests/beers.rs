mod common;

use common::{app, bearer, create_beer, get_json, png_data_uri, token_for};
use rocket::http::Status;
use serde_json::{json, Value};

fn review_text(words: usize) -> String {
    vec!["refreshing"; words].join(" ")
}

#[test]
fn beer_list_and_detail() {
    let app = app();
    let client = &app.client;
    let token = token_for(client, "ana");
    let id = create_beer(client, &token, "Kross Golden");

    let (status, list) = get_json(client, "/api/v1/beers");
    assert_eq!(status, Status::Ok);
    assert_eq!(list["beers"][0]["name"], "Kross Golden");
    assert_eq!(list["beers"][0]["brewery"], "Kross");
    assert_eq!(list["beers"][0]["avg_rating"], Value::Null);

    let (status, beer) = get_json(client, &format!("/api/v1/beers/{}", id));
    assert_eq!(status, Status::Ok);
    assert_eq!(beer["name"], "Kross Golden");
    assert_eq!(beer["brand"]["name"], "Kross Classics");
    assert_eq!(beer["brand"]["brewery"]["name"], "Kross");
    assert_eq!(beer["style"], "Golden Ale");
    assert_eq!(beer["ibu"], 20);
    assert_eq!(beer["reviews"], json!([]));

    let (status, body) = get_json(client, "/api/v1/beers/999");
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["error"], "Beer not found");
}

#[test]
fn beer_needs_existing_brand() {
    let app = app();
    let client = &app.client;
    let token = token_for(client, "ana");

    let response = client
        .post("/api/v1/beers")
        .header(bearer(&token))
        .json(&json!({ "beer": { "name": "Orphan", "brand_id": 12, "image_base64": png_data_uri() } }))
        .dispatch();

    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["errors"]["brand"][0], "must exist");
    assert_eq!(app.stored_images(), 0);
}

#[test]
fn reviews_are_validated_on_the_server() {
    let app = app();
    let client = &app.client;
    let token = token_for(client, "ana");
    let id = create_beer(client, &token, "Kross Golden");
    let uri = format!("/api/v1/beers/{}/reviews", id);

    let response = client
        .post(uri.clone())
        .header(bearer(&token))
        .json(&json!({ "review": { "text": review_text(14), "rating": 4 } }))
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["errors"]["text"][0], "The review must have at least 15 words.");

    let response = client
        .post(uri.clone())
        .header(bearer(&token))
        .json(&json!({ "review": { "text": review_text(15), "rating": 6 } }))
        .dispatch();
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().unwrap();
    assert_eq!(body["errors"]["rating"][0], "Rating must be between 1 and 5.");

    let (_, reviews) = get_json(client, &uri);
    assert_eq!(reviews["reviews"], json!([]));
}

#[test]
fn reviews_need_a_token() {
    let app = app();
    let client = &app.client;
    let token = token_for(client, "ana");
    let id = create_beer(client, &token, "Kross Golden");
    let uri = format!("/api/v1/beers/{}/reviews", id);

    let response = client
        .post(uri.clone())
        .json(&json!({ "review": { "text": review_text(20), "rating": 5 } }))
        .dispatch();
    assert_eq!(response.status(), Status::Unauthorized);

    let (_, reviews) = get_json(client, &uri);
    assert_eq!(reviews["reviews"], json!([]));
}

#[test]
fn average_rating_follows_reviews() {
    let app = app();
    let client = &app.client;
    let ana = token_for(client, "ana");
    let bea = token_for(client, "bea");
    let id = create_beer(client, &ana, "Kross Golden");
    let uri = format!("/api/v1/beers/{}/reviews", id);

    for (token, rating) in [(&ana, 5), (&bea, 2)] {
        let response = client
            .post(uri.clone())
            .header(bearer(token))
            .json(&json!({ "review": { "text": review_text(15), "rating": rating } }))
            .dispatch();
        assert_eq!(response.status(), Status::Created);
        let body: Value = response.into_json().unwrap();
        assert_eq!(body["message"], "Review created successfully.");
        assert_eq!(body["review"]["rating"], rating);
    }

    let (_, beer) = get_json(client, &format!("/api/v1/beers/{}", id));
    assert_eq!(beer["avg_rating"], 3.5);
    assert_eq!(beer["reviews"].as_array().unwrap().len(), 2);
    assert_eq!(beer["reviews"][0]["user"]["handle"], "bea");

    let (_, list) = get_json(client, "/api/v1/beers");
    assert_eq!(list["beers"][0]["avg_rating"], 3.5);
}

#[test]
fn breweries_list_their_brands() {
    let app = app();
    let client = &app.client;
    let token = token_for(client, "ana");
    create_beer(client, &token, "Kross Golden");

    let (status, body) = get_json(client, "/api/v1/breweries");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["breweries"][0]["name"], "Kross");
    assert_eq!(body["breweries"][0]["brands"][0]["name"], "Kross Classics");

    let response = client
        .post("/api/v1/breweries/99/brands")
        .header(bearer(&token))
        .json(&json!({ "brand": { "name": "Ghost" } }))
        .dispatch();
    assert_eq!(response.status(), Status::NotFound);
}
