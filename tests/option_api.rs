mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn option_crud() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/v1/option", json!({"abbr": "color", "title": "Color"}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["abbr"], "color");
    assert!(body["data"].get("value").is_none());
    let uri = format!("/v1/option/{}", body["data"]["id"]);

    let (status, body) = app.put(&uri, json!({"title": "Colour"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Colour");
    assert_eq!(body["data"]["abbr"], "color");

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Colour");

    let (status, body) = app.delete(&uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["msg"], "Option deleted");

    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["msg"], "Option not found");
}

#[tokio::test]
async fn store_requires_abbr_and_title() {
    let app = TestApp::new().await;
    let (status, _) = app.post("/v1/option", json!({"abbr": "color"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _) = app
        .post("/v1/option", json!({"abbr": "", "title": "Color"}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn listing_filters_by_title_and_paginates() {
    let app = TestApp::new().await;
    app.create_option("color", "Color").await;
    app.create_option("size", "Size").await;
    app.create_option("colorway", "Colorway").await;

    let (_, body) = app.get("/v1/option?q=col").await;
    let abbrs = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["abbr"].as_str().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(abbrs, ["color", "colorway"]);

    let (_, body) = app.get("/v1/option?order=abbr&reverse=desc&limit=1").await;
    assert_eq!(body["data"][0]["abbr"], "size");
    assert_eq!(body["meta"]["total"], 3);
    assert_eq!(body["meta"]["last_page"], 3);
}

#[tokio::test]
async fn deleting_an_option_detaches_it_from_items() {
    let app = TestApp::new().await;
    let color = app.create_option("color", "Color").await;
    let item = app.create_item(json!({"title": "T-shirt", "price": 5})).await;
    let item_uri = format!("/v1/item/{}", item["id"]);
    app.put(&item_uri, json!({"options": [{"id": color, "value": "red"}]}))
        .await;

    app.delete(&format!("/v1/option/{color}")).await;

    let (status, body) = app.get(&item_uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["options"], json!([]));
}
