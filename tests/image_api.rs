mod common;

use axum::http::StatusCode;
use common::{PNG, TestApp};

#[tokio::test]
async fn upload_stores_file_and_row() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("gallery/2024", PNG).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let image = &body["data"];
    assert_eq!(image["path"], "gallery/2024");
    assert_eq!(image["ext"], "png");

    let filename = image["filename"].as_str().unwrap();
    assert_eq!(filename.len(), 32);
    let full_path = format!("gallery/2024/{filename}.png");
    assert_eq!(
        image["url"],
        format!("http://test.local/storage/{full_path}")
    );
    assert_eq!(app.disk.get(&full_path).await.as_deref(), Some(PNG));

    let (status, body) = app.get(&format!("/v1/image/{}", image["id"])).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["filename"], filename);
}

#[tokio::test]
async fn upload_rejects_non_images_and_bad_paths() {
    let app = TestApp::new().await;

    let (status, body) = app.upload("items", b"just some text").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["status"], false);

    let (status, _) = app.upload("../outside", PNG).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(app.disk.is_empty().await);
}

#[tokio::test]
async fn destroy_removes_file_and_detaches() {
    let app = TestApp::new().await;
    let image = app.create_image().await;
    let item = app
        .create_item(serde_json::json!({"title": "Desk lamp", "price": 1, "images": [image]}))
        .await;

    let (status, body) = app.delete(&format!("/v1/image/{image}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["msg"], "Image deleted");
    assert!(app.disk.is_empty().await);

    let (_, body) = app.get(&format!("/v1/item/{}", item["id"])).await;
    assert_eq!(body["data"]["images"], serde_json::json!([]));

    let (status, body) = app.delete(&format!("/v1/image/{image}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["msg"], "Image not found");
}
