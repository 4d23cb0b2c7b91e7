mod common;

use common::{red_png, Part, TestSetup, OUTPUT_BUCKET};
use http::StatusCode;

#[tokio::test]
async fn test_missing_result_is_404() {
    let setup = TestSetup::new();

    let response = setup.send_get_request("/results/foo").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = setup.parse_response_body(response).await.unwrap();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("'foo'"));
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["allowRetry"], false);
}

#[tokio::test]
async fn test_stored_result_is_linked() {
    let setup = TestSetup::new();
    setup.store.insert(
        OUTPUT_BUCKET,
        "results/2024/01/01/red-abc123def456.json",
        b"{}",
        "application/json",
    );

    let response = setup
        .send_get_request("/results/2024/01/01/red-abc123def456")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let page = setup.response_text(response).await.unwrap();
    assert!(page.contains("red-abc123def456.json"));
    assert!(page.contains("X-Amz-Expires=3600"));
}

#[tokio::test]
async fn test_result_from_upload_can_be_looked_up() {
    let setup = TestSetup::new();
    let png = red_png();
    setup
        .send_upload(&[Part::file("image", "red.png", &png)])
        .await
        .unwrap();

    let key = setup.store.keys(OUTPUT_BUCKET).remove(0);
    let response = setup
        .send_get_request(&format!("/results/{key}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_lookup_is_404() {
    let setup = TestSetup::new();
    setup.store.make_unreachable(OUTPUT_BUCKET);

    let response = setup.send_get_request("/results/foo").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = setup.parse_response_body(response).await.unwrap();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Error locating results for 'foo'"));
}

#[tokio::test]
async fn test_unreachable_store_is_500() {
    let setup = TestSetup::new();
    setup.store.take_offline(OUTPUT_BUCKET);

    let response = setup.send_get_request("/results/foo").await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = setup.parse_response_body(response).await.unwrap();
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Error generating results page for 'foo'"));
    assert_eq!(body["allowRetry"], true);
}
