use crate::test::create_test_rocket_instance;
use rocket::{http::Status, local::asynchronous::Client};
use serde_json::Value;

#[rocket::async_test]
async fn test_health() {
    let (rocket, _file_base_path, _directory_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();

    let response = client.get("/health").dispatch().await;

    assert_eq!(response.status(), Status::Ok);

    let body = response.into_json::<Value>().await.unwrap();

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Server is running");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
}

#[rocket::async_test]
async fn test_unknown_route_uses_envelope() {
    let (rocket, _file_base_path, _directory_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();

    let response = client.get("/does/not/exist").dispatch().await;

    assert_eq!(response.status(), Status::NotFound);

    let body = response.into_json::<Value>().await.unwrap();

    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Not Found");
}
