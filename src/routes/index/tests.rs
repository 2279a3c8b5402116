use crate::test::create_test_rocket_instance;
use rocket::{
    http::{ContentType, Status},
    local::asynchronous::Client,
};

#[rocket::async_test]
async fn test_index_serves_client() {
    let (rocket, _file_base_path, _directory_dropper) = create_test_rocket_instance().await;
    let client = Client::tracked(rocket).await.unwrap();

    let response = client.get("/").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::HTML));

    let body = response.into_string().await.unwrap();

    assert!(body.contains("<form id=\"single-form\">"));
    assert!(body.contains("/upload-multiple"));
}
