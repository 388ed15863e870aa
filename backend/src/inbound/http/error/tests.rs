//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde::Deserialize;
use serde_json::Value;

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::invalid_reference("user_id"), StatusCode::BAD_REQUEST)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::service_unavailable("down"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] error: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&error), status);
}

#[actix_web::test]
async fn service_unavailable_keeps_its_message() {
    let response = Error::service_unavailable("could not verify owner_id").error_response();
    let body = to_bytes(response.into_body()).await.expect("body");
    let value: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(value["code"], "service_unavailable");
    assert_eq!(value["message"], "could not verify owner_id");
}

#[derive(Deserialize)]
struct Counted {
    #[expect(dead_code, reason = "only deserialisation is under test")]
    count: u32,
}

async fn counted(_body: web::Json<Counted>) -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[actix_web::test]
async fn malformed_json_uses_the_error_envelope() {
    let app = actix_test::init_service(
        App::new()
            .configure(configure_extractors)
            .route("/counted", web::post().to(counted)),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/counted")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"count\": \"many\"}")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|message| message.starts_with("invalid JSON body"))
    );
}
