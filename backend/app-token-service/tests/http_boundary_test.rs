mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use serde_json::{json, Value};
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use app_token_service::handlers::{configure_routes, CallerToken, CALLER_TOKEN_HEADER};

use common::{issuer, StaticKeys, PRIVATE_KEY, TOKEN_PATH};

const CALLER_SECRET: &str = "caller-shared-secret";

macro_rules! app_for {
    ($server:expr, $keys:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(issuer(&$server.uri(), $keys)))
                .app_data(web::Data::new(CallerToken::new(CALLER_SECRET)))
                .configure(configure_routes),
        )
        .await
    };
}

async fn provider_returning(status: u16, body: Value, calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(calls)
        .mount(&server)
        .await;
    server
}

#[actix_web::test]
async fn post_with_valid_caller_token_returns_access_token() {
    let server = provider_returning(201, json!({ "token": "ghs_issued" }), 1).await;
    let app = app_for!(server, StaticKeys::with_pem(PRIVATE_KEY));

    let req = test::TestRequest::post()
        .uri("/generate-token")
        .insert_header((CALLER_TOKEN_HEADER, CALLER_SECRET))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "access_token": "ghs_issued" }));
}

#[actix_web::test]
async fn wrong_caller_token_is_rejected_before_pipeline() {
    let server = provider_returning(201, json!({ "token": "T" }), 0).await;
    let keys = StaticKeys::with_pem(PRIVATE_KEY);
    let app = app_for!(server, keys.clone());

    for presented in [Some("wrong"), Some(""), None] {
        let mut req = test::TestRequest::post().uri("/generate-token");
        if let Some(token) = presented {
            req = req.insert_header((CALLER_TOKEN_HEADER, token));
        }
        let resp = test::call_service(&app, req.to_request()).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 401);
    }

    assert_eq!(keys.call_count(), 0);
}

#[actix_web::test]
async fn non_post_methods_are_rejected_before_pipeline() {
    let server = provider_returning(201, json!({ "token": "T" }), 0).await;
    let keys = StaticKeys::with_pem(PRIVATE_KEY);
    let app = app_for!(server, keys.clone());

    let requests = [
        test::TestRequest::get(),
        test::TestRequest::put(),
        test::TestRequest::delete(),
        test::TestRequest::patch(),
    ];

    for req in requests {
        let req = req
            .uri("/generate-token")
            .insert_header((CALLER_TOKEN_HEADER, CALLER_SECRET))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers().get(header::ALLOW).unwrap(), "POST");
    }

    assert_eq!(keys.call_count(), 0);
}

#[actix_web::test]
async fn pipeline_failures_map_to_generic_500() {
    let server = provider_returning(
        403,
        json!({ "message": "Resource not accessible by integration" }),
        1,
    )
    .await;
    let app = app_for!(server, StaticKeys::with_pem(PRIVATE_KEY));

    let req = test::TestRequest::post()
        .uri("/generate-token")
        .insert_header((CALLER_TOKEN_HEADER, CALLER_SECRET))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = test::read_body(resp).await;
    let text = String::from_utf8_lossy(&body);
    assert!(text.contains("Failed to generate app access token"));
    assert!(!text.contains("Resource not accessible"));
    assert!(!text.contains("403"));
}

#[actix_web::test]
async fn secret_failure_maps_to_500_without_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;
    let app = app_for!(server, StaticKeys::unavailable());

    let req = test::TestRequest::post()
        .uri("/generate-token")
        .insert_header((CALLER_TOKEN_HEADER, CALLER_SECRET))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Secret retrieval failed", "code": 500 }));
}

#[actix_web::test]
async fn health_endpoint_is_open() {
    let server = MockServer::start().await;
    let app = app_for!(server, StaticKeys::unavailable());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
}
