use actix_web::{
    body::MessageBody,
    http::{header, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use log::debug;
use parts_market_engine::db_types::EmailAddress;
use pms_common::Secret;
use serde_json::Value;

use crate::{auth::TokenService, config::AuthConfig};

// Creates a test `AuthConfig` for issuing tokens. DO NOT re-use this secret anywhere.
pub fn get_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new("endpoint test signing secret. do not reuse.".to_string()) }
}

pub fn issue_token(email: &str) -> String {
    let tokens = TokenService::new(&get_auth_config());
    tokens.issue(&EmailAddress::new(email)).expect("Failed to sign token")
}

pub async fn get_request(
    token: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::get().uri(path), token, configure).await
}

pub async fn post_request(
    token: &str,
    path: &str,
    body: Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::post().uri(path).set_json(body), token, configure).await
}

pub async fn put_request(
    token: &str,
    path: &str,
    body: Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::put().uri(path).set_json(body), token, configure).await
}

pub async fn patch_request(
    token: &str,
    path: &str,
    body: Value,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::patch().uri(path).set_json(body), token, configure).await
}

pub async fn delete_request(
    token: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    send_request(TestRequest::delete().uri(path), token, configure).await
}

/// Runs one request against a test app wired up with the given routes and mocks. Access-gate rejections surface
/// as `Err` with the error's display string; handler-level rejections come back as ordinary responses with their
/// status code and `{"error": …}` body.
async fn send_request(
    mut req: TestRequest,
    token: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !token.is_empty() {
        req = req.insert_header((header::AUTHORIZATION, format!("Bearer {token}")));
    }
    let req = req.to_request();
    let tokens = TokenService::new(&get_auth_config());
    let app = App::new().app_data(web::Data::new(tokens)).configure(configure);

    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}
