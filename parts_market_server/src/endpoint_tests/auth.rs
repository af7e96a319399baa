use actix_web::{http::StatusCode, web, web::ServiceConfig};
use log::debug;
use parts_market_engine::{
    db_types::{EmailAddress, Role, UpsertOutcome},
    AuthApi,
};
use serde_json::json;

use super::helpers::{get_auth_config, get_request, issue_token, put_request};
use crate::{
    auth::TokenService,
    data_objects::LoginResult,
    endpoint_tests::mocks::MockAuthManager,
    routes::{AdminCheckRoute, LoginRoute, PromoteToAdminRoute},
};

#[actix_web::test]
async fn login_upserts_the_account_and_issues_a_token() {
    let _ = env_logger::try_init().ok();
    let body = json!({"email": "a@x.com", "role": "user", "name": "Alice"});
    let (status, body) = put_request("", "/user/a@x.com", body, configure_login).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let result = serde_json::from_str::<LoginResult>(&body).expect("Malformed login result");
    assert_eq!(result.result, UpsertOutcome::Created);
    // The token must verify against the server's own signing secret and assert the login email
    let tokens = TokenService::new(&get_auth_config());
    let claims = tokens.verify(&result.token).expect("Token did not verify");
    assert_eq!(claims.email, EmailAddress::new("a@x.com"));
}

fn configure_login(cfg: &mut ServiceConfig) {
    let mut auth_manager = MockAuthManager::new();
    auth_manager
        .expect_upsert_account()
        .withf(|email, profile| email.as_str() == "a@x.com" && profile["name"] == "Alice")
        .returning(|_, _| Ok(UpsertOutcome::Created));
    cfg.service(LoginRoute::<MockAuthManager>::new()).app_data(web::Data::new(AuthApi::new(auth_manager)));
}

#[actix_web::test]
async fn admin_check_requires_a_credential() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/admin/boss@x.com", configure_admin_check).await.expect_err("Expected error");
    assert_eq!(err, "No bearer credential was provided");
}

#[actix_web::test]
async fn admin_check_reports_the_role_of_the_path_email() {
    let _ = env_logger::try_init().ok();
    // Any authenticated user may ask, not just the admin themselves
    let token = issue_token("curious@x.com");
    let (status, body) = get_request(&token, "/admin/boss@x.com", configure_admin_check).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"admin":true}"#);
}

#[actix_web::test]
async fn admin_check_is_false_for_unknown_emails() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("curious@x.com");
    let (status, body) = get_request(&token, "/admin/ghost@x.com", configure_admin_check).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"admin":false}"#);
}

fn configure_admin_check(cfg: &mut ServiceConfig) {
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_fetch_role_for_email().returning(|email| {
        let role = (email.as_str() == "boss@x.com").then_some(Role::Admin);
        Ok(role)
    });
    cfg.service(AdminCheckRoute::<MockAuthManager>::new()).app_data(web::Data::new(AuthApi::new(auth_manager)));
}

#[actix_web::test]
async fn admins_can_promote_other_users() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("admin@x.com");
    let (status, body) =
        put_request(&token, "/user/admin/new@x.com", json!({}), configure_promotion).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"result":"created"}"#);
}

#[actix_web::test]
async fn plain_users_cannot_promote_anyone() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("user@x.com");
    let (status, body) = put_request(&token, "/user/admin/new@x.com", json!({}), configure_denied_promotion)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. user@x.com is not an administrator"}"#);
}

#[actix_web::test]
async fn unknown_identities_cannot_promote_anyone() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("ghost@x.com");
    let (status, body) = put_request(&token, "/user/admin/new@x.com", json!({}), configure_denied_promotion)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. ghost@x.com is not an administrator"}"#);
}

#[actix_web::test]
async fn promotion_with_a_tampered_token_never_reaches_the_authorizer() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token("admin@x.com");
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    debug!("Calling /user/admin with tampered token {token}");
    let err = put_request(&token, "/user/admin/new@x.com", json!({}), configure_denied_promotion)
        .await
        .expect_err("Expected 403");
    assert!(err.starts_with("Authentication Error. Access token signature is invalid."), "Unexpected error: {err}");
}

/// The mock grants the admin role only to `admin@x.com`, and `grant_admin` is pinned to the *target* email: a
/// promotion that reaches the store for any other record fails the test.
fn configure_promotion(cfg: &mut ServiceConfig) {
    let mut auth_manager = MockAuthManager::new();
    auth_manager
        .expect_fetch_role_for_email()
        .returning(|email| Ok((email.as_str() == "admin@x.com").then_some(Role::Admin)));
    auth_manager
        .expect_grant_admin()
        .withf(|email| email.as_str() == "new@x.com")
        .times(1)
        .returning(|_| Ok(UpsertOutcome::Created));
    cfg.service(PromoteToAdminRoute::<MockAuthManager>::new())
        .app_data(web::Data::new(AuthApi::new(auth_manager)));
}

/// Same as [`configure_promotion`], except that any write to the store fails the test: a denied request must not
/// create or modify the target record.
fn configure_denied_promotion(cfg: &mut ServiceConfig) {
    let mut auth_manager = MockAuthManager::new();
    auth_manager
        .expect_fetch_role_for_email()
        .returning(|email| Ok((email.as_str() == "admin@x.com").then_some(Role::Admin)));
    auth_manager.expect_grant_admin().never();
    cfg.service(PromoteToAdminRoute::<MockAuthManager>::new())
        .app_data(web::Data::new(AuthApi::new(auth_manager)));
}
