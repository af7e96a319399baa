use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use parts_market_engine::{
    db_types::{EmailAddress, Role, UserAccount},
    AccountApi,
    AuthApi,
};
use serde_json::json;

use super::helpers::{get_request, issue_token};
use crate::{
    endpoint_tests::mocks::{MockAccountManager, MockAuthManager},
    routes::MyProfileRoute,
};

#[actix_web::test]
async fn fetch_my_profile_no_credential() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/user/a@x.com", configure).await.expect_err("Expected error");
    assert_eq!(err, "No bearer credential was provided");
}

#[actix_web::test]
async fn fetch_my_profile() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("a@x.com");
    let (status, body) = get_request(&token, "/user/a@x.com", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, PROFILE_JSON);
}

#[actix_web::test]
async fn try_fetch_another_users_profile() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("b@x.com");
    let (status, body) = get_request(&token, "/user/a@x.com", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. b@x.com may not act on records belonging to another user"}"#);
}

#[actix_web::test]
async fn fetch_my_profile_before_first_login_is_not_found() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("ghost@x.com");
    let (status, body) = get_request(&token, "/user/ghost@x.com", configure).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. No account for ghost@x.com"}"#);
}

fn configure(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager
        .expect_fetch_account_by_email()
        .returning(|email| Ok((email.as_str() == "a@x.com").then(account)));
    cfg.service(MyProfileRoute::<MockAccountManager, MockAuthManager>::new())
        .app_data(web::Data::new(AccountApi::new(account_manager)))
        .app_data(web::Data::new(AuthApi::new(MockAuthManager::new())));
}

fn account() -> UserAccount {
    UserAccount {
        id: 1,
        email: EmailAddress::new("a@x.com"),
        role: Role::User,
        profile: json!({"email": "a@x.com", "name": "Alice"}),
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

const PROFILE_JSON: &str = r#"{"id":1,"email":"a@x.com","role":"user","profile":{"email":"a@x.com","name":"Alice"},"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z"}"#;
