use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use log::debug;
use parts_market_engine::{
    db_types::{EmailAddress, Order},
    traits::OrderFlowError,
    AccountApi,
    AuthApi,
    OrderFlowApi,
};
use pms_common::UsdCents;
use serde_json::json;

use super::helpers::{delete_request, get_request, issue_token, patch_request, post_request};
use crate::{
    endpoint_tests::mocks::{MockAccountManager, MockAuthManager, MockOrderFlowManager},
    routes::{DeleteOrderRoute, MyOrdersRoute, OrderForPaymentRoute, PurchaseRoute, SettleOrderRoute, SubmitOrderRoute},
};

#[actix_web::test]
async fn fetch_my_orders_no_credential() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/myOrders/a@x.com", configure_my_orders).await.expect_err("Expected error");
    assert_eq!(err, "No bearer credential was provided");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("a@x.com");
    let (status, body) = get_request(&token, "/myOrders/a@x.com", configure_my_orders).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn fetch_my_orders_invalid_sig() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token("a@x.com");
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    debug!("Calling /myOrders with tampered token {token}");
    let err = get_request(&token, "/myOrders/a@x.com", configure_my_orders).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error. Access token signature is invalid."), "Unexpected error: {err}");
}

#[actix_web::test]
async fn try_fetch_another_users_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("a@x.com");
    let (status, body) = get_request(&token, "/myOrders/b@x.com", configure_my_orders).await.expect("Request failed");
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"Insufficient Permissions. a@x.com may not act on records belonging to another user"}"#);
}

/// The auth mock carries no expectations at all: the self-match check is a pure string comparison, and any role
/// lookup would fail these tests.
fn configure_my_orders(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager
        .expect_fetch_orders_for_email()
        .withf(|email| email.as_str() == "a@x.com")
        .returning(|_| Ok(vec![unpaid_order(), paid_order()]));
    cfg.service(MyOrdersRoute::<MockAccountManager, MockAuthManager>::new())
        .app_data(web::Data::new(AccountApi::new(account_manager)))
        .app_data(web::Data::new(AuthApi::new(MockAuthManager::new())));
}

#[actix_web::test]
async fn payment_view_returns_the_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("anyone@x.com");
    let (status, body) =
        get_request(&token, "/myOrders/payment/1", configure_payment_view).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, UNPAID_ORDER_JSON);
}

#[actix_web::test]
async fn payment_view_requires_a_credential() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/myOrders/payment/1", configure_payment_view).await.expect_err("Expected error");
    assert_eq!(err, "No bearer credential was provided");
}

#[actix_web::test]
async fn payment_view_for_unknown_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("anyone@x.com");
    let (status, body) =
        get_request(&token, "/myOrders/payment/42", configure_payment_view).await.expect("Request failed");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. Order #42"}"#);
}

fn configure_payment_view(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_order_by_id().returning(|id| Ok((id == 1).then(unpaid_order)));
    cfg.service(OrderForPaymentRoute::<MockAccountManager>::new())
        .app_data(web::Data::new(AccountApi::new(account_manager)));
}

#[actix_web::test]
async fn settling_an_order_marks_it_paid() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("a@x.com");
    let body = json!({"email": "a@x.com", "transactionId": "txn_9", "price": 19.99, "last4": "4242"});
    let (status, body) =
        patch_request(&token, "/myOrders/1", body, configure_settlement).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, SETTLED_ORDER_JSON);
}

#[actix_web::test]
async fn settling_requires_a_credential() {
    let _ = env_logger::try_init().ok();
    let body = json!({"email": "a@x.com", "transactionId": "txn_9", "price": 19.99});
    let err = patch_request("", "/myOrders/1", body, configure_settlement).await.expect_err("Expected error");
    assert_eq!(err, "No bearer credential was provided");
}

#[actix_web::test]
async fn settling_twice_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("a@x.com");
    let body = json!({"email": "a@x.com", "transactionId": "txn_10", "price": 19.99});
    let (status, body) =
        patch_request(&token, "/myOrders/7", body, configure_settlement).await.expect("Request failed");
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"Order #7 has already been settled"}"#);
}

fn configure_settlement(cfg: &mut ServiceConfig) {
    let mut order_flow = MockOrderFlowManager::new();
    order_flow
        .expect_settle_order()
        .withf(|id, payment| {
            [1, 7].contains(id) && payment.txid.starts_with("txn_") && payment.amount == UsdCents::from(1999)
        })
        .returning(|id, _| match id {
            1 => Ok(settled_order()),
            id => Err(OrderFlowError::OrderAlreadySettled(id)),
        });
    cfg.service(SettleOrderRoute::<MockOrderFlowManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(order_flow)));
}

#[actix_web::test]
async fn checkout_submission_is_open() {
    let _ = env_logger::try_init().ok();
    let body = json!({"email": "a@x.com", "part": "Brake pads", "quantity": 2, "price": 19.99});
    let (status, body) = post_request("", "/myOrders", body, configure_checkout).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, UNPAID_ORDER_JSON);
}

fn configure_checkout(cfg: &mut ServiceConfig) {
    let mut order_flow = MockOrderFlowManager::new();
    order_flow
        .expect_insert_order()
        .withf(|order| {
            order.email.as_str() == "a@x.com" && order.quantity == 2 && order.total_price == UsdCents::from(1999)
        })
        .returning(|_| Ok(unpaid_order()));
    cfg.service(SubmitOrderRoute::<MockOrderFlowManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(order_flow)));
}

#[actix_web::test]
async fn purchase_view_is_open() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/purchase/1", configure_purchase).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, UNPAID_ORDER_JSON);
}

fn configure_purchase(cfg: &mut ServiceConfig) {
    let mut account_manager = MockAccountManager::new();
    account_manager.expect_fetch_order_by_id().returning(|id| Ok((id == 1).then(unpaid_order)));
    cfg.service(PurchaseRoute::<MockAccountManager>::new())
        .app_data(web::Data::new(AccountApi::new(account_manager)));
}

#[actix_web::test]
async fn deleting_an_order_reports_the_outcome() {
    let _ = env_logger::try_init().ok();
    let (status, body) = delete_request("", "/myOrders/1", configure_deletion).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"deleted":true}"#);

    let (status, body) = delete_request("", "/myOrders/42", configure_deletion).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"deleted":false}"#);
}

fn configure_deletion(cfg: &mut ServiceConfig) {
    let mut order_flow = MockOrderFlowManager::new();
    order_flow.expect_delete_order().returning(|id| Ok(id == 1));
    cfg.service(DeleteOrderRoute::<MockOrderFlowManager>::new())
        .app_data(web::Data::new(OrderFlowApi::new(order_flow)));
}

// Mock order fixtures and their exact wire shapes

fn unpaid_order() -> Order {
    Order {
        id: 1,
        email: EmailAddress::new("a@x.com"),
        part: "Brake pads".to_string(),
        quantity: 2,
        total_price: UsdCents::from(1999),
        delivery_address: None,
        phone: None,
        paid: false,
        transaction_id: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn paid_order() -> Order {
    Order {
        id: 2,
        email: EmailAddress::new("a@x.com"),
        part: "Stator".to_string(),
        quantity: 1,
        total_price: UsdCents::from(12_000),
        delivery_address: None,
        phone: None,
        paid: true,
        transaction_id: Some("txn_1".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 16, 11, 20, 0).unwrap(),
    }
}

fn settled_order() -> Order {
    Order {
        paid: true,
        transaction_id: Some("txn_9".to_string()),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ..unpaid_order()
    }
}

const UNPAID_ORDER_JSON: &str = r#"{"id":1,"email":"a@x.com","part":"Brake pads","quantity":2,"total_price":1999,"delivery_address":null,"phone":null,"paid":false,"transaction_id":null,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z"}"#;

const SETTLED_ORDER_JSON: &str = r#"{"id":1,"email":"a@x.com","part":"Brake pads","quantity":2,"total_price":1999,"delivery_address":null,"phone":null,"paid":true,"transaction_id":"txn_9","created_at":"2024-02-29T13:30:00Z","updated_at":"2024-03-01T09:00:00Z"}"#;

const ORDERS_JSON: &str = r#"{"email":"a@x.com","total_orders":13999,"orders":[{"id":1,"email":"a@x.com","part":"Brake pads","quantity":2,"total_price":1999,"delivery_address":null,"phone":null,"paid":false,"transaction_id":null,"created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z"},{"id":2,"email":"a@x.com","part":"Stator","quantity":1,"total_price":12000,"delivery_address":null,"phone":null,"paid":true,"transaction_id":"txn_1","created_at":"2024-03-15T18:30:00Z","updated_at":"2024-03-16T11:20:00Z"}]}"#;
