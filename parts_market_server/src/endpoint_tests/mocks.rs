use mockall::mock;
use parts_market_engine::{
    db_types::{EmailAddress, NewOrder, NewPayment, Order, Payment, Role, UpsertOutcome, UserAccount},
    traits::{
        AccountApiError,
        AccountManagement,
        AuthApiError,
        AuthManagement,
        OrderFlowDatabase,
        OrderFlowError,
    },
};
use serde_json::Value;

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn upsert_account(&self, email: &EmailAddress, profile: &Value) -> Result<UpsertOutcome, AuthApiError>;
        async fn fetch_role_for_email(&self, email: &EmailAddress) -> Result<Option<Role>, AuthApiError>;
        async fn grant_admin(&self, email: &EmailAddress) -> Result<UpsertOutcome, AuthApiError>;
    }
}

mock! {
    pub AccountManager {}
    impl AccountManagement for AccountManager {
        async fn fetch_account_by_email(&self, email: &EmailAddress) -> Result<Option<UserAccount>, AccountApiError>;
        async fn fetch_orders_for_email(&self, email: &EmailAddress) -> Result<Vec<Order>, AccountApiError>;
        async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, AccountApiError>;
        async fn fetch_payments_for_order(&self, order_id: i64) -> Result<Vec<Payment>, AccountApiError>;
    }
}

mock! {
    pub OrderFlowManager {}
    impl OrderFlowDatabase for OrderFlowManager {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderFlowError>;
        async fn settle_order(&self, order_id: i64, payment: NewPayment) -> Result<Order, OrderFlowError>;
        async fn delete_order(&self, order_id: i64) -> Result<bool, OrderFlowError>;
    }
}
