use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use parts_market_engine::{AccountApi, AuthApi, OrderFlowApi, SqliteDatabase};
use stripe_tools::StripeApi;

use crate::{
    auth::TokenService,
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        AdminCheckRoute,
        CreatePaymentIntentRoute,
        DeleteOrderRoute,
        LoginRoute,
        MyOrdersRoute,
        MyProfileRoute,
        OrderForPaymentRoute,
        PromoteToAdminRoute,
        PurchaseRoute,
        SettleOrderRoute,
        SubmitOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    Ok(srv.await?)
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let stripe = StripeApi::new(config.stripe).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let auth_api = AuthApi::new(db.clone());
        let accounts_api = AccountApi::new(db.clone());
        let tokens = TokenService::new(&config.auth);
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pms::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(accounts_api))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(tokens))
            .app_data(web::Data::new(stripe.clone()))
            .service(health)
            // Identity. Login is open; profile, admin check and promotion carry the access gate themselves.
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(MyProfileRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(AdminCheckRoute::<SqliteDatabase>::new())
            .service(PromoteToAdminRoute::<SqliteDatabase>::new())
            // Payments
            .service(CreatePaymentIntentRoute::new())
            // Orders. Checkout submission, the purchase view and deletion are open by design.
            .service(SubmitOrderRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase, SqliteDatabase>::new())
            .service(OrderForPaymentRoute::<SqliteDatabase>::new())
            .service(SettleOrderRoute::<SqliteDatabase>::new())
            .service(DeleteOrderRoute::<SqliteDatabase>::new())
            .service(PurchaseRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
