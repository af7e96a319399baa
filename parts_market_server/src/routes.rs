//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions, which get executed
//! concurrently by the worker threads.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use parts_market_engine::{
    db_types::{EmailAddress, NewOrder, NewPayment},
    traits::{AccountManagement, AuthManagement, OrderFlowDatabase},
    AccountApi,
    AuthApi,
    OrderFlowApi,
};
use pms_common::UsdCents;
use serde_json::Value;
use stripe_tools::{NewPaymentIntent, StripeApi, StripeApiError};

use crate::{
    auth::{JwtClaims, TokenService},
    authorizer::AccessPolicy,
    data_objects::{
        AdminCheckResult,
        DeleteResult,
        LoginResult,
        OrderRequest,
        PaymentIntentRequest,
        PaymentIntentResult,
        PaymentRequest,
        PromotionResult,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal gated) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AccessGateFactory::new());
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where gated)  => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>)
                    .wrap($crate::middleware::AccessGateFactory::new());
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Identity  ----------------------------------------------------

route!(login => Put "/user/{email}" impl AuthManagement);
/// Route handler for the login endpoint.
///
/// Logging in and registering are the same operation: the profile document in the body is stored against the path
/// email, creating the account if this is the first visit and overwriting it otherwise. The response carries the
/// store outcome together with a freshly signed access token for the email.
///
/// There is no password or other proof of ownership here; presenting an email is enough to be issued a token for
/// it. The token is what every protected endpoint checks afterwards.
pub async fn login<A: AuthManagement>(
    path: web::Path<EmailAddress>,
    body: web::Json<Value>,
    api: web::Data<AuthApi<A>>,
    tokens: web::Data<TokenService>,
) -> Result<HttpResponse, ServerError> {
    let email = path.into_inner();
    debug!("💻️ PUT login for {email}");
    let result = api.upsert_account(&email, &body).await?;
    let token = tokens.issue(&email)?;
    Ok(HttpResponse::Ok().json(LoginResult { result, token }))
}

route!(my_profile => Get "/user/{email}" impl AccountManagement, AuthManagement where gated);
/// Route handler for the profile endpoint.
///
/// Users can only read their own profile: the path email must match the email asserted by the access token.
pub async fn my_profile<B: AccountManagement, A: AuthManagement>(
    claims: JwtClaims,
    path: web::Path<EmailAddress>,
    api: web::Data<AccountApi<B>>,
    auth_api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let email = path.into_inner();
    debug!("💻️ GET profile for {email}");
    AccessPolicy::SelfOnly { requested: &email }.enforce(&claims, auth_api.as_ref()).await?;
    let account = api
        .account_by_email(&email)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("No account for {email}")))?;
    Ok(HttpResponse::Ok().json(account))
}

route!(admin_check => Get "/admin/{email}" impl AuthManagement where gated);
/// Route handler for the admin check endpoint.
///
/// Any authenticated user may ask whether an email holds the admin role. The front-end uses this to decide whether
/// to show the admin dashboard; the actual admin-only operations verify the role again on their own.
pub async fn admin_check<A: AuthManagement>(
    claims: JwtClaims,
    path: web::Path<EmailAddress>,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let email = path.into_inner();
    debug!("💻️ GET admin check for {email}, asked by {}", claims.email);
    let admin = api.is_admin(&email).await?;
    Ok(HttpResponse::Ok().json(AdminCheckResult { admin }))
}

route!(promote_to_admin => Put "/user/admin/{email}" impl AuthManagement where gated);
/// Route handler for the admin promotion endpoint.
///
/// The requester must hold the admin role. The *target* email in the path is the record that gets the admin role,
/// created on the spot if it does not exist yet; the requester's own record is never touched.
pub async fn promote_to_admin<A: AuthManagement>(
    claims: JwtClaims,
    path: web::Path<EmailAddress>,
    api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let target = path.into_inner();
    debug!("💻️ PUT promote {target} to admin, requested by {}", claims.email);
    AccessPolicy::AdminOnly.enforce(&claims, api.as_ref()).await?;
    let result = api.promote_to_admin(&target).await?;
    info!("💻️ {} promoted {target} to admin", claims.email);
    Ok(HttpResponse::Ok().json(PromotionResult { result }))
}

//----------------------------------------------   Payments  ----------------------------------------------------

route!(create_payment_intent => Post "/create-payment-intent" gated);
/// Route handler for the payment intent endpoint.
///
/// The checkout page submits the displayed price and receives the client secret it needs to complete the charge
/// with the payment processor. The price is converted to cents on its decimal representation, so fractional cents
/// are dropped rather than rounded up. Any authenticated user may request an intent; no role check applies.
pub async fn create_payment_intent(
    claims: JwtClaims,
    body: web::Json<PaymentIntentRequest>,
    stripe: web::Data<StripeApi>,
) -> Result<HttpResponse, ServerError> {
    let amount = UsdCents::from_decimal_str(&body.price.to_string())
        .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    debug!("💻️ POST payment intent for {amount}, requested by {}", claims.email);
    let intent = stripe.create_payment_intent(NewPaymentIntent::card(amount)).await?;
    let client_secret = intent.client_secret.ok_or(StripeApiError::MissingClientSecret)?;
    Ok(HttpResponse::Ok().json(PaymentIntentResult { client_secret }))
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(submit_order => Post "/myOrders" impl OrderFlowDatabase);
/// Route handler for checkout submissions.
///
/// The order payload is taken at face value and stored unpaid. Checkout happens before login is required, so this
/// endpoint is open.
pub async fn submit_order<B: OrderFlowDatabase>(
    body: web::Json<OrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order = NewOrder::try_from(body.into_inner())?;
    debug!("💻️ POST new order from {} for {}", order.email, order.total_price);
    let order = api.submit_order(order).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(my_orders => Get "/myOrders/{email}" impl AccountManagement, AuthManagement where gated);
/// Route handler for the order history endpoint.
///
/// Users can only list their own orders: the path email must match the email asserted by the access token. The
/// response wraps the orders with their owner and summed value.
pub async fn my_orders<B: AccountManagement, A: AuthManagement>(
    claims: JwtClaims,
    path: web::Path<EmailAddress>,
    api: web::Data<AccountApi<B>>,
    auth_api: web::Data<AuthApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let email = path.into_inner();
    debug!("💻️ GET orders for {email}");
    AccessPolicy::SelfOnly { requested: &email }.enforce(&claims, auth_api.as_ref()).await?;
    let orders = api.orders_for_email(&email).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_for_payment => Get "/myOrders/payment/{id}" impl AccountManagement where gated);
/// Route handler for the payment confirmation view.
///
/// Returns the full order so the payment page can display what is being paid for. The order is looked up by id
/// alone; any authenticated user can fetch any order here.
pub async fn order_for_payment<B: AccountManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET order #{id} for payment view, requested by {}", claims.email);
    let order =
        api.order_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order #{id}")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(settle_order => Patch "/myOrders/{id}" impl OrderFlowDatabase where gated);
/// Route handler for payment reconciliation.
///
/// Once the payment processor confirms the charge, the checkout page reports it here. The order is marked paid
/// with the reported transaction id and the payment receipt is appended, atomically. Settling an order twice
/// answers with 409 and leaves both records as they were.
pub async fn settle_order<B: OrderFlowDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<PaymentRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let payment = NewPayment::try_from(body.into_inner())?;
    debug!("💻️ PATCH settle order #{id}, reported by {}", claims.email);
    let order = api.settle_order(id, payment).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(delete_order => Delete "/myOrders/{id}" impl OrderFlowDatabase);
/// Route handler for order deletion.
///
/// Deletes by id and reports whether a row was removed. There is no ownership check and no credential
/// requirement; the store-front calls this when a customer abandons an unpaid order.
pub async fn delete_order<B: OrderFlowDatabase>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ DELETE order #{id}");
    let deleted = api.delete_order(id).await?;
    Ok(HttpResponse::Ok().json(DeleteResult { deleted }))
}

route!(purchase => Get "/purchase/{id}" impl AccountManagement);
/// Route handler for the purchase view.
///
/// The store-front shows this page straight after checkout, before the customer has logged in, so the lookup is
/// open by design.
pub async fn purchase<B: AccountManagement>(
    path: web::Path<i64>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET purchase view for order #{id}");
    let order =
        api.order_by_id(id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order #{id}")))?;
    Ok(HttpResponse::Ok().json(order))
}
