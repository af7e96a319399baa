//! Access gate middleware for the parts marketplace server.
//! This middleware can be placed on any route or service.
//!
//! It requires the incoming request to carry a bearer token in the `Authorization` header and hands the token to
//! the [`TokenService`](crate::auth::TokenService) for signature verification. A request with no credential is
//! answered with 401; a credential that does not verify is answered with 403. On success the verified claims are
//! attached to the request extensions for handlers and the role authorizer to use. No role check happens here.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorInternalServerError,
    http::header,
    web,
    Error,
    HttpMessage,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::warn;

use crate::{
    auth::TokenService,
    errors::{AuthError, ServerError},
};

pub struct AccessGateFactory;

impl AccessGateFactory {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        AccessGateFactory
    }
}

impl<S, B> Transform<S, ServiceRequest> for AccessGateFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AccessGateService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AccessGateService { service: Rc::new(service) })
    }
}

pub struct AccessGateService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AccessGateService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let tokens = req
                .app_data::<web::Data<TokenService>>()
                .ok_or_else(|| {
                    warn!("No token service found in app data");
                    ErrorInternalServerError("No token service found in app data")
                })?
                .clone();
            let header = req.headers().get(header::AUTHORIZATION).ok_or(ServerError::MissingCredential)?;
            let header = header.to_str().map_err(|e| {
                ServerError::AuthenticationError(AuthError::PoorlyFormattedToken(e.to_string()))
            })?;
            // The credential is the second word of the header: `Bearer <token>`
            let token = header.split_whitespace().nth(1).ok_or_else(|| {
                ServerError::AuthenticationError(AuthError::PoorlyFormattedToken(
                    "expected 'Bearer <token>'".to_string(),
                ))
            })?;
            let claims = tokens.verify(token).map_err(ServerError::AuthenticationError)?;
            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}
