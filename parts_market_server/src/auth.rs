use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use futures::future::{ready, Ready};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    Token,
    UntrustedToken,
};
use log::debug;
use parts_market_engine::db_types::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError, errors::ServerError};

/// The claims carried by an access token. The email is the only assertion the token makes; roles are looked up
/// fresh on every privileged request, so a promotion or demotion takes effect without re-issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub email: EmailAddress,
}

/// Signs and verifies access tokens with the process-wide HMAC secret.
///
/// Tokens are stateless: nothing is stored server-side, and by design they carry no expiry claim, so a token stays
/// valid for as long as the signing secret does.
#[derive(Clone)]
pub struct TokenService {
    key: Hs256Key,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let key = Hs256Key::new(config.jwt_secret.reveal().as_bytes());
        Self { key }
    }

    /// Issue a new access token asserting the given email.
    ///
    /// This method DOES NOT check that the caller is entitled to the email. That must be done (or deliberately
    /// skipped, as the login flow does) before calling `issue`.
    pub fn issue(&self, email: &EmailAddress) -> Result<String, AuthError> {
        let header = Header::empty().with_token_type("JWT");
        let claims = Claims::new(JwtClaims { email: email.clone() });
        Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::TokenCreation(format!("{e}")))
    }

    /// Checks the signature on a presented token and returns its claims.
    ///
    /// Verification is pure: no store lookup happens here, and no claim from an unverifiable token is ever
    /// returned to the caller.
    pub fn verify<S: AsRef<str>>(&self, token: S) -> Result<JwtClaims, AuthError> {
        let untrusted_token =
            UntrustedToken::new(token.as_ref()).map_err(|e| AuthError::PoorlyFormattedToken(format!("{e:?}")))?;
        let token: Token<JwtClaims> = Hs256
            .validator(&self.key)
            .validate(&untrusted_token)
            .map_err(|e| AuthError::ValidationError(format!("{e}")))?;
        let (header, claims) = token.into_parts();
        debug!("Access token validated successfully. Header: {header:?}. Claims: {claims:?}");
        Ok(claims.custom)
    }
}

/// Handlers receive the verified claims as an extractor. The access gate middleware is responsible for putting
/// them into the request extensions; a route that takes `JwtClaims` without being wrapped by the gate is a bug
/// and fails closed here.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        ready(claims.ok_or(ServerError::MissingCredential))
    }
}
