use std::env;

use log::*;
use pms_common::Secret;
use stripe_tools::StripeConfig;

use crate::errors::ServerError;

const DEFAULT_PMS_HOST: &str = "127.0.0.1";
const DEFAULT_PMS_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub stripe: StripeConfig,
}

impl ServerConfig {
    /// Loads the full server configuration from the environment.
    ///
    /// Host and port fall back to sensible defaults; the database URL and the two secrets (token signing key and
    /// payment processor key) are required, and a missing one aborts startup rather than limping along with a
    /// value that would silently invalidate every issued token or payment call.
    pub fn try_from_env() -> Result<Self, ServerError> {
        let host = env::var("PMS_HOST").ok().unwrap_or_else(|| DEFAULT_PMS_HOST.into());
        let port = env::var("PMS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PMS_PORT. {e} Using the default, {DEFAULT_PMS_PORT}, instead."
                    );
                    DEFAULT_PMS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PMS_PORT);
        let database_url = env::var("PMS_DATABASE_URL")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [PMS_DATABASE_URL]")))?;
        let auth = AuthConfig::try_from_env()?;
        let stripe = StripeConfig::try_from_env().map_err(|e| ServerError::ConfigurationError(e.to_string()))?;
        Ok(Self { host, port, database_url, auth, stripe })
    }
}

//-------------------------------------------------  AuthConfig  ------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The secret used to sign and verify access tokens. Loaded once at startup and never rotated during a run.
    pub jwt_secret: Secret<String>,
}

impl AuthConfig {
    pub fn try_from_env() -> Result<Self, ServerError> {
        let jwt_secret =
            env::var("PMS_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [PMS_JWT_SECRET]")))?;
        if jwt_secret.is_empty() {
            return Err(ServerError::ConfigurationError("PMS_JWT_SECRET must not be empty".to_string()));
        }
        Ok(Self { jwt_secret: Secret::new(jwt_secret) })
    }
}
