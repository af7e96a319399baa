use pms_common::Secret;

use crate::StripeApiError;

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub api_url: String,
    pub secret_key: Secret<String>,
}

impl StripeConfig {
    pub fn new(api_url: String, secret_key: Secret<String>) -> Self {
        Self { api_url, secret_key }
    }

    /// Loads the Stripe configuration from the environment. The secret key is required; a missing key is an error
    /// rather than a silent default, since nothing useful can be done without it.
    pub fn try_from_env() -> Result<Self, StripeApiError> {
        let secret_key = std::env::var("PMS_STRIPE_SECRET_KEY")
            .map_err(|e| StripeApiError::Initialization(format!("{e} [PMS_STRIPE_SECRET_KEY]")))?;
        let api_url = std::env::var("PMS_STRIPE_API_URL").unwrap_or_else(|_| DEFAULT_STRIPE_API_URL.to_string());
        Ok(Self { api_url, secret_key: Secret::new(secret_key) })
    }
}
