use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
};
use serde::de::DeserializeOwned;

use crate::{config::StripeConfig, data_objects::NewPaymentIntent, PaymentIntent, StripeApiError};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val =
            HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    /// Sends a form-encoded request to the Stripe REST API and deserializes the JSON response. Stripe returns a
    /// non-2xx status with a JSON error document on failure; the body is surfaced verbatim in the error.
    pub async fn form_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, StripeApiError> {
        let url = self.url(path);
        trace!("Sending Stripe query: {url}");
        let req = self.client.request(method, url).form(params);
        let response = req.send().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("Stripe query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url)
    }

    /// Requests a new single-use payment intent and returns it. The `client_secret` field is what front-ends need to
    /// complete the charge; callers should treat the rest of the object as informational.
    pub async fn create_payment_intent(&self, intent: NewPaymentIntent) -> Result<PaymentIntent, StripeApiError> {
        debug!("Requesting payment intent for {}", intent.amount);
        let params = intent.to_form_params();
        let result = self.form_query::<PaymentIntent>(Method::POST, "/payment_intents", &params).await?;
        info!("Created payment intent {} for {}", result.id, intent.amount);
        Ok(result)
    }
}
