//! HTTP implementation of the engine seam.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, TankError};

use super::{
    CostRequest, CostResponse, RecommendationEngine, RecommendationRequest, RecommendationResponse,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Engine client posting JSON to a configured endpoint.
///
/// Routes are fixed relative to the base URL: `/recommend-repairs` and
/// `/generate-costs`.
pub struct HttpEngine {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpEngine {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: None,
        })
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn post<Req: Serialize, Resp: DeserializeOwned>(&self, route: &str, body: &Req) -> Result<Resp> {
        let url = format!("{}/{route}", self.base_url);
        let mut request = self.client.post(&url).json(body);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().unwrap_or_default();
            return Err(TankError::Engine(format!(
                "engine returned {status} for {route}: {}",
                detail.trim()
            )));
        }
        Ok(response.json()?)
    }
}

impl RecommendationEngine for HttpEngine {
    fn recommend_repairs(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
        self.post("recommend-repairs", request)
    }

    fn generate_costs(&self, request: &CostRequest) -> Result<CostResponse> {
        self.post("generate-costs", request)
    }
}
