use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{EtlError, Result};
use crate::models::{Config, BASE_CURRENCY, TARGET_CURRENCIES};

use super::{RateMap, RateProvider};

const SUCCESS: &str = "success";

/// Body of `GET {endpoint}/{key}/latest/{base}`
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    #[serde(default)]
    conversion_rates: HashMap<String, f64>,
}

/// ExchangeRate-API client for the latest USD spot rates
pub struct ExchangeRateClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ExchangeRateClient {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_endpoint(&config.rates_endpoint, &config.api_key)
    }

    pub fn with_endpoint(endpoint: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("actuarial-etl/1.0")
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// `{endpoint}/{api_key}/latest/USD`
    pub fn latest_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)?;
        url.path_segments_mut()
            .map_err(|_| EtlError::Config(format!("invalid rates endpoint: {}", self.endpoint)))?
            .pop_if_empty()
            .extend([self.api_key.as_str(), "latest", BASE_CURRENCY]);
        Ok(url)
    }

    /// Request and parse the latest rates, keeping only the target currencies
    pub async fn request_rates(&self) -> Result<Option<RateMap>> {
        let url = self.latest_url()?;
        debug!(
            "Making request to: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let data: LatestRatesResponse = serde_json::from_str(&body)?;

        if data.result != SUCCESS {
            warn!(
                "Exchange rate API returned result '{}' ({})",
                data.result,
                data.error_type.as_deref().unwrap_or("no error type")
            );
            return Ok(None);
        }

        match select_target_rates(&data.conversion_rates) {
            Ok(rates) => {
                info!("Retrieved {} exchange rates against {}", rates.len(), BASE_CURRENCY);
                Ok(Some(rates))
            }
            Err(missing) => {
                warn!("Exchange rate response is missing currencies: {:?}", missing);
                Ok(None)
            }
        }
    }
}

#[async_trait::async_trait]
impl RateProvider for ExchangeRateClient {
    async fn fetch_exchange_rates(&self) -> Option<RateMap> {
        match self.request_rates().await {
            Ok(rates) => rates,
            Err(EtlError::Http(e)) => {
                error!("Error fetching exchange rates: {}", e);
                None
            }
            Err(EtlError::Json(e)) => {
                error!("Error parsing the response: {}", e);
                None
            }
            Err(e) => {
                error!("Error: {}", e);
                None
            }
        }
    }
}

/// Keep exactly the allow-listed currencies; `Err` lists the ones absent
pub fn select_target_rates(
    rates: &HashMap<String, f64>,
) -> std::result::Result<RateMap, Vec<String>> {
    let mut selected = RateMap::new();
    let mut missing = Vec::new();

    for code in TARGET_CURRENCIES {
        match rates.get(code) {
            Some(rate) => {
                selected.insert(code.to_string(), *rate);
            }
            None => missing.push(code.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(selected)
    } else {
        Err(missing)
    }
}
