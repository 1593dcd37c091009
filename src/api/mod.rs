use std::collections::BTreeMap;

pub mod exchange_rate_client;
pub use exchange_rate_client::ExchangeRateClient;

/// Target currency code → units per one unit of the base currency
pub type RateMap = BTreeMap<String, f64>;

/// Source of spot exchange rates.
///
/// `None` means no usable rates this run; callers skip the dependent step and do
/// not retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RateProvider {
    async fn fetch_exchange_rates(&self) -> Option<RateMap>;
}
