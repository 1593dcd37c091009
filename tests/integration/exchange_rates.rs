//! Exchange-rate API → rate table, against a mocked HTTP server

use actuarial_etl::api::{ExchangeRateClient, RateProvider};
use actuarial_etl::models::TARGET_CURRENCIES;
use actuarial_etl::pipeline::run_exchange_rate_pipeline;
use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::logging;

const LATEST_PATH: &str = "/test-key/latest/USD";

fn conversion_rates() -> Value {
    json!({
        "USD": 1.0,
        "AUD": 1.52,
        "CAD": 1.36,
        "CHF": 0.88,
        "CNY": 7.19,
        "EUR": 0.92,
        "GBP": 0.79,
        "HKD": 7.82,
        "JPY": 149.5,
        "NZD": 1.65,
        "SEK": 10.4,
        "BRL": 4.97
    })
}

async fn serve(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn client(server: &MockServer) -> ExchangeRateClient {
    ExchangeRateClient::with_endpoint(&server.uri(), "test-key").unwrap()
}

#[tokio::test]
async fn test_fetch_keeps_only_target_currencies() {
    logging::init_test_logging();
    logging::log_test_step("Fetching rates from a successful response");

    let server = serve(ResponseTemplate::new(200).set_body_json(json!({
        "result": "success",
        "base_code": "USD",
        "conversion_rates": conversion_rates(),
    })))
    .await;

    let rates = client(&server).fetch_exchange_rates().await.unwrap();
    logging::log_test_data("Rates", &rates);

    assert_eq!(rates.len(), 10);
    assert!(TARGET_CURRENCIES.iter().all(|code| rates.contains_key(*code)));
    assert!(!rates.contains_key("SEK"));
    assert_eq!(rates["JPY"], 149.5);
}

#[tokio::test]
async fn test_error_result_gives_no_rates() {
    let server = serve(ResponseTemplate::new(200).set_body_json(json!({
        "result": "error",
        "error-type": "invalid-key",
    })))
    .await;

    assert_eq!(client(&server).fetch_exchange_rates().await, None);
}

#[tokio::test]
async fn test_http_failure_gives_no_rates() {
    let server = serve(ResponseTemplate::new(500)).await;

    assert_eq!(client(&server).fetch_exchange_rates().await, None);
}

#[tokio::test]
async fn test_malformed_body_gives_no_rates() {
    let server = serve(ResponseTemplate::new(200).set_body_string("{not json")).await;

    assert_eq!(client(&server).fetch_exchange_rates().await, None);
}

#[tokio::test]
async fn test_missing_currency_gives_no_rates() {
    let mut rates = conversion_rates();
    rates.as_object_mut().unwrap().remove("NZD");
    let server = serve(ResponseTemplate::new(200).set_body_json(json!({
        "result": "success",
        "conversion_rates": rates,
    })))
    .await;

    assert_eq!(client(&server).fetch_exchange_rates().await, None);
}

#[tokio::test]
async fn test_rate_table_written_from_api() {
    logging::init_test_logging();
    logging::log_test_step("Writing the rate table from a mocked API");

    let server = serve(ResponseTemplate::new(200).set_body_json(json!({
        "result": "success",
        "conversion_rates": conversion_rates(),
    })))
    .await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("rates.xlsx");
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    let written = run_exchange_rate_pipeline(&client(&server), &output, date).await;
    assert_eq!(written, Some(10));

    let mut workbook: Xlsx<_> = open_workbook(&output).unwrap();
    let sheet = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&sheet).unwrap();
    let rows: Vec<_> = range.rows().collect();

    assert_eq!(rows.len(), 11);
    assert_eq!(rows[0][0], Data::String("Rate Type".to_string()));
    assert_eq!(rows[0][5], Data::String("Currency_To_Value".to_string()));
    for row in &rows[1..] {
        assert_eq!(row[0], Data::String("Spot rate".to_string()));
        assert_eq!(row[1], Data::String("2024-03-01".to_string()));
        assert_eq!(row[2], Data::String("USD".to_string()));
        assert_eq!(row[3], Data::Float(1.0));
    }
    assert_eq!(rows[1][4], Data::String("AUD".to_string()));
    assert_eq!(rows[1][5], Data::Float(1.52));
}

#[tokio::test]
async fn test_failed_fetch_leaves_no_file() {
    let server = serve(ResponseTemplate::new(503)).await;
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("rates.xlsx");
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    let written = run_exchange_rate_pipeline(&client(&server), &output, date).await;

    assert_eq!(written, None);
    assert!(!output.exists());
}
