use std::sync::{Arc, Mutex};
use std::time::Duration;

use ratewatch::core::{
    CurrencyPair, RateSource, RateWatcher, WatchOutcome, WatchSettings, WatchStatus,
    outcome_callback,
};
use ratewatch::providers::YahooRateSource;
use rust_decimal::Decimal;
use tracing::{error, info};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn rate_body(rate: &str) -> String {
        format!(r#"{{"chart": {{"result": [{{"meta": {{"regularMarketPrice": {rate}}}}}]}}}}"#)
    }

    pub async fn create_mock_server(symbol: &str, rate: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v8/finance/chart/{symbol}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(rate_body(rate)))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(base_url: &str, extra: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
pair:
  from: "USD"
  to: "RUB"
providers:
  yahoo:
    base_url: {base_url}
    retries: 0
{extra}
"#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_watch_command_succeeds_when_target_already_crossed() {
    let mock_server = test_utils::create_mock_server("USDRUB=X", "64.5").await;
    let config_file = test_utils::write_config(&mock_server.uri(), "");

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Watch {
            start_rate: "70.00".to_string(),
            target_rate: "65.00".to_string(),
            overrides: ratewatch::Overrides::default(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Watch failed with: {:?}", result.err());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_watch_command_gives_up_after_max_attempts() {
    let mock_server = test_utils::create_mock_server("USDRUB=X", "72.10").await;
    let config_file = test_utils::write_config(
        &mock_server.uri(),
        "watch:\n  interval_ms: 10\n  max_attempts: 3\n",
    );

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Watch {
            start_rate: "70".to_string(),
            target_rate: "75".to_string(),
            overrides: ratewatch::Overrides::default(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Watch failed with: {:?}", result.err());

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[test_log::test(tokio::test)]
async fn test_watch_command_rejects_malformed_rate() {
    let mock_server = test_utils::create_mock_server("USDRUB=X", "64").await;
    let config_file = test_utils::write_config(&mock_server.uri(), "");

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Watch {
            start_rate: "seventy".to_string(),
            target_rate: "65".to_string(),
            overrides: ratewatch::Overrides::default(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("malformed start rate should fail");
    assert!(err.to_string().contains("Invalid start rate 'seventy'"));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn test_rate_command_uses_pair_override() {
    let mock_server = test_utils::create_mock_server("EURUSD=X", "1.0842").await;
    let config_file = test_utils::write_config(&mock_server.uri(), "");

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Rate {
            overrides: ratewatch::Overrides {
                from: Some("EUR".to_string()),
                to: Some("USD".to_string()),
                ..Default::default()
            },
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Rate failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("config.yaml");

    let result = ratewatch::run_command(
        ratewatch::AppCommand::Rate {
            overrides: ratewatch::Overrides::default(),
        },
        Some(missing.to_str().unwrap()),
    )
    .await;
    assert!(
        result
            .unwrap_err()
            .to_string()
            .starts_with("Failed to read config file")
    );
}

#[test_log::test(tokio::test)]
async fn test_watcher_recovers_from_server_errors() {
    use wiremock::matchers::{method, path};

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/USDRUB=X"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/USDRUB=X"))
        .respond_with(ResponseTemplate::new(200).set_body_string(test_utils::rate_body("64")))
        .mount(&mock_server)
        .await;

    let source: Arc<dyn RateSource> =
        Arc::new(YahooRateSource::new(&mock_server.uri(), CurrencyPair::default()).unwrap());
    let outcomes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&outcomes);
    let watcher = RateWatcher::new(
        source,
        outcome_callback(move |outcome| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(outcome);
            }
        }),
    )
    .with_settings(WatchSettings {
        interval: Duration::from_millis(10),
        max_attempts: 10,
    });

    watcher.start("70.00", "65.00").unwrap();
    watcher.wait().await;

    let outcomes = outcomes.lock().unwrap();
    assert_eq!(outcomes.len(), 1);
    match &outcomes[0] {
        WatchOutcome::Succeeded { rate, attempts, .. } => {
            assert_eq!(*rate, Decimal::from(64));
            assert_eq!(*attempts, 4);
        }
        other => panic!("Expected success, got {other:?}"),
    }
    assert_eq!(watcher.status(), WatchStatus::Succeeded);
}

#[test_log::test(tokio::test)]
#[ignore = "requires network access to Yahoo Finance"]
async fn test_real_yahoo_currency_api() {
    let pair = CurrencyPair::new("USD", "EUR");
    let provider = YahooRateSource::new("https://query1.finance.yahoo.com", pair.clone()).unwrap();

    info!(%pair, "Fetching currency rate from Yahoo Finance");

    match provider.fetch_rate().await {
        Ok(rate) => {
            info!(%rate, "Received successful currency rate response");
            assert!(rate > Decimal::ZERO, "Currency rate should be positive");
        }
        Err(e) => {
            error!("Currency rate API request failed: {e}\n{e:?}");
            panic!("Currency rate API request failed: {e}");
        }
    }
}
