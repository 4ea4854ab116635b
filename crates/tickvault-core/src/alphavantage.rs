//! Alpha Vantage daily-series provider: URL construction and payload shapes.
//!
//! The provider keys its response by human-readable section names
//! (`"Meta Data"`, `"Time Series (Daily)"`) and prefixes every bar field
//! with an ordinal (`"1. open"`). Everything here exists to absorb that
//! shape at the edge so the rest of the pipeline never sees it.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::Symbol;
use crate::error::FetchError;
use crate::http_client::{HttpClient, HttpRequest, NoopHttpClient};

const BASE_URL: &str = "https://www.alphavantage.co/query";
const DAILY_FUNCTION: &str = "TIME_SERIES_DAILY_ADJUSTED";
const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

/// Top-level daily response. Captures all sections so the series container
/// can be located without committing to the rest of the document.
#[derive(Debug, Clone, Deserialize)]
pub struct DailySeriesResponse {
    #[serde(flatten)]
    sections: HashMap<String, Value>,
}

impl DailySeriesResponse {
    /// The day-keyed series object, or `None` when the payload carries no
    /// usable container (error documents, rate-limit notes, wrong shape).
    pub fn time_series(&self) -> Option<&Map<String, Value>> {
        self.sections.get(DAILY_SERIES_KEY).and_then(Value::as_object)
    }
}

/// One trading day as the provider encodes it. Only the three fields the
/// pipeline persists are decoded; the rest of the bar is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyBar {
    #[serde(rename = "1. open")]
    pub open: String,
    #[serde(rename = "4. close")]
    pub close: String,
    #[serde(rename = "6. volume")]
    pub volume: String,
}

/// Fetches one symbol's daily series as raw JSON.
#[derive(Clone)]
pub struct AlphaVantageClient {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
}

impl Default for AlphaVantageClient {
    fn default() -> Self {
        Self {
            http_client: Arc::new(NoopHttpClient),
            api_key: String::from("demo"),
        }
    }
}

impl AlphaVantageClient {
    pub fn new(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
        }
    }

    fn daily_series_url(&self, symbol: &Symbol) -> String {
        format!(
            "{BASE_URL}?function={DAILY_FUNCTION}&symbol={}&apikey={}",
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.api_key)
        )
    }

    /// Returns the response document with its sections intact. Interpreting
    /// the series (container lookup, per-day decoding) is deferred to
    /// normalization.
    pub async fn fetch_daily_series(
        &self,
        symbol: &Symbol,
    ) -> Result<DailySeriesResponse, FetchError> {
        let request = HttpRequest::get(self.daily_series_url(symbol));
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(FetchError::UpstreamStatus {
                status: response.status,
            });
        }

        Ok(serde_json::from_str(&response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::http_client::{HttpError, HttpResponse};

    struct RecordingHttpClient {
        response: HttpResponse,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn with_body(status: u16, body: &str) -> Self {
            Self {
                response: HttpResponse {
                    status,
                    body: body.to_owned(),
                },
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> std::pin::Pin<
            Box<dyn std::future::Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>,
        > {
            self.requests.lock().unwrap().push(request);
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    fn symbol(value: &str) -> Symbol {
        Symbol::new(value).unwrap()
    }

    #[tokio::test]
    async fn builds_daily_series_url_with_encoded_parameters() {
        let recorder = Arc::new(RecordingHttpClient::with_body(200, "{}"));
        let client = AlphaVantageClient::new(
            Arc::clone(&recorder) as Arc<dyn HttpClient>,
            "secret key",
        );

        client.fetch_daily_series(&symbol("BRK B")).await.unwrap();

        let urls = recorder.recorded_urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].starts_with("https://www.alphavantage.co/query?"));
        assert!(urls[0].contains("function=TIME_SERIES_DAILY_ADJUSTED"));
        assert!(urls[0].contains("symbol=BRK%20B"));
        assert!(urls[0].contains("apikey=secret%20key"));
    }

    #[tokio::test]
    async fn surfaces_upstream_status_failures() {
        let recorder = Arc::new(RecordingHttpClient::with_body(503, "unavailable"));
        let client = AlphaVantageClient::new(Arc::clone(&recorder) as Arc<dyn HttpClient>, "demo");

        let err = client
            .fetch_daily_series(&symbol("IBM"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, FetchError::UpstreamStatus { status: 503 }));
    }

    #[tokio::test]
    async fn rejects_non_json_bodies() {
        let recorder = Arc::new(RecordingHttpClient::with_body(200, "<html>oops</html>"));
        let client = AlphaVantageClient::new(Arc::clone(&recorder) as Arc<dyn HttpClient>, "demo");

        let err = client
            .fetch_daily_series(&symbol("IBM"))
            .await
            .expect_err("must fail");
        assert!(matches!(err, FetchError::Payload(_)));
    }

    #[test]
    fn extracts_daily_series_container() {
        let document = json!({
            "Meta Data": {"2. Symbol": "IBM"},
            "Time Series (Daily)": {
                "2024-01-02": {"1. open": "101", "4. close": "102", "6. volume": "900"},
            },
        });
        let response: DailySeriesResponse = serde_json::from_value(document).unwrap();

        let series = response.time_series().expect("container present");
        assert!(series.contains_key("2024-01-02"));
    }

    #[test]
    fn missing_or_malformed_container_yields_none() {
        let missing: DailySeriesResponse =
            serde_json::from_value(json!({"Note": "rate limited"})).unwrap();
        assert!(missing.time_series().is_none());

        let not_an_object: DailySeriesResponse =
            serde_json::from_value(json!({"Time Series (Daily)": "oops"})).unwrap();
        assert!(not_an_object.time_series().is_none());
    }

    #[test]
    fn decodes_bar_fields_and_ignores_extras() {
        let bar: DailyBar = serde_json::from_value(json!({
            "1. open": "100.50",
            "2. high": "103.00",
            "3. low": "99.10",
            "4. close": "101.25",
            "5. adjusted close": "101.25",
            "6. volume": "123456",
        }))
        .unwrap();

        assert_eq!(bar.open, "100.50");
        assert_eq!(bar.close, "101.25");
        assert_eq!(bar.volume, "123456");
    }

    #[test]
    fn bar_missing_required_field_fails_to_decode() {
        let result: Result<DailyBar, _> = serde_json::from_value(json!({
            "1. open": "100.50",
            "4. close": "101.25",
        }));
        assert!(result.is_err());
    }
}
