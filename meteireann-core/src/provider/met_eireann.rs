use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{
    config::{Config, DEFAULT_TIMEOUT_SECS, FORECAST_API_URL, WARNING_API_URL},
    error::{Error, Result},
    forecast::Forecast,
    model::{Coordinates, Region, Warning},
    warning::parse_warnings,
};

use super::WeatherProvider;

/// HTTP client for the forecast and warning services.
///
/// Dropping the provider releases its connection pool. A client passed in
/// with [`MetEireannProvider::with_http_client`] is shared, so the caller's
/// handle stays usable.
#[derive(Debug, Clone)]
pub struct MetEireannProvider {
    http: Client,
    location: Coordinates,
    region: Region,
    forecast_url: String,
    warning_url: String,
    timeout: Duration,
}

impl MetEireannProvider {
    pub fn new(location: Coordinates) -> Self {
        Self {
            http: Client::new(),
            location,
            region: Region::default(),
            forecast_url: FORECAST_API_URL.to_string(),
            warning_url: WARNING_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let location = config.location();
        location.validate()?;

        Ok(Self::new(location)
            .with_region(config.region())
            .with_forecast_url(config.forecast_url())
            .with_warning_url(config.warning_url())
            .with_timeout(config.timeout()))
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn with_forecast_url(mut self, url: impl Into<String>) -> Self {
        self.forecast_url = url.into();
        self
    }

    pub fn with_warning_url(mut self, url: impl Into<String>) -> Self {
        self.warning_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn location(&self) -> Coordinates {
        self.location
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// The service separates query parameters with `;`, so the query string
    /// is built by hand.
    pub fn forecast_request_url(&self) -> String {
        let Coordinates {
            latitude,
            longitude,
            altitude,
        } = self.location;
        format!("{}?lat={latitude};long={longitude};alt={altitude}", self.forecast_url)
    }

    pub fn warning_request_url(&self) -> String {
        format!("{}{}.json", self.warning_url, self.region)
    }

    async fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "requesting");

        let res = self.http.get(url).timeout(self.timeout).send().await.map_err(|source| {
            tracing::error!(url, error = %source, "request failed");
            Error::Http { url: url.to_string(), source }
        })?;

        let status = res.status();
        if status.as_u16() >= 400 {
            tracing::error!(url, %status, "request returned an error status");
            let body = res.text().await.unwrap_or_default();
            return Err(Error::Status {
                url: url.to_string(),
                status,
                body: truncate_body(&body),
            });
        }

        res.text().await.map_err(|source| {
            tracing::error!(url, error = %source, "failed to read response body");
            Error::Http { url: url.to_string(), source }
        })
    }
}

#[async_trait]
impl WeatherProvider for MetEireannProvider {
    async fn fetch_forecast(&self) -> Result<Forecast> {
        let url = self.forecast_request_url();
        let body = self.get_text(&url).await?;

        Forecast::from_xml(&body).inspect_err(|err| {
            tracing::error!(url = %url, error = %err, "failed to parse forecast");
        })
    }

    async fn fetch_warnings(&self) -> Result<Vec<Warning>> {
        let url = self.warning_request_url();
        let body = self.get_text(&url).await?;

        parse_warnings(&body).inspect_err(|err| {
            tracing::error!(url = %url, error = %err, "failed to parse warnings");
        })
    }
}

/// Keeps at most 200 bytes, cut back to a char boundary.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    /// Answers a single request with `response` and returns the base URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}")
    }

    fn provider_for(base: &str) -> MetEireannProvider {
        MetEireannProvider::new(Coordinates::default())
            .with_forecast_url(format!("{base}/locationforecast"))
            .with_warning_url(format!("{base}/warning_"))
            .with_timeout(Duration::from_secs(5))
    }

    #[test]
    fn forecast_url_uses_semicolon_separated_query() {
        let location = Coordinates::new(53.35, -6.26, 10).expect("valid");
        let provider = MetEireannProvider::new(location);

        assert_eq!(
            provider.forecast_request_url(),
            "http://metwdb-openaccess.ichec.ie/metno-wdb2ts/locationforecast?lat=53.35;long=-6.26;alt=10"
        );
    }

    #[test]
    fn warning_url_appends_region() {
        let provider = MetEireannProvider::new(Coordinates::default());
        assert_eq!(
            provider.warning_request_url(),
            "https://www.met.ie/Open_Data/json/warning_IRELAND.json"
        );

        let provider = provider
            .with_region("ei07".parse().expect("valid region"))
            .with_warning_url("http://localhost:8080/warning_");
        assert_eq!(provider.warning_request_url(), "http://localhost:8080/warning_EI07.json");
    }

    #[test]
    fn from_config_applies_overrides() {
        let cfg = Config {
            forecast_url: Some("http://localhost/forecast".into()),
            timeout_secs: Some(2),
            ..Config::default()
        };

        let provider = MetEireannProvider::from_config(&cfg).expect("valid config");
        assert!(
            provider
                .forecast_request_url()
                .starts_with("http://localhost/forecast?lat=54.7210798611;")
        );
        assert_eq!(provider.timeout, Duration::from_secs(2));
        assert_eq!(provider.region().as_str(), "IRELAND");
    }

    #[test]
    fn truncate_body_keeps_at_most_200_bytes() {
        let short = "Service Unavailable";
        assert_eq!(truncate_body(short), short);

        let ascii = "x".repeat(300);
        assert_eq!(truncate_body(&ascii).len(), 203);

        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.len(), 203);
        assert_eq!(truncated.chars().count(), 103);

        // Byte 200 falls inside a two-byte char here.
        let offset = format!("a{}", "é".repeat(150));
        assert_eq!(truncate_body(&offset).len(), 199 + 3);
    }

    #[tokio::test]
    async fn unreachable_host_is_an_http_error() {
        let provider = MetEireannProvider::new(Coordinates::default())
            .with_forecast_url("http://127.0.0.1:9/locationforecast")
            .with_timeout(Duration::from_secs(2));

        let err = provider.fetch_forecast().await.unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let base = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 4\r\nConnection: close\r\n\r\ndown",
        )
        .await;

        let err = provider_for(&base).fetch_forecast().await.unwrap_err();
        match err {
            Error::Status { status, body, .. } => {
                assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "down");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn junk_forecast_body_is_an_xml_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: 4\r\nConnection: close\r\n\r\n<x/>",
        )
        .await;

        let err = provider_for(&base).fetch_forecast().await.unwrap_err();
        assert!(matches!(err, Error::Xml(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn junk_warning_body_is_a_json_error() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 8\r\nConnection: close\r\n\r\nnot json",
        )
        .await;

        let err = provider_for(&base).fetch_warnings().await.unwrap_err();
        assert!(matches!(err, Error::Json(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_warning_feed_is_fetched() {
        let base = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]",
        )
        .await;

        let warnings = provider_for(&base).fetch_warnings().await.expect("should fetch");
        assert!(warnings.is_empty());
    }
}
