use reqwest::StatusCode;

/// Errors returned by the forecast and warning clients.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse forecast XML: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("failed to parse warning JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("invalid warning region '{0}': expected letters, digits or '_'")]
    InvalidRegion(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
