use thiserror::Error;

/// Failure talking to an upstream service (wiki APIs or a probed host).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("unexpected response shape from {context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// A paginated list query failed; earlier pages are discarded.
    #[error("query for '{property}' failed: {source}")]
    Query {
        property: String,
        #[source]
        source: Box<FetchError>,
    },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl FetchError {
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }

    pub fn parse(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    pub fn query(property: impl Into<String>, source: FetchError) -> Self {
        Self::Query {
            property: property.into(),
            source: Box::new(source),
        }
    }
}

pub type FetchResult<T> = std::result::Result<T, FetchError>;
