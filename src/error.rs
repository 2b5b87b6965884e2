use std::path::PathBuf;

use thiserror::Error;

/// Filter criteria that cannot form a valid [`crate::filter::Filter`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("filter needs at least one type")]
    EmptyTypes,

    #[error("filter is missing field `{0}`")]
    MissingField(&'static str),

    #[error("`{0}` must be an array")]
    NotAnArray(&'static str),

    #[error("types[{index}] must be a string")]
    NonStringType { index: usize },

    #[error("`{field}` must have exactly 2 bounds, got {len}")]
    RangeArity { field: &'static str, len: usize },

    #[error("{field}[{index}] must be an integer")]
    NonIntegerBound { field: &'static str, index: usize },

    #[error("`{field}` is inverted: {low} > {high}")]
    InvertedRange {
        field: &'static str,
        low: i64,
        high: i64,
    },
}

/// An item record that does not have the shape the classifier expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} at `{path}`")]
pub struct MalformedDataError {
    pub path: String,
    pub expected: &'static str,
}

impl MalformedDataError {
    pub fn new(path: impl Into<String>, expected: &'static str) -> Self {
        Self {
            path: path.into(),
            expected,
        }
    }
}

/// Failures from the fetch layer. All of them are fatal to a run.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cache error at {}: {source}", .path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid filter: {0}")]
    Validation(#[from] ValidationError),

    #[error("malformed item data from {url}: {source}")]
    MalformedData {
        url: String,
        #[source]
        source: MalformedDataError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, Error>;
