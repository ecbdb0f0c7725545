use std::time::Duration;

use thiserror::Error;

/// Invalid instance configuration, detected before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value for {field}: {value:?} ({reason})")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("http request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    #[error("discovery backend rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("discovery backend did not respond within {0:?}")]
    Timeout(Duration),
}
