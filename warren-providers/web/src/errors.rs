use thiserror::Error;

/// Errors raised while constructing web providers. Runtime failures map to
/// the core's `FetchError`/`ResolutionError` instead.
#[derive(Debug, Error)]
pub enum WebProviderError {
    #[error("invalid base url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    ClientBuild(#[from] reqwest::Error),
    #[error("failed to compile extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}
