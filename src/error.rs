use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Unknown scale variant, malformed configuration or mixed-type input.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cannot compute a domain from an empty dataset")]
    EmptyDomain,

    /// Value or domain outside what a scale can represent.
    #[error("domain error: {0}")]
    Domain(String),

    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Failure reported by host code (listener, renderable or frame callback).
    #[error("handler failed: {0}")]
    Handler(String),
}

impl ChartError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn domain(message: impl Into<String>) -> Self {
        Self::Domain(message.into())
    }
}

impl From<serde_json::Error> for ChartError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
