use thiserror::Error;

/// Failures crossing an external provider boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The client was constructed without a credential.
    #[error("missing credential for the {0} service")]
    MissingCredential(&'static str),

    /// Transport-level failure, including request timeouts.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The upstream answered 2xx but the body was not in the expected shape.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}
