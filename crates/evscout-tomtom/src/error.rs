use thiserror::Error;

/// Errors returned by the TomTom batch-search client.
#[derive(Debug, Error)]
pub enum TomTomError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A base URL or provider-supplied location could not be parsed.
    #[error("invalid URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The batch submission came back with a status other than 200/202/303.
    /// Not retried; the upstream status and body are preserved for the caller.
    #[error("batch submission rejected with status {status}: {detail}")]
    SubmitRejected { status: u16, detail: String },

    /// The provider accepted the batch asynchronously (202/303) but the
    /// response carried no `Location` header to poll.
    #[error("batch accepted but response carried no poll location")]
    MissingPollLocation,

    /// A status poll returned a terminal non-success, non-processing status.
    #[error("batch polling failed with status {status}: {detail}")]
    PollFailed { status: u16, detail: String },

    /// A plain (non-batch) provider request returned a non-success status.
    /// The upstream status and body are preserved for the caller.
    #[error("unexpected HTTP status {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    /// Elapsed polling time exceeded the wait ceiling. The job handle is
    /// abandoned; no cancellation is sent to the provider.
    #[error("batch processing timed out after {waited_secs}s")]
    TimedOut { waited_secs: u64 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
