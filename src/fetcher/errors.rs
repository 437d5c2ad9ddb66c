use thiserror::Error;

/// Why a page could not be turned into markup.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("could not build http client: {0}")]
    Client(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("connect timeout")]
    ConnectTimeout,

    #[error("request timeout")]
    RequestTimeout,

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("http error {status}")]
    Http {
        status: reqwest::StatusCode,
        transient: bool,
    },

    #[error("body too large ({0} bytes)")]
    BodyTooLarge(u64),

    #[error("unsupported content-type: {0}")]
    UnsupportedContentType(String),

    #[error("reading body failed: {0}")]
    Body(String),
}

impl FetchError {
    /// Whether the next cycle has a fair chance of succeeding where this
    /// attempt failed. Only used to grade log output; nothing retries early.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { transient, .. } => *transient,
            Self::InvalidUrl(_)
            | Self::Client(_)
            | Self::BodyTooLarge(_)
            | Self::UnsupportedContentType(_) => false,
            Self::Connect(_)
            | Self::ConnectTimeout
            | Self::RequestTimeout
            | Self::TooManyRedirects
            | Self::Body(_) => true,
        }
    }

    pub fn from_reqwest_error(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            if err.is_connect() {
                Self::ConnectTimeout
            } else {
                Self::RequestTimeout
            }
        } else if err.is_redirect() {
            Self::TooManyRedirects
        } else if err.is_builder() {
            Self::Client(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::Body(err.without_url().to_string())
        } else {
            // refused, reset, dns and everything else on the way to a response
            Self::Connect(err.without_url().to_string())
        }
    }
}
