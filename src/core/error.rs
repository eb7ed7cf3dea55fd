use thiserror::Error;

/// Failure talking to the RPC node.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("{method} transport failure: {message}")]
    Transport { method: &'static str, message: String },
    #[error("{method} returned HTTP {status}")]
    Status { method: &'static str, status: u16 },
    #[error("{method} rpc error {code}: {message}")]
    Rpc {
        method: &'static str,
        code: i64,
        message: String,
    },
    #[error("{method} response could not be decoded: {message}")]
    Decode { method: &'static str, message: String },
}

impl UpstreamError {
    pub fn transport(method: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            method,
            message: message.into(),
        }
    }

    pub fn decode(method: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            method,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("invalid wallet address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("fetching {signature} failed after {attempts} attempts")]
    ExhaustedRetries {
        signature: String,
        attempts: u32,
        #[source]
        last: UpstreamError,
    },
    #[error("operation cancelled")]
    Cancelled,
}

impl HistoryError {
    pub fn invalid_address(address: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidAddress {
            address: address.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid rpc url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
