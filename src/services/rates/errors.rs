use std::fmt;
use thiserror::Error;

/// Which upstream call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStage {
    Fiat,
    Crypto,
}

impl fmt::Display for FetchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchStage::Fiat => write!(f, "fiat"),
            FetchStage::Crypto => write!(f, "crypto"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("rate for {0} is missing")]
    MissingRate(&'static str),
    #[error("rate for {code} is invalid: {value}")]
    InvalidRate { code: &'static str, value: f64 },
    #[error("price is missing")]
    MissingPrice,
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}

#[derive(Debug, Error)]
#[error("{stage} fetch failed: {cause}")]
pub struct FetchError {
    pub stage: FetchStage,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(stage: FetchStage, cause: FetchCause) -> Self {
        Self { stage, cause }
    }
}
