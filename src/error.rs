//! @ai:module:intent Define error types and HTTP status classification for the VarSome client
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result, describe_status, CLASSIFIED_STATUSES
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// Status codes the service documents, each with a fixed description.
pub const CLASSIFIED_STATUSES: [u16; 9] = [400, 401, 403, 404, 500, 501, 502, 503, 504];

/// @ai:intent Unified error type for all client and CLI operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{status} ({message})")]
    Http { status: u16, message: &'static str },

    #[error("unclassified HTTP status {status}")]
    UnclassifiedHttp { status: u16 },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("You need to pass an api key to perform batch requests")]
    MissingApiKey,

    #[error("API key contains characters that are not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request parameter '{0}', expected key=value")]
    InvalidParameter(String),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    TomlParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// @ai:intent Build the error for a non-success HTTP status
    /// @ai:pre status is not 2xx
    /// @ai:effects pure
    pub fn from_status(status: u16) -> Self {
        match describe_status(status) {
            Some(message) => Error::Http { status, message },
            None => Error::UnclassifiedHttp { status },
        }
    }

    /// @ai:intent HTTP status carried by the error, if it came from a response
    /// @ai:effects pure
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } | Error::UnclassifiedHttp { status } => Some(*status),
            _ => None,
        }
    }

    /// @ai:intent Whether the failure came from the remote service or the network
    /// @ai:effects pure
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Http { .. }
                | Error::UnclassifiedHttp { .. }
                | Error::Transport(_)
                | Error::Decode(_)
                | Error::UnexpectedResponse(_)
        )
    }
}

/// @ai:intent Fixed description for a classified status code
/// @ai:post returns Some exactly for CLASSIFIED_STATUSES
/// @ai:effects pure
pub fn describe_status(status: u16) -> Option<&'static str> {
    let message = match status {
        400 => {
            "Bad request. A parameter you have passed is not valid, \
             or something in your request is wrong"
        }
        401 => {
            "Not Authorized: either you need to provide authentication \
             credentials, or the credentials provided aren't valid."
        }
        403 => {
            "Bad Request: your request is invalid, and we'll return \
             an error message that tells you why. This is the status code \
             returned if you've exceeded the rate limit (see below)."
        }
        404 => {
            "Not Found: either you're requesting an invalid URI \
             or the resource in question doesn't exist"
        }
        500 => "Internal Server Error: we did something wrong.",
        501 => "Not implemented.",
        502 => "Bad Gateway: returned if VariantAPI is down or being upgraded.",
        503 => {
            "Service Unavailable: the VariantAPI servers are up, \
             but are overloaded with requests. Try again later."
        }
        504 => "Gateway Timeout",
        _ => return None,
    };
    Some(message)
}
