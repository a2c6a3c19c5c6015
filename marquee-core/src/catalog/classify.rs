//! Failure classification into the [`ApiError`] taxonomy.
//!
//! Raw failures are first captured as a [`FailureCause`] (conversions exist for
//! reqwest, serde_json and I/O errors) and then mapped by [`classify`], which
//! is total, deterministic and free of side effects.

use std::error::Error as StdError;
use std::io;

use super::error::{ApiError, HttpError, HttpStatus, NetworkError};

/// Raw cause of a failed catalog call, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// Already classified; passed through untouched.
    Classified(ApiError),
    /// Host could not be resolved or reached.
    Connectivity { message: String },
    /// Connect or read deadline elapsed.
    Timeout,
    /// Any other low-level I/O failure.
    Io { message: String },
    /// Payload did not decode into the expected shape.
    Decode { message: String },
    /// Response arrived with a non-2xx status.
    Status {
        code: u16,
        status_message: Option<String>,
    },
    /// Nothing more specific is known.
    Other { message: String },
}

/// Maps a raw failure onto exactly one [`ApiError`].
///
/// Precedence: already classified, connectivity, timeout, other I/O, decode,
/// HTTP status, then unknown.
pub fn classify(cause: FailureCause) -> ApiError {
    match cause {
        FailureCause::Classified(error) => error,
        FailureCause::Connectivity { .. } => ApiError::Network(NetworkError::NoConnection),
        FailureCause::Timeout => ApiError::Network(NetworkError::Timeout),
        FailureCause::Io { message } => ApiError::Network(NetworkError::Generic {
            message: non_empty(message),
        }),
        FailureCause::Decode { message } => ApiError::Serialization { message },
        FailureCause::Status {
            code,
            status_message,
        } => classify_status(code, status_message),
        FailureCause::Other { message } => ApiError::Unknown {
            message: format!("Unexpected error: {}", non_empty(message)),
        },
    }
}

/// Classifies a non-2xx status code.
///
/// Codes in 400-599 become [`ApiError::Http`]; anything else becomes
/// [`ApiError::Unknown`] with the code embedded in the message.
pub fn classify_status(code: u16, status_message: Option<String>) -> ApiError {
    match HttpStatus::from_code(code) {
        Some(status) => ApiError::Http(HttpError::new(status, status_message)),
        None => {
            let message = match status_message.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => format!("Unknown HTTP error: {code} {text}"),
                _ => format!("Unknown HTTP error: {code}"),
            };
            ApiError::Unknown { message }
        }
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        message
    }
}

impl From<ApiError> for FailureCause {
    fn from(error: ApiError) -> Self {
        FailureCause::Classified(error)
    }
}

impl From<serde_json::Error> for FailureCause {
    fn from(error: serde_json::Error) -> Self {
        if error.is_io() {
            FailureCause::Io {
                message: error.to_string(),
            }
        } else {
            FailureCause::Decode {
                message: error.to_string(),
            }
        }
    }
}

impl From<io::Error> for FailureCause {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::TimedOut => FailureCause::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable => FailureCause::Connectivity {
                message: error.to_string(),
            },
            _ => FailureCause::Io {
                message: error.to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for FailureCause {
    fn from(error: reqwest::Error) -> Self {
        let message = describe_chain(&error);

        // A connect timeout reports as both; the deadline wins.
        if error.is_timeout() {
            FailureCause::Timeout
        } else if error.is_connect() {
            FailureCause::Connectivity { message }
        } else if let Some(io_error) = find_io_error(&error) {
            FailureCause::from(io::Error::new(io_error.kind(), message))
        } else if error.is_decode() {
            FailureCause::Decode { message }
        } else if let Some(status) = error.status() {
            FailureCause::Status {
                code: status.as_u16(),
                status_message: status.canonical_reason().map(str::to_string),
            }
        } else if error.is_request() || error.is_body() || error.is_redirect() {
            FailureCause::Io { message }
        } else {
            FailureCause::Other { message }
        }
    }
}

/// Joins an error with its sources, e.g. "error sending request: dns error: ...".
fn describe_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn find_io_error<'a>(error: &'a (dyn StdError + 'static)) -> Option<&'a io::Error> {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            return Some(io_error);
        }
        source = cause.source();
    }
    None
}
