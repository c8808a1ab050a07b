//! Error types for the `provider-auth` crate.
//!
//! Follows the same pattern as the rest of the workspace: a root Error struct
//! holding an error kind tree plus an optional source for chaining.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for provider-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in provider-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    Exchange(ExchangeErrorKind),
    Provider(ProviderErrorKind),
}

/// Errors raised while loading or using provider configuration.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    /// A required setting (secret, allow-list, provider config) is absent.
    Missing,
    /// A setting is present but could not be parsed.
    Malformed,
    /// A field required for a flow leg is empty or not a usable URL.
    InvalidField,
}

/// Errors from the token exchange leg.
#[derive(Debug, PartialEq)]
pub enum ExchangeErrorKind {
    /// The HTTP client could not be built.
    BuilderFailed,
    /// Connection, DNS or TLS failure.
    Network,
    /// The request did not complete before the configured timeout.
    Timeout,
    /// The provider answered with a non-2xx status.
    Status(u16),
    /// The response body could not be read.
    InvalidResponse,
}

/// Errors from provider lookup.
#[derive(Debug, PartialEq)]
pub enum ProviderErrorKind {
    Unknown,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let detail = self
            .source
            .as_ref()
            .map(|source| format!(": {source}"))
            .unwrap_or_default();

        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "Configuration error ({:?}){}", kind, detail),
            ErrorKind::Exchange(ExchangeErrorKind::Status(status)) => {
                write!(f, "Token exchange failed with status {}{}", status, detail)
            }
            ErrorKind::Exchange(kind) => write!(f, "Token exchange error ({:?}){}", kind, detail),
            ErrorKind::Provider(kind) => write!(f, "Provider error ({:?}){}", kind, detail),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Exchange(ExchangeErrorKind::BuilderFailed)
        } else if err.is_timeout() {
            ErrorKind::Exchange(ExchangeErrorKind::Timeout)
        } else if err.is_body() || err.is_decode() {
            ErrorKind::Exchange(ExchangeErrorKind::InvalidResponse)
        } else {
            ErrorKind::Exchange(ExchangeErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Config(ConfigErrorKind::Malformed),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create token exchange errors.
pub fn exchange_error(kind: ExchangeErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Exchange(kind),
    }
}

/// Helper function to create provider lookup errors.
pub fn provider_error(kind: ProviderErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Provider(kind),
    }
}
