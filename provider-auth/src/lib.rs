//! # provider-auth
//!
//! Pluggable OAuth 2.0 authorization code flow client:
//! - Builds the redirect that sends a user to a third-party identity provider
//! - Exchanges the returned authorization code for the provider's token response
//! - Generates and signs anti-forgery state values
//!
//! ## Architecture
//!
//! Every provider shares one protocol state machine ([`oauth::Provider`]) and
//! differs only in its [`oauth::Authorizer`], which maps configuration to the
//! provider's parameter names and scope encoding. Providers are enabled by an
//! allow-list at startup and collected in an immutable [`registry::AuthContext`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use provider_auth::{
//!     http::ExchangeClientBuilder,
//!     oauth::{AuthResponse, CallbackParams, RequestOptions},
//!     registry::{AuthContext, StartupSettings},
//! };
//!
//! let context = AuthContext::init(&settings, Arc::new(client), |id| lookup(id))?;
//! let provider = context.provider("github")?;
//! match provider.authenticate(&CallbackParams::from_query(query), &RequestOptions::new()).await {
//!     AuthResponse::Redirect { url, state } => { /* store state, redirect */ }
//!     AuthResponse::RawPayload(body) => { /* token response */ }
//!     AuthResponse::Error(message) => { /* render error */ }
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod registry;

// Re-export commonly used types
pub use config::AuthConfig;
pub use error::{Error, ErrorKind};
