//! Generic provider and the two-leg authorization code flow.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::*;
use serde::Deserialize;
use url::{form_urlencoded, Url};

use super::authorizer::Authorizer;
use super::params::Params;
use super::state::{AuthState, StateGenerator};
use crate::config::AuthConfig;
use crate::error::Error;
use crate::http::TokenExchanger;
use crate::registry::ProviderKind;

/// Extra query parameters a caller wants on the authorization redirect.
///
/// A plain key-value mapping owned by the caller. Entries are appended after
/// the provider's own parameters; a key the provider already sets
/// (`client_id`, `redirect_uri`, `state`, `scope`, ...) is ignored. The
/// generated state is never written here: it is returned in
/// [`AuthResponse::Redirect`].
pub type RequestOptions = BTreeMap<String, String>;

/// Inbound parameters of an authentication call.
///
/// Deserializes directly from a callback query string. The standard OAuth 2.0
/// names `error` and `error_description` are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackParams {
    #[serde(default, alias = "error")]
    pub error_code: Option<String>,
    #[serde(default, alias = "error_description")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    /// State echoed back by the provider. Checking it against the session is
    /// the caller's job; the flow itself ignores it.
    #[serde(default)]
    pub state: Option<String>,
}

/// Which leg an inbound call belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowLeg {
    /// The provider reported an error.
    Failed { message: String },
    /// No code yet: send the user to the provider.
    Init,
    /// A code came back: trade it for a token.
    Exchange { code: String },
}

impl CallbackParams {
    /// Parse a raw `application/x-www-form-urlencoded` query string.
    ///
    /// The first occurrence of each recognised key wins; unknown keys are
    /// ignored.
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let slot = match key.as_ref() {
                "error_code" | "error" => &mut params.error_code,
                "error_message" | "error_description" => &mut params.error_message,
                "code" => &mut params.code,
                "state" => &mut params.state,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    /// Classify this call. An error indicator always wins over a code, and
    /// empty values count as absent.
    pub fn leg(&self) -> FlowLeg {
        if let Some(error_code) = non_empty(&self.error_code) {
            let message = non_empty(&self.error_message).unwrap_or(error_code);
            return FlowLeg::Failed {
                message: message.to_string(),
            };
        }

        match non_empty(&self.code) {
            Some(code) => FlowLeg::Exchange {
                code: code.to_string(),
            },
            None => FlowLeg::Init,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Outcome of one authentication call. Exactly one variant per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResponse {
    /// Send the user agent to `url`. `state` is the anti-forgery token to keep
    /// in the session, or `None` for providers that do not round-trip one.
    Redirect {
        url: String,
        state: Option<AuthState>,
    },
    /// Token endpoint response body, passed through verbatim.
    RawPayload(String),
    /// Upstream, transport or configuration failure, as a displayable message.
    Error(String),
}

/// Shared collaborators every provider is constructed with.
#[derive(Clone)]
pub struct ProviderSupport {
    pub exchanger: Arc<dyn TokenExchanger>,
    pub state_generator: StateGenerator,
}

/// A configured identity provider.
///
/// Owns its [`AuthConfig`] and provider-specific [`Authorizer`]. It holds no
/// per-user data, so one instance serves every concurrent request.
pub struct Provider {
    kind: ProviderKind,
    config: AuthConfig,
    authorizer: Box<dyn Authorizer>,
    support: ProviderSupport,
}

impl Provider {
    pub fn new(
        kind: ProviderKind,
        config: AuthConfig,
        authorizer: Box<dyn Authorizer>,
        support: ProviderSupport,
    ) -> Self {
        Self {
            kind,
            config,
            authorizer,
            support,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Run one step of the authorization code flow for an inbound call.
    ///
    /// Every failure is returned as [`AuthResponse::Error`]. Dropping the
    /// returned future cancels an in-flight exchange.
    pub async fn authenticate(
        &self,
        params: &CallbackParams,
        options: &RequestOptions,
    ) -> AuthResponse {
        match params.leg() {
            FlowLeg::Failed { message } => {
                warn!("{} reported an authorization error: {}", self.kind, message);
                AuthResponse::Error(message)
            }
            FlowLeg::Init => match self.authorization_url(options) {
                Ok((url, state)) => {
                    debug!("Redirecting to {} authorization endpoint", self.kind);
                    AuthResponse::Redirect { url, state }
                }
                Err(e) => {
                    error!("Cannot build {} authorization URL: {}", self.kind, e);
                    AuthResponse::Error(e.to_string())
                }
            },
            FlowLeg::Exchange { code } => match self.exchange_code(&code).await {
                Ok(payload) => AuthResponse::RawPayload(payload),
                Err(e) => {
                    warn!("{} token exchange failed: {}", self.kind, e);
                    AuthResponse::Error(e.to_string())
                }
            },
        }
    }

    /// Build the authorization redirect URL with a freshly generated state.
    pub fn authorization_url(
        &self,
        options: &RequestOptions,
    ) -> Result<(String, Option<AuthState>), Error> {
        let mut url = self.config.authorize_endpoint()?;

        let state = self
            .authorizer
            .sends_state()
            .then(|| self.support.state_generator.generate());
        let mut params = self.authorizer.initiator_values(&self.config, state.as_ref());

        for (key, value) in options {
            if params.contains_key(key) {
                debug!("Ignoring request option '{}' reserved by {}", key, self.kind);
                continue;
            }
            params.add(key, value);
        }

        url.query_pairs_mut().extend_pairs(params.iter());
        Ok((url.to_string(), state))
    }

    /// The endpoint and form body of the exchange leg for `code`.
    pub fn exchange_request(&self, code: &str) -> Result<(Url, Params), Error> {
        let endpoint = self.config.token_endpoint()?;

        let mut form = Params::new();
        form.add("code", code);
        form.extend(
            self.authorizer
                .exchange_values(&self.config)
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );

        Ok((endpoint, form))
    }

    /// Trade an authorization code for the provider's raw token response.
    pub async fn exchange_code(&self, code: &str) -> Result<String, Error> {
        let (endpoint, form) = self.exchange_request(code)?;
        self.support
            .exchanger
            .post_for_json(&endpoint, form.encode())
            .await
    }
}
