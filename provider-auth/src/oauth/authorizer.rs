//! Provider-specific parameter mapping for both flow legs.

use secrecy::ExposeSecret;

use super::params::Params;
use super::state::AuthState;
use crate::config::AuthConfig;

/// How a provider expects the configured permissions to be sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeFormat {
    /// Entries sent as one `scope` value, comma-separated as configured.
    Verbatim,
    /// Entries split on `,` and re-joined with the given separator.
    Joined(&'static str),
    /// Entries split on `,`, one `scope` pair per entry.
    Repeated,
}

/// Separator used between entries in the configured `Permissions` string.
pub const PERMISSION_DELIMITER: char = ',';

impl ScopeFormat {
    /// Append the scope parameter(s) for `permissions` to `params`.
    ///
    /// Nothing is appended when no permissions are configured.
    pub fn apply(self, permissions: &str, params: &mut Params) {
        let entries: Vec<&str> = permissions
            .split(PERMISSION_DELIMITER)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect();
        if entries.is_empty() {
            return;
        }

        match self {
            ScopeFormat::Verbatim => {
                params.add("scope", &entries.join(","));
            }
            ScopeFormat::Joined(separator) => {
                params.add("scope", &entries.join(separator));
            }
            ScopeFormat::Repeated => {
                for entry in entries {
                    params.add("scope", entry);
                }
            }
        }
    }
}

/// Strategy producing the provider-specific parameters for each leg.
///
/// The provider state machine stays provider-agnostic: it asks the authorizer
/// for the initiator values (redirect leg) and the exchange values (token
/// leg), and appends the received authorization code itself, so
/// implementations never see the code.
pub trait Authorizer: Send + Sync {
    /// Scope encoding this provider expects.
    fn scope_format(&self) -> ScopeFormat;

    /// Whether the provider round-trips an anti-forgery `state` parameter.
    ///
    /// When false the state machine does not generate one at all.
    fn sends_state(&self) -> bool {
        true
    }

    /// Parameters for the authorization redirect.
    ///
    /// `state` is `Some` exactly when [`Authorizer::sends_state`] is true.
    fn initiator_values(&self, config: &AuthConfig, state: Option<&AuthState>) -> Params {
        base_initiator_values(config, state, self.scope_format())
    }

    /// Parameters for the token exchange, excluding the authorization code.
    fn exchange_values(&self, config: &AuthConfig) -> Params {
        base_exchange_values(config)
    }
}

/// `client_id`, `redirect_uri`, `state` (when given) and scope, in that order.
pub fn base_initiator_values(
    config: &AuthConfig,
    state: Option<&AuthState>,
    scope_format: ScopeFormat,
) -> Params {
    let mut params = Params::new();
    params
        .add("client_id", &config.consumer_key)
        .add("redirect_uri", &config.callback_url);
    if let Some(state) = state {
        params.add("state", state.as_str());
    }
    scope_format.apply(&config.permissions, &mut params);
    params
}

/// `client_id`, `client_secret` and `redirect_uri`, in that order.
pub fn base_exchange_values(config: &AuthConfig) -> Params {
    let mut params = Params::new();
    params
        .add("client_id", &config.consumer_key)
        .add("client_secret", config.consumer_secret.expose_secret())
        .add("redirect_uri", &config.callback_url);
    params
}
