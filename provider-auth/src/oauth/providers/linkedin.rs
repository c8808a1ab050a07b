//! LinkedIn authorizer.

use crate::config::AuthConfig;
use crate::oauth::Authorizer as _;
use crate::oauth::authorizer::{base_exchange_values, base_initiator_values};
use crate::oauth::{AuthState, Params, Provider, ProviderSupport, ScopeFormat};
use crate::registry::ProviderKind;

pub struct Authorizer;

impl crate::oauth::Authorizer for Authorizer {
    fn scope_format(&self) -> ScopeFormat {
        ScopeFormat::Joined(" ")
    }

    fn initiator_values(&self, config: &AuthConfig, state: Option<&AuthState>) -> Params {
        let mut params = base_initiator_values(config, state, self.scope_format());
        params.add("response_type", "code");
        params
    }

    fn exchange_values(&self, config: &AuthConfig) -> Params {
        let mut params = base_exchange_values(config);
        params.add("grant_type", "authorization_code");
        params
    }
}

/// Create a LinkedIn provider for `config`.
pub fn new_provider(config: AuthConfig, support: ProviderSupport) -> Provider {
    Provider::new(ProviderKind::Linkedin, config, Box::new(Authorizer), support)
}
