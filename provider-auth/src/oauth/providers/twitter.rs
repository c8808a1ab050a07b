//! Twitter authorizer.
//!
//! Sends one `scope` pair per configured permission and asks for a `code`
//! response type. Twitter's flow here does not round-trip `state`; that is a
//! provider policy, so the redirect carries no anti-forgery token.

use crate::config::AuthConfig;
use crate::oauth::Authorizer as _;
use crate::oauth::authorizer::base_initiator_values;
use crate::oauth::{AuthState, Params, Provider, ProviderSupport, ScopeFormat};
use crate::registry::ProviderKind;

pub struct Authorizer;

impl crate::oauth::Authorizer for Authorizer {
    fn scope_format(&self) -> ScopeFormat {
        ScopeFormat::Repeated
    }

    fn sends_state(&self) -> bool {
        false
    }

    fn initiator_values(&self, config: &AuthConfig, _state: Option<&AuthState>) -> Params {
        let mut params = base_initiator_values(config, None, self.scope_format());
        params.add("response_type", "code");
        params
    }
}

/// Create a Twitter provider for `config`.
pub fn new_provider(config: AuthConfig, support: ProviderSupport) -> Provider {
    Provider::new(ProviderKind::Twitter, config, Box::new(Authorizer), support)
}
