//! GitHub authorizer.
//!
//! GitHub takes the configured scope string as-is and round-trips `state`.

use crate::config::AuthConfig;
use crate::oauth::{Provider, ProviderSupport, ScopeFormat};
use crate::registry::ProviderKind;

pub struct Authorizer;

impl crate::oauth::Authorizer for Authorizer {
    fn scope_format(&self) -> ScopeFormat {
        ScopeFormat::Verbatim
    }
}

/// Create a GitHub provider for `config`.
pub fn new_provider(config: AuthConfig, support: ProviderSupport) -> Provider {
    Provider::new(ProviderKind::Github, config, Box::new(Authorizer), support)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::providers::test_config;
    use crate::oauth::{Authorizer as _, StateGenerator};

    #[test]
    fn test_initiator_values() {
        let config = test_config();
        let state = StateGenerator::default().generate();
        let params = Authorizer.initiator_values(&config, Some(&state));

        assert_eq!(params.get("client_id"), Some("CK"));
        assert_eq!(params.get("redirect_uri"), Some("https://app.example/cb"));
        assert_eq!(params.get("state"), Some(state.as_str()));
        assert_eq!(params.get_all("scope"), vec!["read,write"]);
    }

    #[test]
    fn test_exchange_values() {
        let params = Authorizer.exchange_values(&test_config());
        assert_eq!(
            params.encode(),
            "client_id=CK&client_secret=CS&redirect_uri=https%3A%2F%2Fapp.example%2Fcb"
        );
    }
}
