//! Facebook authorizer.

use crate::config::AuthConfig;
use crate::oauth::{Provider, ProviderSupport, ScopeFormat};
use crate::registry::ProviderKind;

/// Facebook expects a comma-separated scope list.
pub struct Authorizer;

impl crate::oauth::Authorizer for Authorizer {
    fn scope_format(&self) -> ScopeFormat {
        ScopeFormat::Joined(",")
    }
}

/// Create a Facebook provider for `config`.
pub fn new_provider(config: AuthConfig, support: ProviderSupport) -> Provider {
    Provider::new(ProviderKind::Facebook, config, Box::new(Authorizer), support)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::providers::test_config;
    use crate::oauth::{Authorizer as _, StateGenerator};

    #[test]
    fn test_scope_is_normalised_csv() {
        let mut config = test_config();
        config.permissions = "email, public_profile ,".to_string();
        let state = StateGenerator::default().generate();

        let params = Authorizer.initiator_values(&config, Some(&state));
        assert_eq!(params.get_all("scope"), vec!["email,public_profile"]);
        assert_eq!(params.get("state"), Some(state.as_str()));
    }
}
