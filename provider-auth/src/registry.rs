//! Provider registry and the immutable startup context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::*;
use secrecy::{ExposeSecret, SecretString};

use crate::config::AuthConfig;
use crate::error::{config_error, provider_error, ConfigErrorKind, Error, ProviderErrorKind};
use crate::http::TokenExchanger;
use crate::oauth::providers::{facebook, github, google, linkedin, twitter};
use crate::oauth::{Provider, ProviderSupport, StateGenerator, StateGuard};

/// Identity providers this crate knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProviderKind {
    Github,
    Twitter,
    Facebook,
    Google,
    Linkedin,
}

/// Builds a [`Provider`] from its configuration.
pub type ProviderConstructor = fn(AuthConfig, ProviderSupport) -> Provider;

/// Factory table consulted when reading the allow-list.
const CONSTRUCTORS: [(ProviderKind, ProviderConstructor); 5] = [
    (ProviderKind::Github, github::new_provider),
    (ProviderKind::Twitter, twitter::new_provider),
    (ProviderKind::Facebook, facebook::new_provider),
    (ProviderKind::Google, google::new_provider),
    (ProviderKind::Linkedin, linkedin::new_provider),
];

impl ProviderKind {
    /// Get the provider identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Github => "github",
            ProviderKind::Twitter => "twitter",
            ProviderKind::Facebook => "facebook",
            ProviderKind::Google => "google",
            ProviderKind::Linkedin => "linkedin",
        }
    }

    /// Look up a provider by identifier, ignoring case and surrounding spaces.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim().to_lowercase();
        CONSTRUCTORS
            .iter()
            .map(|(kind, _)| *kind)
            .find(|kind| kind.as_str() == id)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constructors for the providers enabled by the allow-list.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    constructors: HashMap<ProviderKind, ProviderConstructor>,
}

impl ProviderRegistry {
    /// Register a constructor for every known identifier in a comma-separated
    /// allow-list. Unknown identifiers are logged and skipped.
    pub fn from_allow_list(allow_list: &str) -> Self {
        let mut constructors = HashMap::new();

        for id in allow_list.split(',').map(str::trim).filter(|id| !id.is_empty()) {
            let found = ProviderKind::from_id(id)
                .and_then(|kind| CONSTRUCTORS.iter().find(|(k, _)| *k == kind));
            match found {
                Some((kind, constructor)) => {
                    constructors.insert(*kind, *constructor);
                }
                None => warn!("Provider <{}> is not known. Skipped.", id),
            }
        }

        Self { constructors }
    }

    /// Registered providers, in a stable order.
    pub fn kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.constructors.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn is_registered(&self, id: &str) -> bool {
        ProviderKind::from_id(id).is_some_and(|kind| self.constructors.contains_key(&kind))
    }

    /// Construct the provider registered under `id`, or `None` if no
    /// constructor is registered for it.
    pub fn construct(
        &self,
        id: &str,
        config: AuthConfig,
        support: ProviderSupport,
    ) -> Option<Provider> {
        let kind = ProviderKind::from_id(id)?;
        let constructor = self.constructors.get(&kind)?;
        Some(constructor(config, support))
    }
}

/// Process-wide settings consumed at startup.
#[derive(Debug)]
pub struct StartupSettings {
    /// Process-wide secret, used to sign state values.
    pub secret: Option<SecretString>,
    /// Comma-separated list of provider identifiers to enable.
    pub providers_allowed: Option<String>,
    /// Length of generated state tokens.
    pub state_length: usize,
}

/// Everything request handling needs, built once at startup and read-only
/// afterwards. Share it behind an `Arc`; no locking is required.
pub struct AuthContext {
    providers: HashMap<ProviderKind, Provider>,
    state_guard: StateGuard,
}

impl AuthContext {
    /// Build the context from startup settings.
    ///
    /// `auth_config_for` returns the JSON AuthConfig configured for a provider
    /// identifier. A missing secret or allow-list is a fatal configuration
    /// error. A provider whose config is missing or unparsable is logged and
    /// left out; one whose config fails validation is logged and kept.
    pub fn init<F>(
        settings: &StartupSettings,
        exchanger: Arc<dyn TokenExchanger>,
        auth_config_for: F,
    ) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = settings
            .secret
            .as_ref()
            .filter(|s| !s.expose_secret().trim().is_empty())
            .ok_or_else(|| config_error(ConfigErrorKind::Missing, "No app secret setting was found."))?;
        let state_guard = StateGuard::new(secret)?;

        let allow_list = settings
            .providers_allowed
            .as_deref()
            .filter(|list| !list.trim().is_empty())
            .ok_or_else(|| {
                config_error(
                    ConfigErrorKind::Missing,
                    "No auth providers allowed setting was found.",
                )
            })?;

        info!("Setting up the following providers: {}", allow_list);
        let registry = ProviderRegistry::from_allow_list(allow_list);
        let support = ProviderSupport {
            exchanger,
            state_generator: StateGenerator::new(settings.state_length),
        };

        let mut providers = HashMap::new();
        for kind in registry.kinds() {
            let config = match load_auth_config(kind, &auth_config_for) {
                Ok(config) => config,
                Err(e) => {
                    error!("{}. Provider {} skipped.", e, kind);
                    continue;
                }
            };

            let validation = config.validate();
            if validation.has_errors() {
                warn!(
                    "Configuration data for {} does not validate ({}). Added anyways, but please confirm settings.",
                    kind, validation
                );
            } else {
                info!("Configured {} for authentication.", kind);
            }

            if let Some(provider) = registry.construct(kind.as_str(), config, support.clone()) {
                providers.insert(kind, provider);
            }
        }

        if providers.is_empty() {
            warn!("No authentication providers are available.");
        }

        Ok(Self {
            providers,
            state_guard,
        })
    }

    /// The provider registered under `id`.
    pub fn provider(&self, id: &str) -> Result<&Provider, Error> {
        ProviderKind::from_id(id)
            .and_then(|kind| self.providers.get(&kind))
            .ok_or_else(|| {
                provider_error(
                    ProviderErrorKind::Unknown,
                    &format!("Provider <{}> is not configured.", id.trim()),
                )
            })
    }

    /// Identifiers of every available provider, sorted.
    pub fn provider_ids(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds.into_iter().map(|kind| kind.as_str()).collect()
    }

    pub fn state_guard(&self) -> &StateGuard {
        &self.state_guard
    }
}

fn load_auth_config<F>(kind: ProviderKind, auth_config_for: &F) -> Result<AuthConfig, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let json = auth_config_for(kind.as_str()).ok_or_else(|| {
        config_error(
            ConfigErrorKind::Missing,
            &format!("auth config for {} not found", kind),
        )
    })?;

    AuthConfig::from_json(&json).map_err(|e| Error {
        source: Some(format!("Error reading auth config for {}: {}", kind, e).into()),
        error_kind: e.error_kind,
    })
}
