//! Static per-provider settings and their validation.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::error::{config_error, ConfigErrorKind, Error};

/// Per-provider settings for the authorization code flow.
///
/// Loaded once at startup from the JSON value configured for a provider and
/// never mutated afterwards. Field names follow the configuration surface
/// (`AuthorizeUrl`, `ConsumerKey`, ...); snake_case keys are accepted too.
/// Missing fields deserialize as empty strings so that [`AuthConfig::validate`]
/// can report every problem at once instead of failing on the first one.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthConfig {
    #[serde(default, alias = "provider_name")]
    pub provider_name: String,
    #[serde(default, alias = "authorize_url")]
    pub authorize_url: String,
    #[serde(default, alias = "access_token_url")]
    pub access_token_url: String,
    #[serde(default, alias = "consumer_key")]
    pub consumer_key: String,
    #[serde(default = "empty_secret", alias = "consumer_secret")]
    pub consumer_secret: SecretString,
    #[serde(default, alias = "callback_url")]
    pub callback_url: String,
    /// Requested scope, as a single delimiter-joined string (e.g. `"read,write"`).
    #[serde(default, alias = "permissions")]
    pub permissions: String,
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

/// A single problem found while validating an [`AuthConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of [`AuthConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl AuthConfig {
    /// Parse a provider's JSON configuration value.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check presence and shape of the fields both flow legs rely on.
    ///
    /// Validation never rejects a config: callers log the result and keep the
    /// provider registered, so misconfiguration surfaces as a request-time
    /// configuration error on that provider only.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        check_url(&mut result, "AuthorizeUrl", &self.authorize_url);
        check_url(&mut result, "AccessTokenUrl", &self.access_token_url);
        check_url(&mut result, "CallbackUrl", &self.callback_url);

        if self.consumer_key.trim().is_empty() {
            result.push("ConsumerKey", "must not be empty");
        }
        if self.consumer_secret.expose_secret().trim().is_empty() {
            result.push("ConsumerSecret", "must not be empty");
        }

        result
    }

    /// The authorization endpoint, or a configuration error if it is unusable.
    pub fn authorize_endpoint(&self) -> Result<Url, Error> {
        parse_endpoint("AuthorizeUrl", &self.authorize_url)
    }

    /// The token endpoint reduced to `scheme://host/path`.
    ///
    /// Any userinfo, query string or fragment configured on `AccessTokenUrl`
    /// is dropped; exchange parameters travel in the request body only.
    pub fn token_endpoint(&self) -> Result<Url, Error> {
        let mut url = parse_endpoint("AccessTokenUrl", &self.access_token_url)?;
        url.set_query(None);
        url.set_fragment(None);
        // Client credentials travel in the body only, never as userinfo.
        let _ = url.set_username("");
        let _ = url.set_password(None);
        Ok(url)
    }
}

fn check_url(result: &mut ValidationResult, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        result.push(field, "must not be empty");
        return;
    }
    match Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => result.push(field, format!("unsupported scheme '{}'", url.scheme())),
        Err(e) => result.push(field, format!("not a valid URL ({e})")),
    }
}

fn parse_endpoint(field: &str, value: &str) -> Result<Url, Error> {
    if value.trim().is_empty() {
        return Err(config_error(
            ConfigErrorKind::InvalidField,
            &format!("{field} is empty"),
        ));
    }
    Url::parse(value).map_err(|e| {
        config_error(
            ConfigErrorKind::InvalidField,
            &format!("{field} '{value}' is not a valid URL: {e}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const EXAMPLE_JSON: &str = r#"{
        "ProviderName": "Example",
        "AuthorizeUrl": "https://id.example/auth",
        "AccessTokenUrl": "https://id.example/token?legacy=1#frag",
        "ConsumerKey": "CK",
        "ConsumerSecret": "CS",
        "CallbackUrl": "https://app.example/cb",
        "Permissions": "read,write"
    }"#;

    #[test]
    fn test_from_json_pascal_case() {
        let config = AuthConfig::from_json(EXAMPLE_JSON).unwrap();
        assert_eq!(config.provider_name, "Example");
        assert_eq!(config.consumer_key, "CK");
        assert_eq!(config.consumer_secret.expose_secret(), "CS");
        assert_eq!(config.permissions, "read,write");
        assert!(!config.validate().has_errors());
    }

    #[test]
    fn test_from_json_snake_case_aliases() {
        let json = r#"{"authorize_url": "https://a.example/auth", "consumer_key": "k"}"#;
        let config = AuthConfig::from_json(json).unwrap();
        assert_eq!(config.authorize_url, "https://a.example/auth");
        assert_eq!(config.consumer_key, "k");
    }

    #[test]
    fn test_from_json_malformed() {
        let err = AuthConfig::from_json("{\"AuthorizeUrl\": ").unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Config(ConfigErrorKind::Malformed));
    }

    #[test]
    fn test_validate_reports_every_missing_field() {
        let config = AuthConfig::from_json("{}").unwrap();
        let result = config.validate();
        let fields: Vec<_> = result.errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "AuthorizeUrl",
                "AccessTokenUrl",
                "CallbackUrl",
                "ConsumerKey",
                "ConsumerSecret"
            ]
        );
    }

    #[test]
    fn test_validate_rejects_bad_urls() {
        let json = r#"{
            "AuthorizeUrl": "ftp://id.example/auth",
            "AccessTokenUrl": "not a url",
            "ConsumerKey": "CK",
            "ConsumerSecret": "CS",
            "CallbackUrl": "https://app.example/cb"
        }"#;
        let result = AuthConfig::from_json(json).unwrap().validate();
        assert_eq!(result.errors.len(), 2);
        assert_eq!(result.errors[0].field, "AuthorizeUrl");
        assert_eq!(result.errors[1].field, "AccessTokenUrl");
        assert!(result.to_string().contains("unsupported scheme 'ftp'"));
    }

    #[test]
    fn test_token_endpoint_drops_query_and_fragment() {
        let config = AuthConfig::from_json(EXAMPLE_JSON).unwrap();
        let endpoint = config.token_endpoint().unwrap();
        assert_eq!(endpoint.as_str(), "https://id.example/token");
    }

    #[test]
    fn test_token_endpoint_drops_userinfo() {
        let config = AuthConfig::from_json(
            r#"{"AccessTokenUrl": "https://CK:CS@id.example:8443/oauth/token?x=1"}"#,
        )
        .unwrap();
        let endpoint = config.token_endpoint().unwrap();
        assert_eq!(endpoint.as_str(), "https://id.example:8443/oauth/token");
        assert_eq!(endpoint.username(), "");
        assert_eq!(endpoint.password(), None);
    }

    #[test]
    fn test_empty_authorize_url_is_config_error() {
        let config = AuthConfig::from_json("{}").unwrap();
        let err = config.authorize_endpoint().unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Config(ConfigErrorKind::InvalidField)
        );
        assert!(err.to_string().contains("AuthorizeUrl is empty"));
    }
}
