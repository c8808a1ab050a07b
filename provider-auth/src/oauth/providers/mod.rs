//! Authorizer implementations, one per supported identity provider.

pub mod facebook;
pub mod github;
pub mod google;
pub mod linkedin;
pub mod twitter;

#[cfg(test)]
pub(crate) fn test_config() -> crate::config::AuthConfig {
    crate::config::AuthConfig::from_json(
        r#"{
            "ProviderName": "Example",
            "AuthorizeUrl": "https://id.example/auth",
            "AccessTokenUrl": "https://id.example/token",
            "ConsumerKey": "CK",
            "ConsumerSecret": "CS",
            "CallbackUrl": "https://app.example/cb",
            "Permissions": "read,write"
        }"#,
    )
    .expect("test config parses")
}
