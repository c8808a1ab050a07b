use clap::builder::TypedValueParser as _;
use clap::Parser;
use log::LevelFilter;
use std::env;
use std::time::Duration;

/// Default number of seconds a token exchange may take before it is abandoned.
pub const DEFAULT_EXCHANGE_TIMEOUT_SECS: u64 = 20;

/// Default length of generated anti-forgery state values.
pub const DEFAULT_STATE_LENGTH: usize = 32;

/// Environment variable holding the JSON AuthConfig for `provider`, e.g.
/// `AUTH_GITHUB_AUTHCONFIG`.
pub fn auth_config_env_var(provider: &str) -> String {
    format!("AUTH_{}_AUTHCONFIG", provider.trim().to_uppercase())
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Process-wide secret used to sign anti-forgery state values. Startup fails without it.
    #[arg(long, env, hide_env_values = true)]
    app_secret: Option<String>,

    /// Comma-separated list of identity providers to enable (e.g. "github,google").
    /// Each one reads its JSON settings from AUTH_<PROVIDER>_AUTHCONFIG.
    #[arg(long, env)]
    auth_providers_allowed: Option<String>,

    /// Seconds to wait for a provider's token endpoint before giving up
    #[arg(
        long,
        env,
        default_value_t = DEFAULT_EXCHANGE_TIMEOUT_SECS,
        value_parser = clap::value_parser!(u64).range(1..=120),
    )]
    pub exchange_timeout_secs: u64,

    /// Number of characters in each generated anti-forgery state value
    #[arg(long, env, default_value_t = DEFAULT_STATE_LENGTH)]
    pub state_length: usize,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    pub fn app_secret(&self) -> Option<String> {
        self.app_secret.clone()
    }

    pub fn auth_providers_allowed(&self) -> Option<String> {
        self.auth_providers_allowed.clone()
    }

    /// The JSON AuthConfig configured for `provider`, if any.
    pub fn auth_config_for(&self, provider: &str) -> Option<String> {
        env::var(auth_config_env_var(provider))
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    pub fn exchange_timeout(&self) -> Duration {
        Duration::from_secs(self.exchange_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["auth_gateway"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_auth_config_env_var_name() {
        assert_eq!(auth_config_env_var("github"), "AUTH_GITHUB_AUTHCONFIG");
        assert_eq!(auth_config_env_var(" LinkedIn "), "AUTH_LINKEDIN_AUTHCONFIG");
    }

    #[test]
    #[serial]
    fn test_defaults() {
        env::remove_var("EXCHANGE_TIMEOUT_SECS");
        env::remove_var("STATE_LENGTH");
        env::remove_var("LOG_LEVEL_FILTER");

        let config = parse(&[]);
        assert_eq!(config.exchange_timeout(), Duration::from_secs(20));
        assert_eq!(config.state_length, DEFAULT_STATE_LENGTH);
        assert_eq!(config.log_level_filter, LevelFilter::Info);
    }

    #[test]
    #[serial]
    fn test_command_line_values() {
        let config = parse(&[
            "--app-secret",
            "s3cret",
            "--auth-providers-allowed",
            "github,google",
            "--exchange-timeout-secs",
            "10",
            "--log-level-filter",
            "DEBUG",
        ]);
        assert_eq!(config.app_secret().as_deref(), Some("s3cret"));
        assert_eq!(
            config.auth_providers_allowed().as_deref(),
            Some("github,google")
        );
        assert_eq!(config.exchange_timeout(), Duration::from_secs(10));
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }

    #[test]
    #[serial]
    fn test_exchange_timeout_is_bounded() {
        let mut argv = vec!["auth_gateway", "--exchange-timeout-secs", "0"];
        assert!(Config::try_parse_from(argv.clone()).is_err());
        argv[2] = "600";
        assert!(Config::try_parse_from(argv.clone()).is_err());
    }

    #[test]
    #[serial]
    fn test_auth_config_for_reads_environment() {
        env::set_var("AUTH_GITHUB_AUTHCONFIG", r#"{"ConsumerKey":"CK"}"#);
        env::set_var("AUTH_GOOGLE_AUTHCONFIG", "  ");
        env::remove_var("AUTH_TWITTER_AUTHCONFIG");

        let config = parse(&[]);
        assert_eq!(
            config.auth_config_for("GitHub").as_deref(),
            Some(r#"{"ConsumerKey":"CK"}"#)
        );
        assert_eq!(config.auth_config_for("google"), None);
        assert_eq!(config.auth_config_for("twitter"), None);

        env::remove_var("AUTH_GITHUB_AUTHCONFIG");
        env::remove_var("AUTH_GOOGLE_AUTHCONFIG");
    }
}
