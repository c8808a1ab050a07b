use std::sync::Arc;

use clap::Parser;
use dotenvy::dotenv;
use log::{error, info, warn};
use provider_auth::http::ExchangeClientBuilder;
use provider_auth::oauth::{AuthResponse, CallbackParams, FlowLeg, RequestOptions};
use provider_auth::registry::{AuthContext, StartupSettings};
use secrecy::SecretString;
use service::{config::Config, logging::Logger};

/// Runs one step of the authorization code flow against a configured identity provider.
///
/// Without a code in `--callback` this prints the redirect URL together with the
/// state to keep in the session; with one it exchanges the code and prints the
/// provider's token response.
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Identity provider to authenticate with (e.g. "github")
    #[arg(long)]
    provider: String,

    /// Callback query string received from the provider (e.g. "code=abc&state=XYZ")
    #[arg(long, default_value = "")]
    callback: String,

    /// Signature printed when the flow was started. When given, the callback state
    /// must match it before the code is exchanged.
    #[arg(long)]
    state_signature: Option<String>,

    /// Extra key=value query parameter for the authorization redirect (repeatable)
    #[arg(long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();
    Logger::init_logger(&cli.config);

    let exchanger = match ExchangeClientBuilder::new()
        .with_timeout(cli.config.exchange_timeout())
        .build()
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to build token exchange client: {e}");
            std::process::exit(1);
        }
    };

    let settings = StartupSettings {
        secret: cli.config.app_secret().map(SecretString::new),
        providers_allowed: cli.config.auth_providers_allowed(),
        state_length: cli.config.state_length,
    };

    let context = match AuthContext::init(&settings, exchanger, |id| {
        cli.config.auth_config_for(id)
    }) {
        Ok(context) => context,
        Err(e) => {
            error!("Authentication is not configured: {e}");
            std::process::exit(1);
        }
    };
    info!("Available providers: {}", context.provider_ids().join(", "));

    let provider = match context.provider(&cli.provider) {
        Ok(provider) => provider,
        Err(e) => {
            error!("{e}");
            std::process::exit(2);
        }
    };

    let params = CallbackParams::from_query(&cli.callback);
    if let (FlowLeg::Exchange { .. }, Some(signature)) = (params.leg(), &cli.state_signature) {
        let returned = params.state.as_deref().unwrap_or_default();
        if !context.state_guard().verify(returned, signature) {
            error!("Callback state does not match the state issued for this flow");
            std::process::exit(1);
        }
    } else if params.state.is_some() && cli.state_signature.is_none() {
        warn!("No --state-signature given; callback state for {} is not checked", provider.kind());
    }

    let options: RequestOptions = cli.options.into_iter().collect();

    match provider.authenticate(&params, &options).await {
        AuthResponse::Redirect { url, state } => {
            println!("redirect: {url}");
            if let Some(state) = state {
                println!("state: {state}");
                println!("state_signature: {}", context.state_guard().sign(&state));
            }
        }
        AuthResponse::RawPayload(body) => println!("{body}"),
        AuthResponse::Error(message) => {
            error!("Authentication failed: {message}");
            std::process::exit(1);
        }
    }
}
