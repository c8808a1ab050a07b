//! HTTP plumbing for the token exchange leg.

mod client;

pub use client::{ExchangeClient, ExchangeClientBuilder, HttpClientConfig, TokenExchanger};
