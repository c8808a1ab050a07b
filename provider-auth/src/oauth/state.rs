//! Anti-forgery state generation and signing.

use std::fmt;

use hmac::{Hmac, Mac};
use rand::distributions::Uniform;
use rand::Rng;
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

use crate::error::{config_error, ConfigErrorKind, Error};

type HmacSha256 = Hmac<Sha256>;

/// Default number of characters in a generated state token (~150 bits).
pub const DEFAULT_STATE_LENGTH: usize = 32;

/// Shortest state token the generator will produce.
pub const MIN_STATE_LENGTH: usize = 16;

/// Opaque anti-forgery token round-tripped through the authorization redirect.
///
/// The caller stores it in its session before redirecting and compares it with
/// the `state` returned on the callback before starting the exchange leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuthState(String);

impl AuthState {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates fixed-length state tokens drawn from `A-Z`.
///
/// Entropy comes from `rand::thread_rng()`, a CSPRNG seeded from the operating
/// system once per thread, so concurrent callers never share RNG state and no
/// call reseeds from the clock.
#[derive(Debug, Clone, Copy)]
pub struct StateGenerator {
    length: usize,
}

impl StateGenerator {
    /// Create a generator producing tokens of `length` characters.
    ///
    /// Lengths below [`MIN_STATE_LENGTH`] are raised to it.
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(MIN_STATE_LENGTH),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Generate a fresh state token.
    pub fn generate(&self) -> AuthState {
        let alphabet = Uniform::new_inclusive(b'A', b'Z');
        let token: String = rand::thread_rng()
            .sample_iter(alphabet)
            .take(self.length)
            .map(char::from)
            .collect();
        AuthState(token)
    }
}

impl Default for StateGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_LENGTH)
    }
}

/// Signs state tokens with the process-wide secret.
///
/// Lets a host keep `state` and its signature in a client-side cookie instead
/// of server-side session storage, and re-check the pair when the callback
/// arrives.
#[derive(Clone)]
pub struct StateGuard {
    mac: HmacSha256,
}

impl StateGuard {
    /// Create a guard keyed with the process-wide secret.
    pub fn new(secret: &SecretString) -> Result<Self, Error> {
        let key = secret.expose_secret();
        if key.is_empty() {
            return Err(config_error(
                ConfigErrorKind::Missing,
                "state signing secret is empty",
            ));
        }
        let mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|_| {
            config_error(ConfigErrorKind::InvalidField, "Invalid HMAC key")
        })?;
        Ok(Self { mac })
    }

    /// Hex-encoded HMAC-SHA256 of `state`.
    pub fn sign(&self, state: &AuthState) -> String {
        let mut mac = self.mac.clone();
        mac.update(state.as_str().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Check `signature` against `state` in constant time.
    pub fn verify(&self, state: &str, signature: &str) -> bool {
        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let mut mac = self.mac.clone();
        mac.update(state.as_bytes());
        mac.verify_slice(&expected).is_ok()
    }
}
