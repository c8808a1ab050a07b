//! Authorization code flow: provider abstraction, parameter mapping and
//! anti-forgery state.

pub mod authorizer;
mod params;
pub(crate) mod provider;
mod state;

pub mod providers;

pub use authorizer::{Authorizer, ScopeFormat};
pub use params::Params;
pub use provider::{
    AuthResponse, CallbackParams, FlowLeg, Provider, ProviderSupport, RequestOptions,
};
pub use state::{AuthState, StateGenerator, StateGuard, DEFAULT_STATE_LENGTH, MIN_STATE_LENGTH};
