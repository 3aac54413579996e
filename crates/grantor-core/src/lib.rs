//! Capability request orchestration.
//!
//! A [`Grantor`] takes a set of capabilities, walks the user through the
//! settings screens and runtime prompts a host platform needs to grant them,
//! and reports one consolidated outcome to a [`PermissionCallback`].

mod arena;
mod config;
mod correlation;
mod error;
mod facade;
mod host;
mod interceptor;
mod orchestrator;
mod query;

pub mod settings;

#[cfg(test)]
mod fake;

pub use arena::{Delivery, SignalSink};
pub use config::GrantorConfig;
pub use correlation::{CorrelationIds, EntropySource, OsEntropy};
pub use error::{GrantorError, HostError};
pub use facade::{Grantor, GrantorBuilder, IntoCapability, RequestBuilder};
pub use host::{Authority, HostContext, HostHandle};
pub use interceptor::{DefaultInterceptor, Interceptor, PermissionCallback, Proceed};
pub use orchestrator::{Completion, Outcome, Phase};
pub use query::AccessQuery;
pub use settings::{DefaultSettings, SettingsResolver};

pub use grantor_types as types;
