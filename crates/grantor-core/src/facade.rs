use std::sync::Arc;

use grantor_types::{Capability, NavigationTarget, PlatformVersion, UnknownCapability};
use tracing::{debug, info};

use crate::arena::{Arena, SignalSink};
use crate::config::GrantorConfig;
use crate::correlation::{EntropySource, OsEntropy};
use crate::error::{GrantorError, HostError};
use crate::host::{Authority, HostContext, HostHandle};
use crate::interceptor::{DefaultInterceptor, Interceptor, PermissionCallback, Proceed};
use crate::orchestrator::{Completion, Orchestrator};
use crate::query::AccessQuery;
use crate::settings::{self, DefaultSettings, SettingsResolver};

/// Anything that names a catalogue capability.
pub trait IntoCapability {
    fn into_capability(self) -> Result<Capability, UnknownCapability>;
}

impl IntoCapability for Capability {
    fn into_capability(self) -> Result<Capability, UnknownCapability> {
        Ok(self)
    }
}

impl IntoCapability for &Capability {
    fn into_capability(self) -> Result<Capability, UnknownCapability> {
        Ok(*self)
    }
}

impl IntoCapability for &str {
    fn into_capability(self) -> Result<Capability, UnknownCapability> {
        self.parse()
    }
}

impl IntoCapability for String {
    fn into_capability(self) -> Result<Capability, UnknownCapability> {
        self.parse()
    }
}

impl IntoCapability for &String {
    fn into_capability(self) -> Result<Capability, UnknownCapability> {
        self.parse()
    }
}

/// Entry point for capability requests. Cheap to clone; clones share the
/// correlation id space.
#[derive(Clone)]
pub struct Grantor {
    config: GrantorConfig,
    interceptor: Arc<dyn Interceptor>,
    settings: Arc<dyn SettingsResolver>,
    arena: Arc<Arena>,
}

impl Grantor {
    pub fn new(config: GrantorConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> GrantorBuilder {
        GrantorBuilder::default()
    }

    pub fn config(&self) -> &GrantorConfig {
        &self.config
    }

    /// Handle hosts use to deliver navigation returns and prompt results.
    pub fn signal_sink(&self) -> SignalSink {
        SignalSink::new(Arc::clone(&self.arena))
    }

    pub fn with_context<H: HostContext + 'static>(&self, host: &Arc<H>) -> RequestBuilder<'_> {
        self.request_on(HostHandle::new(host))
    }

    /// Same as [`Grantor::with_context`] for an already type-erased host, such
    /// as the one interceptors are handed.
    pub fn with_host(&self, host: &Arc<dyn HostContext>) -> RequestBuilder<'_> {
        self.request_on(HostHandle::from_dyn(host))
    }

    fn request_on(&self, host: HostHandle) -> RequestBuilder<'_> {
        RequestBuilder {
            grantor: self,
            host,
            requested: Vec::new(),
            interceptor: None,
        }
    }

    pub fn query<'a, A: Authority + ?Sized>(&self, authority: &'a A) -> AccessQuery<'a, A> {
        AccessQuery::new(authority)
    }

    /// Send the user to the settings screen that best fits `capabilities`.
    pub fn open_settings(
        &self,
        host: &dyn HostContext,
        capabilities: &[Capability],
    ) -> Result<NavigationTarget, HostError> {
        settings::open_settings(self.settings.as_ref(), host, capabilities)
    }
}

impl Default for Grantor {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl std::fmt::Debug for Grantor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grantor")
            .field("config", &self.config)
            .field("in_flight", &self.signal_sink().in_flight())
            .finish()
    }
}

#[derive(Default)]
pub struct GrantorBuilder {
    config: GrantorConfig,
    interceptor: Option<Arc<dyn Interceptor>>,
    settings: Option<Arc<dyn SettingsResolver>>,
    entropy: Option<Arc<dyn EntropySource>>,
}

impl GrantorBuilder {
    pub fn config(mut self, config: GrantorConfig) -> Self {
        self.config = config;
        self
    }

    /// Interceptor used by requests that do not bring their own.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    pub fn settings(mut self, settings: impl SettingsResolver + 'static) -> Self {
        self.settings = Some(Arc::new(settings));
        self
    }

    pub fn entropy(mut self, entropy: impl EntropySource + 'static) -> Self {
        self.entropy = Some(Arc::new(entropy));
        self
    }

    pub fn build(self) -> Grantor {
        let entropy = self.entropy.unwrap_or_else(|| Arc::new(OsEntropy));
        Grantor {
            arena: Arena::new(entropy, self.config.liveness_interval),
            interceptor: self
                .interceptor
                .unwrap_or_else(|| Arc::new(DefaultInterceptor)),
            settings: self.settings.unwrap_or_else(|| Arc::new(DefaultSettings)),
            config: self.config,
        }
    }
}

/// One request being put together against a host.
pub struct RequestBuilder<'g> {
    grantor: &'g Grantor,
    host: HostHandle,
    requested: Vec<Result<Capability, UnknownCapability>>,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl RequestBuilder<'_> {
    pub fn capability(mut self, capability: impl IntoCapability) -> Self {
        self.requested.push(capability.into_capability());
        self
    }

    pub fn capabilities<I>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator,
        I::Item: IntoCapability,
    {
        self.requested
            .extend(capabilities.into_iter().map(IntoCapability::into_capability));
        self
    }

    /// Use `interceptor` for this request instead of the grantor's default.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    /// Run the request. Configuration problems are returned before anything
    /// happens; everything after that is reported through `callback` and the
    /// returned [`Completion`].
    pub async fn request(
        self,
        callback: impl PermissionCallback + 'static,
    ) -> Result<Completion, GrantorError> {
        let host = self.host.upgrade().ok_or(GrantorError::HostUnavailable)?;
        let capabilities = resolve(self.requested, host.platform(), self.grantor.config.strict)?;

        if AccessQuery::new(host.as_ref()).is_granted_all(&capabilities) {
            info!(?capabilities, "already granted");
            callback.on_granted(&capabilities, true);
            return Ok(Completion::AlreadyGranted);
        }
        drop(host);

        let grantor = self.grantor;
        let slot = grantor.arena.lease()?;
        debug!(id = %slot.id(), ?capabilities, "starting request");
        let interceptor = self
            .interceptor
            .unwrap_or_else(|| Arc::clone(&grantor.interceptor));
        let orchestrator = Orchestrator::new(
            self.host.clone(),
            slot,
            capabilities,
            Box::new(callback),
            Arc::clone(&interceptor),
            Arc::clone(&grantor.settings),
            grantor.config.settle_delay,
        );
        Ok(interceptor
            .request_capabilities(&self.host, Proceed::new(orchestrator))
            .await)
    }
}

/// Validate and de-duplicate the requested ids, keeping first occurrences in order.
fn resolve(
    requested: Vec<Result<Capability, UnknownCapability>>,
    platform: PlatformVersion,
    strict: bool,
) -> Result<Vec<Capability>, GrantorError> {
    if requested.is_empty() {
        return Err(GrantorError::EmptyRequest);
    }
    let mut capabilities: Vec<Capability> = Vec::with_capacity(requested.len());
    for capability in requested {
        let capability = capability?;
        if capabilities.contains(&capability) {
            if strict {
                return Err(GrantorError::DuplicateCapability(capability));
            }
            debug!(%capability, "dropping duplicate capability");
            continue;
        }
        capabilities.push(capability);
    }
    if strict {
        for capability in &capabilities {
            let required = capability.requires_any_of();
            if required.is_empty() || !capability.is_supported_on(platform) {
                continue;
            }
            if !required.iter().any(|cap| capabilities.contains(cap)) {
                return Err(GrantorError::MissingPrerequisite {
                    capability: *capability,
                    required,
                });
            }
        }
    }
    Ok(capabilities)
}
