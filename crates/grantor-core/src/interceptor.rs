use std::sync::Arc;

use async_trait::async_trait;
use grantor_types::{Capability, CorrelationId};

use crate::host::{HostContext, HostHandle};
use crate::orchestrator::{Completion, Orchestrator};

/// Caller-supplied receiver of a request's outcome.
pub trait PermissionCallback: Send + Sync {
    /// `all` is true when every requested capability was granted.
    fn on_granted(&self, capabilities: &[Capability], all: bool);

    /// `never` is true when at least one of `capabilities` is permanently denied.
    fn on_denied(&self, capabilities: &[Capability], never: bool) {
        let _ = (capabilities, never);
    }
}

/// Hooks around a request. Every method defaults to plain forwarding.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Called once before the request starts talking to the host. Overrides may
    /// show their own explanation first, but must eventually run `proceed` or
    /// report how they resolved the request. Dropping `proceed` means the
    /// callback never fires.
    async fn request_capabilities(&self, host: &HostHandle, proceed: Proceed) -> Completion {
        let _ = host;
        proceed.run().await
    }

    async fn granted(
        &self,
        host: &Arc<dyn HostContext>,
        callback: &dyn PermissionCallback,
        capabilities: &[Capability],
        all: bool,
    ) {
        let _ = host;
        callback.on_granted(capabilities, all);
    }

    async fn denied(
        &self,
        host: &Arc<dyn HostContext>,
        callback: &dyn PermissionCallback,
        capabilities: &[Capability],
        never: bool,
    ) {
        let _ = host;
        callback.on_denied(capabilities, never);
    }
}

#[async_trait]
impl<I: Interceptor + ?Sized> Interceptor for Arc<I> {
    async fn request_capabilities(&self, host: &HostHandle, proceed: Proceed) -> Completion {
        (**self).request_capabilities(host, proceed).await
    }

    async fn granted(
        &self,
        host: &Arc<dyn HostContext>,
        callback: &dyn PermissionCallback,
        capabilities: &[Capability],
        all: bool,
    ) {
        (**self).granted(host, callback, capabilities, all).await
    }

    async fn denied(
        &self,
        host: &Arc<dyn HostContext>,
        callback: &dyn PermissionCallback,
        capabilities: &[Capability],
        never: bool,
    ) {
        (**self).denied(host, callback, capabilities, never).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultInterceptor;

impl Interceptor for DefaultInterceptor {}

/// Permission to run a prepared request.
pub struct Proceed {
    orchestrator: Orchestrator,
}

impl Proceed {
    pub(crate) fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }

    pub fn capabilities(&self) -> &[Capability] {
        self.orchestrator.capabilities()
    }

    pub fn id(&self) -> CorrelationId {
        self.orchestrator.id()
    }

    pub async fn run(self) -> Completion {
        self.orchestrator.run().await
    }
}

impl std::fmt::Debug for Proceed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proceed")
            .field("id", &self.id())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
