use grantor_types::{Capability, CorrelationId, NavigationIntent, NavigationTarget, PlatformVersion};
use tracing::debug;

use crate::error::HostError;
use crate::host::HostContext;

/// Maps a special capability to the settings screen that grants it.
pub trait SettingsResolver: Send + Sync {
    fn resolve(&self, capability: Capability, host: &dyn HostContext) -> NavigationTarget;
}

/// Dedicated screens and the platform revision that introduced each.
const SCREENS: &[(Capability, NavigationTarget, PlatformVersion)] = &[
    (
        Capability::STORAGE_MANAGE,
        NavigationTarget::AllFilesAccess,
        PlatformVersion::ALL_FILES_ACCESS,
    ),
    (
        Capability::INSTALL_PACKAGES,
        NavigationTarget::UnknownAppSources,
        PlatformVersion::APP_SETTINGS_SCREENS,
    ),
    (
        Capability::OVERLAY,
        NavigationTarget::OverlayPermission,
        PlatformVersion::RUNTIME_GRANTS,
    ),
    (
        Capability::NOTIFICATIONS,
        NavigationTarget::NotificationSettings,
        PlatformVersion::APP_SETTINGS_SCREENS,
    ),
    (
        Capability::WRITE_SETTINGS,
        NavigationTarget::WriteSettings,
        PlatformVersion::RUNTIME_GRANTS,
    ),
];

/// Picks the dedicated screen when the platform has it and the host can open
/// it, the app details page otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSettings;

impl SettingsResolver for DefaultSettings {
    fn resolve(&self, capability: Capability, host: &dyn HostContext) -> NavigationTarget {
        let platform = host.platform();
        let dedicated = SCREENS
            .iter()
            .find(|(cap, _, _)| *cap == capability)
            .filter(|(_, _, since)| platform.at_least(*since))
            .map(|(_, target, _)| *target)
            .filter(|target| host.can_open(*target));
        match dedicated {
            Some(target) => target,
            None => {
                debug!(%capability, %platform, "no dedicated settings screen, using app details");
                NavigationTarget::AppDetails
            }
        }
    }
}

/// Best single screen for a set of capabilities, typically the ones a request
/// left denied.
pub fn smart_target(
    resolver: &dyn SettingsResolver,
    host: &dyn HostContext,
    capabilities: &[Capability],
) -> NavigationTarget {
    if !capabilities.iter().any(|cap| cap.is_special()) {
        return NavigationTarget::AppDetails;
    }
    let storage_trio = [
        Capability::STORAGE_MANAGE,
        Capability::STORAGE_READ,
        Capability::STORAGE_WRITE,
    ];
    if host.platform().at_least(PlatformVersion::ALL_FILES_ACCESS)
        && capabilities.len() == storage_trio.len()
        && storage_trio.iter().all(|cap| capabilities.contains(cap))
    {
        return resolver.resolve(Capability::STORAGE_MANAGE, host);
    }
    match capabilities {
        [single] => resolver.resolve(*single, host),
        _ => NavigationTarget::AppDetails,
    }
}

/// Open the best settings screen for `capabilities` outside of any request.
/// The return arrives under [`CorrelationId::MANUAL_NAVIGATION`] and is never
/// routed to a request.
pub fn open_settings(
    resolver: &dyn SettingsResolver,
    host: &dyn HostContext,
    capabilities: &[Capability],
) -> Result<NavigationTarget, HostError> {
    if !host.is_alive() {
        return Err(HostError::Destroyed);
    }
    let target = smart_target(resolver, host, capabilities);
    let capability = match capabilities {
        [single] => Some(*single),
        _ => None,
    };
    host.navigate_to_settings(NavigationIntent {
        id: CorrelationId::MANUAL_NAVIGATION,
        target,
        capability,
    })?;
    debug!(%target, "opened settings manually");
    Ok(target)
}
