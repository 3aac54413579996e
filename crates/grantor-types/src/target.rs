use serde::{Deserialize, Serialize};
use std::fmt;

/// Settings screen the host can be asked to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTarget {
    AllFilesAccess,
    UnknownAppSources,
    OverlayPermission,
    NotificationSettings,
    WriteSettings,
    /// Generic per-app details page. Always available.
    AppDetails,
}

impl fmt::Display for NavigationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NavigationTarget::AllFilesAccess => "all_files_access",
            NavigationTarget::UnknownAppSources => "unknown_app_sources",
            NavigationTarget::OverlayPermission => "overlay_permission",
            NavigationTarget::NotificationSettings => "notification_settings",
            NavigationTarget::WriteSettings => "write_settings",
            NavigationTarget::AppDetails => "app_details",
        };
        f.write_str(name)
    }
}
