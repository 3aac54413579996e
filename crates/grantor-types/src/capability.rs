use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

use crate::PlatformVersion;

/// How a capability is obtained from the authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// Granted through a runtime prompt.
    Dangerous,
    /// Granted only from a dedicated settings screen.
    Special,
}

#[derive(Debug)]
struct Entry {
    id: &'static str,
    kind: CapabilityKind,
    since: PlatformVersion,
    legacy: &'static [Capability],
    unreliable_from: Option<PlatformVersion>,
    requires_any_of: &'static [Capability],
}

impl Entry {
    const fn dangerous(id: &'static str) -> Self {
        Self {
            id,
            kind: CapabilityKind::Dangerous,
            since: PlatformVersion::RUNTIME_GRANTS,
            legacy: &[],
            unreliable_from: None,
            requires_any_of: &[],
        }
    }

    const fn special(id: &'static str) -> Self {
        Self {
            kind: CapabilityKind::Special,
            ..Self::dangerous(id)
        }
    }

    const fn since(mut self, version: PlatformVersion) -> Self {
        self.since = version;
        self
    }

    const fn legacy(mut self, legacy: &'static [Capability]) -> Self {
        self.legacy = legacy;
        self
    }

    const fn unreliable_from(mut self, version: PlatformVersion) -> Self {
        self.unreliable_from = Some(version);
        self
    }

    const fn requires_any_of(mut self, required: &'static [Capability]) -> Self {
        self.requires_any_of = required;
        self
    }
}

/// Handle onto a static catalogue entry.
///
/// Capabilities compare, hash and serialize by their id. Any id that is not in
/// the catalogue is rejected when parsing, so a `Capability` value is always
/// backed by catalogue data.
#[derive(Clone, Copy)]
pub struct Capability {
    entry: &'static Entry,
}

macro_rules! catalogue {
    ($($(#[$meta:meta])* $name:ident = $entry:expr;)*) => {
        impl Capability {
            $(
                $(#[$meta])*
                pub const $name: Capability = {
                    const ENTRY: Entry = $entry;
                    Capability { entry: &ENTRY }
                };
            )*
        }

        const ALL: &[Capability] = &[$(Capability::$name),*];
    };
}

catalogue! {
    CALENDAR_READ = Entry::dangerous("calendar.read");
    CALENDAR_WRITE = Entry::dangerous("calendar.write");
    CAMERA = Entry::dangerous("camera");
    CONTACTS_READ = Entry::dangerous("contacts.read");
    CONTACTS_WRITE = Entry::dangerous("contacts.write");
    ACCOUNTS_GET = Entry::dangerous("accounts.get");
    LOCATION_COARSE = Entry::dangerous("location.coarse");
    LOCATION_FINE = Entry::dangerous("location.fine");
    /// Needs a foreground location grant first, and its prompt result is
    /// misreported once the platform splits the background prompt out.
    LOCATION_BACKGROUND = Entry::dangerous("location.background")
        .since(PlatformVersion::BACKGROUND_LOCATION)
        .unreliable_from(PlatformVersion::ALL_FILES_ACCESS)
        .requires_any_of(&[Capability::LOCATION_COARSE, Capability::LOCATION_FINE]);
    LOCATION_MEDIA = Entry::dangerous("location.media")
        .since(PlatformVersion::BACKGROUND_LOCATION);
    MICROPHONE = Entry::dangerous("microphone");
    PHONE_STATE = Entry::dangerous("phone.read_state");
    PHONE_NUMBERS = Entry::dangerous("phone.read_numbers")
        .since(PlatformVersion::APP_SETTINGS_SCREENS)
        .legacy(&[Capability::PHONE_STATE]);
    PHONE_CALL = Entry::dangerous("phone.call");
    PHONE_ANSWER = Entry::dangerous("phone.answer_calls")
        .since(PlatformVersion::APP_SETTINGS_SCREENS);
    PHONE_HANDOVER = Entry::dangerous("phone.accept_handover")
        .since(PlatformVersion::HANDOVER);
    CALL_LOG_READ = Entry::dangerous("call_log.read");
    CALL_LOG_WRITE = Entry::dangerous("call_log.write");
    VOICEMAIL_ADD = Entry::dangerous("voicemail.add");
    SIP_USE = Entry::dangerous("sip.use");
    BODY_SENSORS = Entry::dangerous("sensors.body");
    ACTIVITY_RECOGNITION = Entry::dangerous("activity_recognition")
        .since(PlatformVersion::BACKGROUND_LOCATION)
        .legacy(&[Capability::BODY_SENSORS]);
    SMS_SEND = Entry::dangerous("sms.send");
    SMS_RECEIVE = Entry::dangerous("sms.receive");
    SMS_READ = Entry::dangerous("sms.read");
    WAP_PUSH_RECEIVE = Entry::dangerous("wap_push.receive");
    MMS_RECEIVE = Entry::dangerous("mms.receive");
    STORAGE_READ = Entry::dangerous("storage.read");
    STORAGE_WRITE = Entry::dangerous("storage.write");
    /// Falls back to the plain storage pair on platforms without all-files access.
    STORAGE_MANAGE = Entry::special("storage.manage")
        .since(PlatformVersion::ALL_FILES_ACCESS)
        .legacy(&[Capability::STORAGE_READ, Capability::STORAGE_WRITE]);
    INSTALL_PACKAGES = Entry::special("install_packages")
        .since(PlatformVersion::APP_SETTINGS_SCREENS);
    OVERLAY = Entry::special("overlay");
    NOTIFICATIONS = Entry::special("notifications");
    WRITE_SETTINGS = Entry::special("write_settings");
}

/// Order in which unmet special capabilities are sent to their settings screens.
pub const SPECIAL_NAVIGATION_ORDER: &[Capability] = &[
    Capability::STORAGE_MANAGE,
    Capability::INSTALL_PACKAGES,
    Capability::OVERLAY,
    Capability::NOTIFICATIONS,
    Capability::WRITE_SETTINGS,
];

pub const FOREGROUND_LOCATION: &[Capability] =
    &[Capability::LOCATION_COARSE, Capability::LOCATION_FINE];

static CATALOGUE: Lazy<IndexMap<&'static str, Capability>> =
    Lazy::new(|| ALL.iter().map(|cap| (cap.id(), *cap)).collect());

pub fn catalogue() -> &'static IndexMap<&'static str, Capability> {
    &CATALOGUE
}

pub fn find(id: &str) -> Option<Capability> {
    CATALOGUE.get(id).copied()
}

impl Capability {
    pub fn id(self) -> &'static str {
        self.entry.id
    }

    pub fn kind(self) -> CapabilityKind {
        self.entry.kind
    }

    pub fn is_special(self) -> bool {
        self.entry.kind == CapabilityKind::Special
    }

    /// First platform revision that knows about this capability.
    pub fn since(self) -> PlatformVersion {
        self.entry.since
    }

    /// Capabilities checked in place of this one below [`Capability::since`].
    /// Empty means the capability is implicitly granted there.
    pub fn legacy(self) -> &'static [Capability] {
        self.entry.legacy
    }

    pub fn requires_any_of(self) -> &'static [Capability] {
        self.entry.requires_any_of
    }

    pub fn is_supported_on(self, platform: PlatformVersion) -> bool {
        platform.at_least(self.entry.since)
    }

    /// Whether a raw prompt result for this capability can be taken at face
    /// value on `platform`.
    pub fn reports_reliably_on(self, platform: PlatformVersion) -> bool {
        if !self.is_supported_on(platform) {
            return false;
        }
        match self.entry.unreliable_from {
            Some(version) => platform < version,
            None => true,
        }
    }
}

impl PartialEq for Capability {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Capability {}

impl Hash for Capability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl PartialOrd for Capability {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Capability {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(other.id())
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Capability").field(&self.id()).finish()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl AsRef<str> for Capability {
    fn as_ref(&self) -> &str {
        self.id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown capability '{0}'")]
pub struct UnknownCapability(pub String);

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find(s).ok_or_else(|| UnknownCapability(s.to_owned()))
    }
}

impl TryFrom<&str> for Capability {
    type Error = UnknownCapability;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Capability {
    type Error = UnknownCapability;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        id.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_ids_are_unique() {
        assert_eq!(catalogue().len(), ALL.len());
    }

    #[test]
    fn parse_known_and_unknown_ids() {
        let camera: Capability = "camera".parse().unwrap();
        assert_eq!(camera, Capability::CAMERA);
        assert_eq!(camera.kind(), CapabilityKind::Dangerous);

        let err = "teleport".parse::<Capability>().unwrap_err();
        assert_eq!(err, UnknownCapability("teleport".into()));
    }

    #[test]
    fn specials_are_exactly_the_navigation_order() {
        let specials: Vec<_> = catalogue()
            .values()
            .copied()
            .filter(|cap| cap.is_special())
            .collect();
        assert_eq!(specials.len(), SPECIAL_NAVIGATION_ORDER.len());
        for cap in specials {
            assert!(SPECIAL_NAVIGATION_ORDER.contains(&cap), "{cap} missing");
        }
    }

    #[test]
    fn legacy_fallbacks_predate_their_capability() {
        for cap in catalogue().values() {
            for legacy in cap.legacy() {
                assert!(legacy.since() < cap.since(), "{legacy} for {cap}");
            }
        }
    }

    #[test]
    fn background_location_reliability_window() {
        let cap = Capability::LOCATION_BACKGROUND;
        assert!(!cap.reports_reliably_on(PlatformVersion::new(28)));
        assert!(cap.reports_reliably_on(PlatformVersion::new(29)));
        assert!(!cap.reports_reliably_on(PlatformVersion::new(30)));
        assert_eq!(cap.requires_any_of(), FOREGROUND_LOCATION);
    }

    #[test]
    fn serializes_as_id() {
        let json = serde_json::to_string(&vec![Capability::MICROPHONE, Capability::OVERLAY]).unwrap();
        assert_eq!(json, r#"["microphone","overlay"]"#);
        let back: Vec<Capability> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Capability::MICROPHONE, Capability::OVERLAY]);
        assert!(serde_json::from_str::<Capability>(r#""nope""#).is_err());
    }
}
