//! Capabilities that are usually requested together.

use crate::Capability;

pub const CALENDAR: &[Capability] = &[Capability::CALENDAR_READ, Capability::CALENDAR_WRITE];

pub const CONTACTS: &[Capability] = &[
    Capability::CONTACTS_READ,
    Capability::CONTACTS_WRITE,
    Capability::ACCOUNTS_GET,
];

/// Foreground location only. Background location has to be asked for on top.
pub const LOCATION: &[Capability] = &[Capability::LOCATION_COARSE, Capability::LOCATION_FINE];

pub const STORAGE: &[Capability] = &[Capability::STORAGE_READ, Capability::STORAGE_WRITE];

pub const PHONE: &[Capability] = &[
    Capability::PHONE_STATE,
    Capability::PHONE_CALL,
    Capability::PHONE_NUMBERS,
    Capability::PHONE_ANSWER,
    Capability::VOICEMAIL_ADD,
    Capability::SIP_USE,
    Capability::PHONE_HANDOVER,
];

pub const CALL_LOG: &[Capability] = &[Capability::CALL_LOG_READ, Capability::CALL_LOG_WRITE];

pub const SENSORS: &[Capability] = &[Capability::BODY_SENSORS];

pub const SMS: &[Capability] = &[
    Capability::SMS_SEND,
    Capability::SMS_RECEIVE,
    Capability::SMS_READ,
    Capability::WAP_PUSH_RECEIVE,
    Capability::MMS_RECEIVE,
];

/// Looks a group up by its lowercase name.
pub fn by_name(name: &str) -> Option<&'static [Capability]> {
    let group = match name {
        "calendar" => CALENDAR,
        "contacts" => CONTACTS,
        "location" => LOCATION,
        "storage" => STORAGE,
        "phone" => PHONE,
        "call_log" => CALL_LOG,
        "sensors" => SENSORS,
        "sms" => SMS,
        _ => return None,
    };
    Some(group)
}
