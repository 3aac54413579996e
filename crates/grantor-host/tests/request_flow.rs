mod helpers;

use std::sync::Arc;

use grantor_core::{Completion, Delivery};
use grantor_host::{HostEvent, ResponseMode, UserScript};
use grantor_types::{Capability, CapabilityStatus, NavigationTarget, Orientation};
use helpers::{Call, Recorder, setup, wait_for_pending};

#[tokio::test]
async fn already_granted_calls_back_without_host_work() {
    let (grantor, host) = setup(33);
    host.grant(Capability::CAMERA);
    let recorder = Recorder::default();

    let completion = grantor
        .with_context(&host)
        .capability("camera")
        .request(recorder.clone())
        .await
        .unwrap();

    assert_eq!(completion, Completion::AlreadyGranted);
    assert_eq!(
        recorder.calls(),
        vec![Call::Granted(vec![Capability::CAMERA], true)]
    );
    assert!(host.journal().is_empty());
}

#[tokio::test]
async fn camera_denied_then_denied_for_good() {
    let (grantor, host) = setup(33);

    host.set_script(UserScript::new().deny(Capability::CAMERA));
    let first = Recorder::default();
    grantor
        .with_context(&host)
        .capability(Capability::CAMERA)
        .request(first.clone())
        .await
        .unwrap();
    assert_eq!(
        first.calls(),
        vec![Call::Denied(vec![Capability::CAMERA], false)]
    );

    host.set_script(UserScript::new().deny_always(Capability::CAMERA));
    let second = Recorder::default();
    grantor
        .with_context(&host)
        .capability(Capability::CAMERA)
        .request(second.clone())
        .await
        .unwrap();
    assert_eq!(
        second.calls(),
        vec![Call::Denied(vec![Capability::CAMERA], true)]
    );
    assert_eq!(
        grantor.query(host.as_ref()).status(Capability::CAMERA),
        CapabilityStatus::PermanentlyDenied
    );
}

#[tokio::test]
async fn mixed_outcome_reports_denied_before_granted() {
    let (grantor, host) = setup(33);
    host.grant(Capability::CAMERA);
    host.deny_permanently(Capability::MICROPHONE);
    let recorder = Recorder::default();

    let completion = grantor
        .with_context(&host)
        .capabilities(["camera", "microphone"])
        .request(recorder.clone())
        .await
        .unwrap();

    assert_eq!(
        recorder.calls(),
        vec![
            Call::Denied(vec![Capability::MICROPHONE], true),
            Call::Granted(vec![Capability::CAMERA], false),
        ]
    );
    let Completion::Dispatched(outcome) = completion else {
        panic!("expected a dispatched outcome, got {completion:?}");
    };
    assert!(outcome.never);
    assert_eq!(host.prompts().len(), 1);
}

#[tokio::test]
async fn every_request_dispatches_once() {
    let (grantor, host) = setup(33);
    host.set_script(
        UserScript::new()
            .allow(Capability::CONTACTS_READ)
            .deny(Capability::CONTACTS_WRITE),
    );
    let recorder = Recorder::default();

    grantor
        .with_context(&host)
        .capabilities(grantor_types::group::CONTACTS)
        .request(recorder.clone())
        .await
        .unwrap();

    let calls = recorder.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        calls[0],
        Call::Denied(vec![Capability::CONTACTS_WRITE, Capability::ACCOUNTS_GET], false)
    );
    assert_eq!(calls[1], Call::Granted(vec![Capability::CONTACTS_READ], false));
}

#[tokio::test]
async fn capability_newer_than_platform_counts_as_granted() {
    let (grantor, host) = setup(28);
    host.set_script(UserScript::new().allow(Capability::CAMERA));
    let recorder = Recorder::default();

    grantor
        .with_context(&host)
        .capabilities([Capability::LOCATION_MEDIA, Capability::CAMERA])
        .request(recorder.clone())
        .await
        .unwrap();

    // The host reported the unknown capability as denied; the re-query wins.
    assert_eq!(
        recorder.calls(),
        vec![Call::Granted(
            vec![Capability::LOCATION_MEDIA, Capability::CAMERA],
            true
        )]
    );
    let query = grantor.query(host.as_ref());
    assert!(query.is_granted(Capability::LOCATION_MEDIA));
    assert!(!query.is_permanently_denied(Capability::LOCATION_MEDIA));
}

#[tokio::test]
async fn legacy_delegate_answers_for_newer_capability() {
    let (grantor, host) = setup(25);
    host.set_script(UserScript::new().allow(Capability::PHONE_STATE));
    host.grant(Capability::PHONE_STATE);
    let recorder = Recorder::default();

    let completion = grantor
        .with_context(&host)
        .capability(Capability::PHONE_NUMBERS)
        .request(recorder.clone())
        .await
        .unwrap();

    assert_eq!(completion, Completion::AlreadyGranted);
    assert_eq!(
        recorder.calls(),
        vec![Call::Granted(vec![Capability::PHONE_NUMBERS], true)]
    );
}

#[tokio::test]
async fn next_settings_screen_waits_for_previous_return() {
    let (grantor, host) = setup(33);
    host.set_mode(ResponseMode::Manual);
    host.set_script(
        UserScript::new()
            .allow(Capability::WRITE_SETTINGS)
            .allow(Capability::OVERLAY),
    );
    let recorder = Recorder::default();

    let task = {
        let grantor = grantor.clone();
        let host = Arc::clone(&host);
        let recorder = recorder.clone();
        tokio::spawn(async move {
            grantor
                .with_context(&host)
                .capabilities([Capability::WRITE_SETTINGS, Capability::OVERLAY])
                .request(recorder)
                .await
        })
    };

    wait_for_pending(&host, 1).await;
    let targets: Vec<_> = host.navigations().iter().map(|nav| nav.target).collect();
    assert_eq!(targets, vec![NavigationTarget::OverlayPermission]);
    assert!(recorder.calls().is_empty());

    assert_eq!(host.respond_next(), Some(Delivery::Routed));
    wait_for_pending(&host, 1).await;
    let targets: Vec<_> = host.navigations().iter().map(|nav| nav.target).collect();
    assert_eq!(
        targets,
        vec![
            NavigationTarget::OverlayPermission,
            NavigationTarget::WriteSettings
        ]
    );
    assert!(recorder.calls().is_empty());

    assert_eq!(host.respond_next(), Some(Delivery::Routed));
    let completion = task.await.unwrap().unwrap();
    assert!(matches!(completion, Completion::Dispatched(_)));
    assert_eq!(
        recorder.calls(),
        vec![Call::Granted(
            vec![Capability::WRITE_SETTINGS, Capability::OVERLAY],
            true
        )]
    );
    assert!(host.prompts().is_empty());
    assert_eq!(host.navigations().len(), 2);
}

#[tokio::test]
async fn special_screens_open_one_at_a_time_in_priority_order() {
    let (grantor, host) = setup(33);
    host.set_script(
        UserScript::new()
            .allow(Capability::WRITE_SETTINGS)
            .allow(Capability::OVERLAY)
            .allow(Capability::CAMERA),
    );
    let recorder = Recorder::default();

    grantor
        .with_context(&host)
        .capabilities([
            Capability::WRITE_SETTINGS,
            Capability::CAMERA,
            Capability::OVERLAY,
        ])
        .request(recorder.clone())
        .await
        .unwrap();

    let targets: Vec<_> = host.navigations().iter().map(|nav| nav.target).collect();
    assert_eq!(
        targets,
        vec![
            NavigationTarget::OverlayPermission,
            NavigationTarget::WriteSettings
        ]
    );
    let prompts = host.prompts();
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].capabilities, vec![Capability::CAMERA]);
    assert_eq!(
        recorder.calls(),
        vec![Call::Granted(
            vec![
                Capability::WRITE_SETTINGS,
                Capability::CAMERA,
                Capability::OVERLAY
            ],
            true
        )]
    );
}

#[tokio::test]
async fn refused_special_is_never_permanent() {
    let (grantor, host) = setup(33);
    let recorder = Recorder::default();

    let completion = grantor
        .with_context(&host)
        .capability(Capability::NOTIFICATIONS)
        .request(recorder.clone())
        .await
        .unwrap();

    assert_eq!(
        recorder.calls(),
        vec![Call::Denied(vec![Capability::NOTIFICATIONS], false)]
    );
    // Only special capabilities, so no prompt at all.
    assert!(host.prompts().is_empty());
    assert_eq!(host.navigations().len(), 1);
    assert!(matches!(completion, Completion::Dispatched(_)));
}

#[tokio::test]
async fn unavailable_screen_falls_back_to_app_details() {
    let (grantor, host) = setup(33);
    host.make_unavailable(NavigationTarget::OverlayPermission);
    host.set_script(UserScript::new().allow(Capability::OVERLAY));
    let recorder = Recorder::default();

    grantor
        .with_context(&host)
        .capability(Capability::OVERLAY)
        .request(recorder.clone())
        .await
        .unwrap();

    assert_eq!(host.navigations()[0].target, NavigationTarget::AppDetails);
    assert_eq!(
        recorder.calls(),
        vec![Call::Granted(vec![Capability::OVERLAY], true)]
    );
}

#[tokio::test]
async fn unspecified_orientation_is_locked_and_restored() {
    let (grantor, host) = setup(33);
    host.set_display_orientation(Orientation::Landscape);

    grantor
        .with_context(&host)
        .capability(Capability::CAMERA)
        .request(Recorder::default())
        .await
        .unwrap();

    let orientations: Vec<_> = host
        .journal()
        .into_iter()
        .filter_map(|event| match event {
            HostEvent::OrientationSet { orientation } => Some(orientation),
            _ => None,
        })
        .collect();
    assert_eq!(
        orientations,
        vec![Orientation::Landscape, Orientation::Unspecified]
    );
    assert_eq!(host_requested(&host), Orientation::Unspecified);
}

#[tokio::test]
async fn explicit_orientation_is_left_alone() {
    let (grantor, host) = setup(33);
    grantor_core::HostContext::set_requested_orientation(host.as_ref(), Orientation::Portrait)
        .unwrap();

    grantor
        .with_context(&host)
        .capability(Capability::CAMERA)
        .request(Recorder::default())
        .await
        .unwrap();

    let sets = host
        .journal()
        .iter()
        .filter(|event| matches!(event, HostEvent::OrientationSet { .. }))
        .count();
    assert_eq!(sets, 1);
    assert_eq!(host_requested(&host), Orientation::Portrait);
}

#[tokio::test]
async fn strict_mode_rejects_duplicates() {
    let mut config = helpers::test_config();
    config.strict = true;
    let grantor = grantor_core::Grantor::new(config);
    let host = grantor_host::SimulatedHost::new(33, grantor.signal_sink());
    let recorder = Recorder::default();

    let result = grantor
        .with_context(&host)
        .capabilities(["camera", "camera"])
        .request(recorder.clone())
        .await;

    assert!(matches!(
        result,
        Err(grantor_core::GrantorError::DuplicateCapability(_))
    ));
    assert!(recorder.calls().is_empty());
    assert!(host.journal().is_empty());
}

fn host_requested(host: &grantor_host::SimulatedHost) -> Orientation {
    grantor_core::HostContext::requested_orientation(host)
}
