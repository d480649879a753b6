// Scenario tests for source selection, permission flow and stale-result gating.

use parallax_core::*;

fn handheld(needs_permission: bool) -> Capabilities {
    Capabilities {
        touch_capable: true,
        has_orientation_sensor: true,
        orientation_needs_permission: needs_permission,
        has_camera_api: true,
        prefers_reduced_motion: false,
        viewport: [390.0, 844.0],
    }
}

fn desktop(camera: bool) -> Capabilities {
    Capabilities {
        touch_capable: false,
        has_orientation_sensor: false,
        orientation_needs_permission: false,
        has_camera_api: camera,
        prefers_reduced_motion: false,
        viewport: [1280.0, 800.0],
    }
}

fn arbitrator(caps: Capabilities) -> Arbitrator {
    let mut a = Arbitrator::new(TrackingConfig::default(), caps);
    a.setup();
    a
}

fn take_token(effects: Vec<Effect>) -> Option<PermissionToken> {
    effects.into_iter().find_map(|e| match e {
        Effect::PromptPermission(t) => Some(t),
        _ => None,
    })
}

fn settle_ticket(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|e| match e {
        Effect::ScheduleSettle { ticket, .. } => Some(*ticket),
        _ => None,
    })
}

fn face_ticket(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|e| match e {
        Effect::StartFace { ticket } => Some(*ticket),
        _ => None,
    })
}

fn orientation_ticket(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|e| match e {
        Effect::StartOrientation { ticket } => Some(*ticket),
        _ => None,
    })
}

/// Desktop arbitrator that has finished starting the face estimator.
fn desktop_with_face() -> (Arbitrator, u64) {
    let mut a = arbitrator(desktop(true));
    let settle = settle_ticket(&a.take_effects()).unwrap();
    a.handle(Message::SettleElapsed { ticket: settle });
    let face = face_ticket(&a.take_effects()).unwrap();
    a.handle(Message::StartResolved {
        source: Source::Face,
        ticket: face,
        ok: true,
    });
    a.take_effects();
    (a, face)
}

fn detection(cx: f32) -> Option<FaceDetection> {
    Some(FaceDetection {
        cx,
        cy: 0.5,
        width: 0.3,
        height: 0.3,
    })
}

#[test]
fn reduced_motion_at_startup_goes_straight_to_ambient() {
    let caps = Capabilities {
        prefers_reduced_motion: true,
        ..desktop(true)
    };
    let mut a = arbitrator(caps);
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Ambient));
    assert_eq!(a.active_source(), Some(Source::Ambient));
    let effects = a.take_effects();
    assert_eq!(effects, vec![Effect::ActiveSourceChanged(Source::Ambient)]);

    let cfg = TrackingConfig::default();
    let ambient = &a.estimators().ambient;
    assert!((ambient.radius() - cfg.fallback_radius * cfg.reduced_motion_scale).abs() < 1e-6);
    assert!((ambient.speed() - cfg.fallback_speed * cfg.reduced_motion_scale).abs() < 1e-6);
}

#[test]
fn reduced_motion_on_handheld_never_prompts() {
    let caps = Capabilities {
        prefers_reduced_motion: true,
        ..handheld(true)
    };
    let mut a = arbitrator(caps);
    assert!(take_token(a.take_effects()).is_none());
    for _ in 0..10 {
        a.handle(Message::Frame { dt_ms: 16.0 });
    }
    assert!(a.take_effects().is_empty());
    assert!(!a.is_awaiting_permission());
}

#[test]
fn handheld_without_sensor_uses_ambient() {
    let caps = Capabilities {
        has_orientation_sensor: false,
        ..handheld(false)
    };
    let a = arbitrator(caps);
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Ambient));
    assert_eq!(a.tracker_state(Source::Orientation), TrackerState::Unavailable);
}

#[test]
fn handheld_permission_denied_stays_on_interim() {
    let mut a = arbitrator(handheld(true));
    assert_eq!(a.state(), CoordinatorState::WaitingPermission);
    assert_eq!(a.active_source(), Some(Source::Ambient));
    assert_eq!(a.tracker_state(Source::Orientation), TrackerState::AwaitingPermission);
    let token = take_token(a.take_effects()).expect("prompt issued");

    a.handle(Message::PermissionResolved {
        token,
        granted: false,
    });
    assert_eq!(a.state(), CoordinatorState::Degraded(Source::Ambient));
    assert_eq!(a.tracker_state(Source::Orientation), TrackerState::Denied);
    assert_eq!(a.take_effects(), vec![Effect::DismissPrompt]);

    for _ in 0..100 {
        assert!(a
            .handle(Message::Orientation {
                beta: Some(60.0),
                gamma: Some(10.0),
            })
            .is_none());
        assert!(a.handle(Message::Frame { dt_ms: 16.0 }).is_some());
    }
    assert!(take_token(a.take_effects()).is_none());
    assert_eq!(a.active_source(), Some(Source::Ambient));
}

#[test]
fn handheld_permission_granted_switches_to_orientation() {
    let mut a = arbitrator(handheld(true));
    let token = take_token(a.take_effects()).unwrap();
    a.handle(Message::PermissionResolved {
        token,
        granted: true,
    });
    let effects = a.take_effects();
    let ticket = orientation_ticket(&effects).expect("orientation start requested");
    assert_eq!(a.active_source(), Some(Source::Ambient));

    a.handle(Message::StartResolved {
        source: Source::Orientation,
        ticket,
        ok: true,
    });
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Orientation));
    assert_eq!(a.estimators().running_count(), 1);
    assert!(a.estimators().is_running(Source::Orientation));
    let o = a
        .handle(Message::Orientation {
            beta: Some(45.0),
            gamma: Some(15.0),
        })
        .unwrap();
    assert!((o.x - 0.5).abs() < 1e-6);
    assert!(a.handle(Message::Frame { dt_ms: 16.0 }).is_none());
}

#[test]
fn unresolved_permission_token_leaves_interim_running() {
    let mut a = arbitrator(handheld(true));
    let _token = take_token(a.take_effects()).unwrap();
    for _ in 0..50 {
        assert!(a.handle(Message::Frame { dt_ms: 16.0 }).is_some());
    }
    assert_eq!(a.state(), CoordinatorState::WaitingPermission);
    assert_eq!(a.estimators().running_count(), 1);
}

#[test]
fn stale_permission_token_is_ignored() {
    let mut a = arbitrator(handheld(true));
    let token = take_token(a.take_effects()).unwrap();
    a.handle(Message::ReducedMotionChanged(true));
    a.take_effects();
    a.handle(Message::PermissionResolved {
        token,
        granted: true,
    });
    assert!(orientation_ticket(&a.take_effects()).is_none());
    assert_eq!(a.active_source(), Some(Source::Ambient));
}

#[test]
fn handheld_orientation_start_failure_falls_back() {
    let mut a = arbitrator(handheld(false));
    let ticket = orientation_ticket(&a.take_effects()).expect("started immediately");
    a.handle(Message::StartResolved {
        source: Source::Orientation,
        ticket,
        ok: false,
    });
    assert_eq!(a.state(), CoordinatorState::Degraded(Source::Ambient));
    assert_eq!(a.tracker_state(Source::Orientation), TrackerState::Unavailable);
    assert_eq!(a.estimators().running_count(), 1);
}

#[test]
fn desktop_without_camera_tracks_pointer() {
    let mut a = arbitrator(desktop(false));
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Pointer));
    let effects = a.take_effects();
    assert!(settle_ticket(&effects).is_none());
    let o = a.handle(Message::Pointer { x: 1280.0, y: 0.0 }).unwrap();
    assert_eq!(o, NormalizedOffset::new(1.0, 1.0, 0.0));
}

#[test]
fn desktop_camera_failure_stays_on_pointer_forever() {
    let mut a = arbitrator(desktop(true));
    let effects = a.take_effects();
    assert!(face_ticket(&effects).is_none(), "face waits for the settle delay");
    assert_eq!(
        effects.iter().find(|e| matches!(e, Effect::ScheduleSettle { .. })),
        Some(&Effect::ScheduleSettle {
            ticket: settle_ticket(&effects).unwrap(),
            delay_ms: TrackingConfig::default().settle_delay_ms,
        })
    );
    let settle = settle_ticket(&effects).unwrap();
    a.handle(Message::SettleElapsed { ticket: settle });
    let face = face_ticket(&a.take_effects()).unwrap();
    assert_eq!(a.tracker_state(Source::Face), TrackerState::Initializing);

    a.handle(Message::StartResolved {
        source: Source::Face,
        ticket: face,
        ok: false,
    });
    assert_eq!(a.state(), CoordinatorState::Degraded(Source::Pointer));
    assert_eq!(a.tracker_state(Source::Face), TrackerState::Unavailable);

    // A duplicate settle tick never re-attempts the face estimator.
    a.handle(Message::SettleElapsed { ticket: settle });
    for _ in 0..20 {
        a.handle(Message::Frame { dt_ms: 16.0 });
        a.handle(Message::Pointer { x: 10.0, y: 10.0 });
    }
    assert!(face_ticket(&a.take_effects()).is_none());
    assert_eq!(a.active_source(), Some(Source::Pointer));
}

#[test]
fn desktop_camera_refusal_is_recorded_as_denied() {
    let mut a = arbitrator(desktop(true));
    let settle = settle_ticket(&a.take_effects()).unwrap();
    a.handle(Message::SettleElapsed { ticket: settle });
    let face = face_ticket(&a.take_effects()).unwrap();

    a.handle(Message::StartDenied {
        source: Source::Face,
        ticket: face,
    });
    assert_eq!(a.tracker_state(Source::Face), TrackerState::Denied);
    assert_eq!(a.state(), CoordinatorState::Degraded(Source::Pointer));
    assert_eq!(a.active_source(), Some(Source::Pointer));

    // A second answer for the same request changes nothing.
    a.handle(Message::StartResolved {
        source: Source::Face,
        ticket: face,
        ok: true,
    });
    assert_eq!(a.tracker_state(Source::Face), TrackerState::Denied);
    assert_eq!(a.active_source(), Some(Source::Pointer));
}

#[test]
fn overlapping_face_starts_only_release_the_stale_ticket() {
    let mut a = arbitrator(desktop(true));
    let settle = settle_ticket(&a.take_effects()).unwrap();
    a.handle(Message::SettleElapsed { ticket: settle });
    let first = face_ticket(&a.take_effects()).unwrap();

    // Restart while the first camera request is still in flight.
    a.handle(Message::Restart);
    let effects = a.take_effects();
    assert!(effects.contains(&Effect::StopFace { ticket: first }));
    let settle = settle_ticket(&effects).unwrap();
    a.handle(Message::SettleElapsed { ticket: settle });
    let second = face_ticket(&a.take_effects()).unwrap();
    assert_ne!(first, second);
    assert!(!a.wants_start(Source::Face, first));
    assert!(a.wants_start(Source::Face, second));

    // The newer request wins the race.
    a.handle(Message::StartResolved {
        source: Source::Face,
        ticket: second,
        ok: true,
    });
    a.take_effects();
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Face));

    // The older one lands late: only its own hardware is released.
    a.handle(Message::StartResolved {
        source: Source::Face,
        ticket: first,
        ok: true,
    });
    let effects = a.take_effects();
    assert_eq!(effects, vec![Effect::StopFace { ticket: first }]);
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Face));
    assert!(a
        .handle(Message::FaceDetection {
            session: second,
            detection: detection(0.5),
        })
        .is_some());
    assert!(a
        .handle(Message::FaceDetection {
            session: first,
            detection: detection(0.5),
        })
        .is_none());
}

#[test]
fn desktop_face_success_replaces_pointer() {
    let (mut a, session) = desktop_with_face();
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Face));
    assert_eq!(a.tracker_state(Source::Pointer), TrackerState::Stopped);
    assert_eq!(a.estimators().running_count(), 1);
    assert!(a.handle(Message::Pointer { x: 5.0, y: 5.0 }).is_none());
    assert!(a
        .handle(Message::FaceDetection {
            session,
            detection: detection(0.2),
        })
        .is_some());
    assert!(a
        .handle(Message::FaceDetection {
            session: session + 100,
            detection: detection(0.2),
        })
        .is_none());
}

#[test]
fn in_flight_detection_after_stop_is_dropped() {
    let (mut a, session) = desktop_with_face();
    a.handle(Message::ReducedMotionChanged(true));
    let effects = a.take_effects();
    assert!(effects.contains(&Effect::StopFace { ticket: session }));
    assert!(effects.contains(&Effect::ActiveSourceChanged(Source::Ambient)));
    assert!(a
        .handle(Message::FaceDetection {
            session,
            detection: detection(0.9),
        })
        .is_none());
    assert_eq!(a.estimators().running_count(), 1);
    assert!(a.estimators().is_running(Source::Ambient));
}

#[test]
fn late_camera_grant_after_cancellation_is_released() {
    let mut a = arbitrator(desktop(true));
    let settle = settle_ticket(&a.take_effects()).unwrap();
    a.handle(Message::SettleElapsed { ticket: settle });
    let face = face_ticket(&a.take_effects()).unwrap();

    a.handle(Message::ReducedMotionChanged(true));
    assert!(a.take_effects().contains(&Effect::StopFace { ticket: face }));

    a.handle(Message::StartResolved {
        source: Source::Face,
        ticket: face,
        ok: true,
    });
    assert_eq!(a.take_effects(), vec![Effect::StopFace { ticket: face }]);
    assert_eq!(a.active_source(), Some(Source::Ambient));
    assert!(!a.estimators().is_running(Source::Face));
}

#[test]
fn reduced_motion_is_never_superseded() {
    let mut a = arbitrator(desktop(true));
    let settle = settle_ticket(&a.take_effects()).unwrap();
    a.handle(Message::ReducedMotionChanged(true));
    a.handle(Message::SettleElapsed { ticket: settle });
    a.handle(Message::ReducedMotionChanged(false));
    a.handle(Message::Restart);
    assert!(face_ticket(&a.take_effects()).is_none());
    assert_eq!(a.state(), CoordinatorState::Tracking(Source::Ambient));
}

#[test]
fn lost_camera_degrades_to_interim() {
    let (mut a, session) = desktop_with_face();
    a.handle(Message::SourceLost {
        source: Source::Face,
        ticket: session,
    });
    assert_eq!(a.state(), CoordinatorState::Degraded(Source::Pointer));
    assert_eq!(a.tracker_state(Source::Face), TrackerState::Unavailable);
    assert!(a.take_effects().contains(&Effect::StopFace { ticket: session }));
}

#[test]
fn restart_retries_after_denial() {
    let mut a = arbitrator(handheld(true));
    let token = take_token(a.take_effects()).unwrap();
    a.handle(Message::PermissionResolved {
        token,
        granted: false,
    });
    a.take_effects();
    a.handle(Message::Restart);
    assert_eq!(a.state(), CoordinatorState::WaitingPermission);
    assert!(take_token(a.take_effects()).is_some());
}

#[test]
fn exactly_one_estimator_runs_through_any_sequence() {
    let mut a = arbitrator(desktop(true));
    assert_eq!(a.estimators().running_count(), 1);
    let settle = settle_ticket(&a.take_effects()).unwrap();
    let steps = |a: &mut Arbitrator, msg: Message| {
        a.handle(msg);
        assert_eq!(a.estimators().running_count(), 1, "state {:?}", a.state());
    };
    steps(&mut a, Message::SettleElapsed { ticket: settle });
    let face = face_ticket(&a.take_effects()).unwrap();
    steps(&mut a, Message::Pointer { x: 3.0, y: 4.0 });
    steps(
        &mut a,
        Message::StartResolved {
            source: Source::Face,
            ticket: face,
            ok: true,
        },
    );
    steps(
        &mut a,
        Message::FaceDetection {
            session: face,
            detection: None,
        },
    );
    steps(&mut a, Message::Recalibrate);
    steps(
        &mut a,
        Message::SourceLost {
            source: Source::Face,
            ticket: face,
        },
    );
    steps(&mut a, Message::Restart);
    steps(&mut a, Message::ReducedMotionChanged(true));
    steps(&mut a, Message::Frame { dt_ms: 33.0 });
    steps(&mut a, Message::Restart);
}

#[test]
fn double_stop_requests_are_not_duplicated() {
    let (mut a, session) = desktop_with_face();
    a.handle(Message::SourceLost {
        source: Source::Face,
        ticket: session,
    });
    a.handle(Message::SourceLost {
        source: Source::Face,
        ticket: session,
    });
    let stops = a
        .take_effects()
        .into_iter()
        .filter(|e| matches!(e, Effect::StopFace { .. }))
        .count();
    assert_eq!(stops, 1);
}
