use super::*;

fn swipe(sync: &mut TouchSynchronizer, slot: i32, from: (f64, f64), by: (f64, f64), steps: u32) {
    for i in 0..=steps {
        let t = f64::from(i) / f64::from(steps);
        sync.on_motion(slot, from.0 + by.0 * t, from.1 + by.1 * t);
    }
}

#[test]
fn two_coherent_fingers_trigger_once() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 1_000);
    sync.on_down(1, 1_040);
    swipe(&mut sync, 0, (10.0, 50.0), (60.0, 2.0), 4);
    swipe(&mut sync, 1, (10.0, 70.0), (58.0, -1.0), 4);

    assert_eq!(sync.on_up(0, 1_400), None);
    assert_eq!(
        sync.on_up(1, 1_430),
        Some(GestureAction::Swipe {
            direction: Direction::Right,
            fingers: 2,
        })
    );
    assert_eq!(sync.session(), &TouchSession::default());
}

#[test]
fn three_fingers_report_three() {
    let mut sync = TouchSynchronizer::new();

    for slot in 0..3 {
        sync.on_down(slot, 500 + slot as u64 * 30);
    }
    for slot in 0..3 {
        swipe(&mut sync, slot, (40.0 + f64::from(slot) * 10.0, 80.0), (0.0, -45.0), 3);
    }
    assert_eq!(sync.on_up(2, 900), None);
    assert_eq!(sync.on_up(1, 920), None);

    assert_eq!(
        sync.on_up(0, 950),
        Some(GestureAction::Swipe {
            direction: Direction::Up,
            fingers: 3,
        })
    );
}

#[test]
fn late_second_finger_rejects_session() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 1_000);
    sync.on_down(1, 1_000 + TOUCH_SYNC_THRESHOLD_MS + 1);
    assert!(!sync.session().is_clean());

    swipe(&mut sync, 0, (10.0, 10.0), (50.0, 0.0), 3);
    swipe(&mut sync, 1, (10.0, 30.0), (50.0, 0.0), 3);

    assert_eq!(sync.on_up(0, 1_300), None);
    assert_eq!(sync.on_up(1, 1_310), None);
    assert_eq!(sync.session(), &TouchSession::default());
}

#[test]
fn gap_at_threshold_is_still_coherent() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(3, 0);
    sync.on_down(4, TOUCH_SYNC_THRESHOLD_MS);
    swipe(&mut sync, 3, (0.0, 0.0), (-30.0, 0.0), 2);
    swipe(&mut sync, 4, (0.0, 20.0), (-30.0, 0.0), 2);
    sync.on_up(3, 300);

    assert_eq!(
        sync.on_up(4, 300 + TOUCH_SYNC_THRESHOLD_MS),
        Some(GestureAction::Swipe {
            direction: Direction::Left,
            fingers: 2,
        })
    );
}

#[test]
fn late_lift_rejects_session() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 0);
    sync.on_down(1, 10);
    swipe(&mut sync, 0, (0.0, 0.0), (0.0, 40.0), 2);
    swipe(&mut sync, 1, (10.0, 0.0), (0.0, 40.0), 2);
    sync.on_up(0, 200);

    assert_eq!(sync.on_up(1, 500), None);
}

#[test]
fn disagreeing_directions_reject_session() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 0);
    sync.on_down(1, 20);
    swipe(&mut sync, 0, (0.0, 0.0), (40.0, 0.0), 2);
    swipe(&mut sync, 1, (0.0, 50.0), (40.0, 40.0), 2);
    sync.on_up(0, 200);

    assert_eq!(sync.on_up(1, 210), None);
}

#[test]
fn finger_without_motion_rejects_session() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 0);
    sync.on_down(1, 20);
    swipe(&mut sync, 0, (0.0, 0.0), (40.0, 0.0), 2);
    sync.on_up(0, 200);

    assert_eq!(sync.on_up(1, 210), None);
    assert!(sync.session().is_empty());
}

#[test]
fn single_motion_sample_counts_as_motion_without_displacement() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 0);
    sync.on_down(1, 20);
    sync.on_motion(0, 5.0, 5.0);
    sync.on_motion(1, 9.0, 5.0);
    sync.on_up(0, 100);

    // Both contacts agree on Center, which resolves to no command.
    assert_eq!(
        sync.on_up(1, 120),
        Some(GestureAction::Swipe {
            direction: Direction::Center,
            fingers: 2,
        })
    );
}

#[test]
fn lone_finger_never_triggers() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 0);
    swipe(&mut sync, 0, (0.0, 0.0), (120.0, 0.0), 5);

    assert!(sync.session().is_clean());
    assert_eq!(sync.session().fingers(), 0);
    assert_eq!(sync.on_up(0, 300), None);
    assert_eq!(sync.session(), &TouchSession::default());
}

#[test]
fn motion_accumulates_from_first_sample() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(7, 0);
    sync.on_motion(7, 100.0, 100.0);
    sync.on_motion(7, 103.0, 98.0);
    sync.on_motion(7, 110.0, 95.0);

    let contact = sync
        .session()
        .contacts()
        .find(|c| c.slot == 7)
        .copied()
        .expect("contact for slot 7");
    assert_eq!(contact.delta, Vector2::new(10.0, -5.0));
    assert_eq!(contact.position, Some(Vector2::new(110.0, 95.0)));
}

#[test]
fn rejected_session_drains_before_next_gesture() {
    let mut sync = TouchSynchronizer::new();

    sync.on_down(0, 0);
    sync.on_down(1, 500);
    swipe(&mut sync, 0, (0.0, 0.0), (40.0, 0.0), 2);
    assert_eq!(sync.on_up(0, 600), None);
    assert!(!sync.session().is_empty());

    // Still draining: slot 1 is down, so a new touch joins the rejected session.
    sync.on_down(2, 610);
    assert!(!sync.session().is_clean());
    swipe(&mut sync, 1, (0.0, 50.0), (40.0, 0.0), 2);
    swipe(&mut sync, 2, (0.0, 90.0), (40.0, 0.0), 2);
    assert_eq!(sync.on_up(1, 700), None);
    assert_eq!(sync.on_up(2, 710), None);
    assert!(sync.session().is_empty());

    sync.on_down(0, 1_000);
    sync.on_down(1, 1_010);
    swipe(&mut sync, 0, (0.0, 0.0), (40.0, 0.0), 2);
    swipe(&mut sync, 1, (0.0, 50.0), (40.0, 0.0), 2);
    sync.on_up(0, 1_200);
    assert_eq!(
        sync.on_up(1, 1_210),
        Some(GestureAction::Swipe {
            direction: Direction::Right,
            fingers: 2,
        })
    );
}

#[test]
fn stray_events_do_not_unbalance_session() {
    let mut sync = TouchSynchronizer::new();

    assert_eq!(sync.on_up(9, 10), None);
    sync.on_motion(9, 1.0, 1.0);
    assert_eq!(sync.session(), &TouchSession::default());

    sync.on_down(0, 100);
    sync.on_down(1, 120);
    swipe(&mut sync, 0, (0.0, 0.0), (0.0, 30.0), 2);
    swipe(&mut sync, 1, (9.0, 0.0), (0.0, 30.0), 2);
    assert_eq!(sync.on_up(0, 300), None);
    assert_eq!(sync.on_up(0, 305), None);
    assert_eq!(
        sync.on_up(1, 320),
        Some(GestureAction::Swipe {
            direction: Direction::Down,
            fingers: 2,
        })
    );
}
