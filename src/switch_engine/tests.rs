//! Scenario tests spanning several engine modules at once, written as the
//! user-visible stories: press and hold, tap to flip back, search and select,
//! quit from the overlay.

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use test_log::test;

use super::overlay::OverlayEntry;
use super::press::{HoldAction, ReleaseAction};
use super::testing::FakeProcesses;
use super::{AppId, FilterOutcome, MruTracker, OverlaySession, PressArbiter};

fn entries_from(mru: &MruTracker, procs: &FakeProcesses) -> Vec<OverlayEntry> {
    mru.snapshot()
        .into_iter()
        .filter_map(|id| {
            use super::ProcessDirectory;
            procs.name(id).map(|name| OverlayEntry { id, name })
        })
        .collect()
}

#[test]
fn hold_past_threshold_opens_the_overlay_exactly_once() {
    let procs = FakeProcesses::new(&["Alpha", "Browser", "Chat"]);
    let mut mru = MruTracker::new();
    mru.seed(&procs);

    let mut arbiter = PressArbiter::new(Duration::from_secs(1));
    let t0 = Instant::now();
    assert!(arbiter.begin(t0, false, 1));

    // Timer fires at the threshold: the hold asks for the overlay.
    assert_eq!(arbiter.on_timer(1), Some(HoldAction::OpenOverlay));
    let session = OverlaySession::open(entries_from(&mru, &procs), None, true).unwrap();
    assert_eq!(session.selected_id(), Some(procs.id_of("Alpha")));

    // Another firing for the same session opens nothing.
    assert_eq!(arbiter.on_timer(1), None);

    // Release at 1.2s is spent; the overlay stays up.
    assert_eq!(
        arbiter.on_released(t0 + Duration::from_millis(1200)),
        ReleaseAction::None
    );
}

#[test]
fn tap_flips_to_the_previous_app() {
    let procs = FakeProcesses::new(&["Alpha", "Browser", "Chat"]);
    procs.set_frontmost(Some(procs.id_of("Alpha")));
    let mut mru = MruTracker::new();
    mru.seed(&procs);

    let mut arbiter = PressArbiter::new(Duration::from_secs(1));
    let t0 = Instant::now();
    arbiter.begin(t0, false, 1);
    assert_eq!(
        arbiter.on_released(t0 + Duration::from_millis(300)),
        ReleaseAction::QuickSwitch
    );

    // The quick switch targets the second entry of the MRU list.
    let snapshot = mru.snapshot();
    let target = snapshot.get(1).or_else(|| snapshot.first()).copied();
    assert_eq!(target, Some(procs.id_of("Browser")));

    // The activation notification then reorders the list, so the next tap
    // flips straight back.
    mru.record_activation(procs.id_of("Browser"), &procs);
    let snapshot = mru.snapshot();
    assert_eq!(snapshot[..2], [procs.id_of("Browser"), procs.id_of("Alpha")]);
}

#[test]
fn search_narrows_to_one_and_auto_selects() {
    let procs = FakeProcesses::new(&["Alpha", "Browser", "Chat"]);
    let mut mru = MruTracker::new();
    mru.seed(&procs);

    let mut session = OverlaySession::open(entries_from(&mru, &procs), None, true).unwrap();
    assert_eq!(
        session.type_char('b'),
        FilterOutcome::AutoSelected(procs.id_of("Browser"))
    );
}

#[test]
fn quit_from_the_overlay_keeps_it_open_on_the_next_row() {
    let procs = FakeProcesses::new(&["Alpha", "Browser", "Chat"]);
    let mut mru = MruTracker::new();
    mru.seed(&procs);

    let mut session = OverlaySession::open(entries_from(&mru, &procs), None, false).unwrap();
    session.move_selection(1);
    let removed = session.quit_highlighted().unwrap();
    assert_eq!(removed.id, procs.id_of("Browser"));

    // The caller mirrors the removal into the MRU list; the overlay stays
    // open with the selection on the row that took the removed one's place.
    mru.remove(removed.id);
    assert_eq!(mru.snapshot(), vec![procs.id_of("Alpha"), procs.id_of("Chat")]);
    assert_eq!(session.selected_id(), Some(procs.id_of("Chat")));
}

#[test]
fn candidate_vanishing_mid_search_updates_the_filter() {
    let procs = FakeProcesses::new(&["Safari", "Slack", "Chat"]);
    let mut mru = MruTracker::new();
    mru.seed(&procs);

    let mut session = OverlaySession::open(entries_from(&mru, &procs), None, false).unwrap();
    session.type_char('s');
    assert_eq!(
        session.filtered_ids(),
        vec![procs.id_of("Safari"), procs.id_of("Slack")]
    );

    procs.terminate(procs.id_of("Safari"));
    mru.remove(procs.id_of("Safari"));
    mru.prune(&procs);
    session.remove_candidate(procs.id_of("Safari"));
    assert_eq!(session.filtered_ids(), vec![procs.id_of("Slack")]);
    assert_eq!(session.selected_id(), Some(procs.id_of("Slack")));
}

#[test]
fn overlay_snapshot_is_immune_to_renames_after_open() {
    let procs = FakeProcesses::new(&["Alpha", "Browser"]);
    let mut mru = MruTracker::new();
    mru.seed(&procs);

    let session = OverlaySession::open(entries_from(&mru, &procs), None, false).unwrap();
    // Names were captured at open; the frame renders without consulting the
    // directory again.
    let frame = session.frame(true);
    assert_eq!(frame.rows[0].name, "Alpha");
    assert_eq!(frame.rows[1].name, "Browser");
    assert_eq!(frame.selected, Some(0));
    assert!(frame.show_badges);
}

#[test]
fn press_mode_reflects_overlay_state_at_press_time() {
    let mut arbiter = PressArbiter::new(Duration::from_secs(1));
    let t0 = Instant::now();

    // Overlay open when the press begins: a hold cancels instead of opening.
    arbiter.begin(t0, true, 1);
    assert_eq!(arbiter.on_timer(1), Some(HoldAction::CancelOverlay));
    arbiter.on_released(t0 + Duration::from_millis(1100));

    // A tap in the same mode advances the selection.
    arbiter.begin(t0, true, 2);
    assert_eq!(
        arbiter.on_released(t0 + Duration::from_millis(200)),
        ReleaseAction::AdvanceSelection
    );
}

#[test]
fn digit_selection_respects_the_filtered_view() {
    let procs = FakeProcesses::new(&["Safari", "Slack", "Chat", "Steam"]);
    let mut mru = MruTracker::new();
    mru.seed(&procs);

    let mut session = OverlaySession::open(entries_from(&mru, &procs), None, false).unwrap();
    session.type_char('s');
    // Rows are Safari, Slack, Steam after the filter; badge 2 is Slack.
    assert_eq!(session.select_by_digit('2'), Some(procs.id_of("Slack")));
    assert_eq!(session.select_by_digit('4'), None);
}

#[test]
fn ids_stay_opaque_and_comparable() {
    let a = AppId::new(7);
    let b = AppId::new(7);
    assert_eq!(a, b);
    assert_eq!(a.as_u32(), 7);
}
