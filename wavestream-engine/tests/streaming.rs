mod common;

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use common::{command_addr, data_addr, harness, lab_config, TrackedKeys};
use wavestream_core::command::Selection;
use wavestream_core::node::Cursor;
use wavestream_engine::{ExitReason, ScriptedKeys, StreamError};

#[test]
fn end_to_end_selection_and_switch() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(&dir);
    let mut h = harness(&config);
    let mut keys = ScriptedKeys::new().idle(121).key('2').key('o');

    for _ in 0..121 {
        assert_eq!(h.streamer.tick(&mut keys).unwrap(), None);
    }
    for node in h.streamer.nodes() {
        assert_eq!(node.scenario_name(), "base");
        assert_eq!(
            node.cursor(),
            Cursor {
                index: 1,
                cycle_count: 0
            }
        );
    }

    // '2' selects, then 'o' switches; each key also streams one frame
    h.streamer.tick(&mut keys).unwrap();
    assert_eq!(h.streamer.selection(), Selection::Node(2));
    h.data.clear();
    h.streamer.tick(&mut keys).unwrap();

    let nodes = h.streamer.nodes();
    assert_eq!(nodes[1].scenario_name(), "oc");
    assert_eq!(nodes[1].index(), 1);
    assert_eq!(nodes[0].scenario_name(), "base");
    assert_eq!(nodes[2].scenario_name(), "base");
    assert_eq!(h.data.sent_to(data_addr(2)), vec!["WAVE|1000.0|0.0"]);
    assert_eq!(h.data.sent_to(data_addr(1)), vec!["WAVE|2.0|0.2"]);
}

#[test]
fn cycle_count_tracks_whole_cycles() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(&dir);
    let mut h = harness(&config);
    let mut keys = ScriptedKeys::new();

    for _ in 0..60 {
        h.streamer.tick(&mut keys).unwrap();
    }
    assert!(h.streamer.nodes().iter().all(|n| n.cycle_count() == 1));
    assert!(h.streamer.status().summary_line().starts_with("N1:base@1 | N2:base@1"));

    for _ in 0..60 {
        h.streamer.tick(&mut keys).unwrap();
    }
    assert!(h
        .streamer
        .nodes()
        .iter()
        .all(|n| n.cursor() == Cursor::default()));
}

#[test]
fn switch_to_missing_scenario_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(&dir);
    let mut h = harness(&config);
    let mut keys = ScriptedKeys::new().idle(5).key('s').key('w').key('m');

    for _ in 0..8 {
        h.streamer.tick(&mut keys).unwrap();
    }
    for node in h.streamer.nodes() {
        assert_eq!(node.scenario_name(), "base");
        assert_eq!(node.index(), 8);
    }
}

#[test]
fn reset_keeps_scenarios_and_rewinds() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(&dir);
    let mut h = harness(&config);
    let mut keys = ScriptedKeys::new().key('3').key('o').idle(10).key('r');

    for _ in 0..13 {
        h.streamer.tick(&mut keys).unwrap();
    }

    let sent: Vec<_> = h.control.sent().iter().map(|d| d.text()).collect();
    assert_eq!(sent.len(), 9);
    assert_eq!(sent[..3], ["RESET_CYCLE|0|1", "RESET_CYCLE|0|2", "RESET_CYCLE|0|3"]);
    assert_eq!(h.control.sent_to(command_addr(3))[1], "SET_MODE|MODE_UDP|3");

    let nodes = h.streamer.nodes();
    assert_eq!(nodes[2].scenario_name(), "oc");
    assert_eq!(nodes[0].scenario_name(), "base");
    // the reset iteration streamed one frame after the rewind
    assert!(nodes.iter().all(|n| n.index() == 1 && n.cycle_count() == 0));
}

#[test]
fn quit_closes_both_channels() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(&dir);
    let h = harness(&config);
    let (control, data) = (h.control.clone(), h.data.clone());

    let summary = h.streamer.run(ScriptedKeys::new().idle(3).key('q')).unwrap();

    assert_eq!(summary.reason, ExitReason::Quit);
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.frames_sent, 9);
    assert!(control.is_closed());
    assert!(data.is_closed());
}

#[test]
fn send_failure_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(&dir);
    let h = harness(&config);
    h.data.fail_sends_to(data_addr(2));
    let data = h.data.clone();

    let summary = h.streamer.run(ScriptedKeys::new().idle(10).key('q')).unwrap();

    assert_eq!(summary.frames_sent, 20);
    assert_eq!(summary.send_failures, 10);
    assert!(data.sent_to(data_addr(2)).is_empty());
    assert_eq!(data.sent_to(data_addr(1)).len(), 10);
    assert_eq!(data.sent_to(data_addr(3)).len(), 10);
    // node 2 kept advancing in lockstep with the others
    assert!(summary.final_status.nodes.iter().all(|n| n.index == 10));
}

#[test]
fn external_shutdown_stops_the_loop() {
    let dir = tempfile::tempdir().unwrap();
    let config = lab_config(&dir);
    let h = harness(&config);
    let shutdown = h.shutdown.clone();
    let data = h.data.clone();

    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        shutdown.store(true, Ordering::Relaxed);
    });
    let summary = h.streamer.run(wavestream_engine::Headless).unwrap();
    stopper.join().unwrap();

    assert_eq!(summary.reason, ExitReason::Interrupted);
    assert!(summary.iterations > 0);
    assert!(data.is_closed());
}

#[test]
fn quit_releases_the_key_source() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&lab_config(&dir));
    let (control, data) = (h.control.clone(), h.data.clone());
    let (keys, released) = TrackedKeys::new(ScriptedKeys::new().idle(2).key('q'));

    let summary = h.streamer.run(keys).unwrap();

    assert_eq!(summary.reason, ExitReason::Quit);
    assert!(released.load(Ordering::SeqCst));
    assert!(control.is_closed() && data.is_closed());
}

#[test]
fn interrupt_key_releases_the_key_source() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&lab_config(&dir));
    let (control, data) = (h.control.clone(), h.data.clone());
    let (keys, released) = TrackedKeys::new(ScriptedKeys::new().idle(2).interrupt());

    let summary = h.streamer.run(keys).unwrap();

    assert_eq!(summary.reason, ExitReason::Interrupted);
    assert_eq!(summary.iterations, 2);
    assert!(released.load(Ordering::SeqCst));
    assert!(control.is_closed() && data.is_closed());
}

#[test]
fn key_read_error_still_releases_everything() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(&lab_config(&dir));
    let (control, data) = (h.control.clone(), h.data.clone());
    let (keys, released) = TrackedKeys::failing(ScriptedKeys::new().idle(3));

    let result = h.streamer.run(keys);

    assert!(matches!(
        result,
        Err(StreamError::Input(ref err)) if err.kind() == std::io::ErrorKind::BrokenPipe
    ));
    assert!(released.load(Ordering::SeqCst));
    assert!(control.is_closed() && data.is_closed());
    assert_eq!(data.sent_to(data_addr(1)).len(), 3);
}
