use wavestream_telemetry::EventLogger;

#[test]
fn subscriber_installs_once() {
    EventLogger::init("debug").expect("first install succeeds");
    tracing::info!("subscriber installed");

    let err = EventLogger::init("info").unwrap_err();
    assert!(!err.to_string().is_empty());
}
