use std::sync::Arc;

use artifacts::{ArtifactClient, ArtifactKey, MemoryStore};
use log::{Level, LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;

/// Keeps every record emitted by this crate.
struct Recorder(Mutex<Vec<(Level, String)>>);

impl Log for Recorder {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if record.target().starts_with("artifacts") {
            self.0.lock().push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static RECORDER: Recorder = Recorder(parking_lot::const_mutex(Vec::new()));

#[tokio::test]
async fn per_object_traffic_is_logged_at_debug() {
    log::set_logger(&RECORDER).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let client = ArtifactClient::new(Arc::new(MemoryStore::new()));
    let key = ArtifactKey::processed("housing");
    client.put_bytes(&key, b"a,b\n".to_vec()).await.unwrap();
    client.get_bytes(&key).await.unwrap();

    let records = RECORDER.0.lock().clone();
    assert!(records.iter().any(|(_, msg)| msg == "artifact stored"));
    assert!(records.iter().any(|(_, msg)| msg == "artifact read"));
    assert!(
        records.iter().all(|(level, _)| *level >= Level::Debug),
        "per-object records above debug: {records:?}"
    );
}
