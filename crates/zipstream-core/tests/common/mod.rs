#![allow(dead_code)]

pub mod http_server;

use std::sync::Mutex;

use url::Url;
use zipstream_core::report::Reporter;

/// One failure event seen by [`RecordingReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Captured {
    Error(String),
    Status(String, u32),
}

/// Reporter that remembers every event, for assertions.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Captured>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Captured> {
        self.events.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn capture_error(&self, url: &Url, _error: &(dyn std::error::Error + 'static)) {
        self.events.lock().unwrap().push(Captured::Error(url.to_string()));
    }

    fn capture_status(&self, url: &Url, status: u32) {
        self.events
            .lock()
            .unwrap()
            .push(Captured::Status(url.to_string(), status));
    }
}

/// Descriptor JSON (current field names) for `(url, zip_path)` pairs.
pub fn descriptor_json(entries: &[(&str, &str)], next: Option<&str>) -> Vec<u8> {
    let results: Vec<serde_json::Value> = entries
        .iter()
        .map(|(url, path)| serde_json::json!({ "url": url, "zipPath": path }))
        .collect();
    serde_json::to_vec(&serde_json::json!({ "results": results, "next": next })).unwrap()
}
