//! A bulk loader that records the requests it serves.

use std::sync::{Arc, Mutex};

use idsview_common::Result;
use idsview_format::path::NodePath;
use idsview_sequence::{BulkLoader, Record};

/// One `read_many` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCall {
    pub path: String,
    pub indices: Vec<usize>,
}

/// Wraps a [`BulkLoader`] and logs each request before forwarding it.
pub struct RecordingLoader {
    inner: Arc<dyn BulkLoader>,
    calls: Mutex<Vec<LoadCall>>,
}

impl RecordingLoader {
    pub fn new(inner: Arc<dyn BulkLoader>) -> Arc<RecordingLoader> {
        Arc::new(RecordingLoader {
            inner,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// All requests so far, in call order.
    pub fn calls(&self) -> Vec<LoadCall> {
        self.calls.lock().expect("lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }

    /// Every index requested so far, across calls, in request order.
    pub fn loaded_indices(&self) -> Vec<usize> {
        self.calls
            .lock()
            .expect("lock")
            .iter()
            .flat_map(|call| call.indices.iter().copied())
            .collect()
    }

    pub fn reset(&self) {
        self.calls.lock().expect("lock").clear();
    }
}

impl BulkLoader for RecordingLoader {
    fn read_many(&self, path: &NodePath, indices: &[usize]) -> Result<Vec<Record>> {
        self.calls.lock().expect("lock").push(LoadCall {
            path: path.to_string(),
            indices: indices.to_vec(),
        });
        self.inner.read_many(path, indices)
    }
}
