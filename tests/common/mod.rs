//! Mock backends and fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use huginn::providers::ClassifyProvider;
use huginn::{Candidate, HuginnError, Label, LogStore, Result};

/// Returns a fixed candidate and records every text it was sent.
pub struct ScriptedBackend {
    reply: Candidate,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new(label: &str, confidence: f64) -> Arc<Self> {
        Arc::new(Self {
            reply: Candidate::new(label, confidence),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> String {
        self.seen.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ClassifyProvider for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, text: &str, _labels: &[Label]) -> Result<Candidate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());
        Ok(self.reply.clone())
    }
}

/// Always fails as if the credential were rejected.
pub struct FailingBackend;

#[async_trait]
impl ClassifyProvider for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    async fn classify(&self, _text: &str, _labels: &[Label]) -> Result<Candidate> {
        Err(HuginnError::AuthenticationFailed)
    }
}

/// A fresh, initialized log store in a temporary directory.
///
/// Keep the returned `TempDir` alive for as long as the store is used.
pub async fn temp_store() -> (tempfile::TempDir, LogStore) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("logs.db").display());
    let store = LogStore::open(&url).await.unwrap();
    store.initialize().await.unwrap();
    (dir, store)
}
