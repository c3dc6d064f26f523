//! Pipeline tests against mock backends and a temporary log database.

mod common;

use std::sync::Arc;

use common::{FailingBackend, ScriptedBackend, temp_store};
use huginn::providers::ClassifyProvider;
use huginn::{HuginnError, Label, LogStore, Pipeline, PipelineConfig};

// ============================================================================
// Helpers
// ============================================================================

fn pipeline(backend: Arc<dyn ClassifyProvider>, store: LogStore) -> Pipeline {
    Pipeline::new(backend, store, PipelineConfig::default()).unwrap()
}

fn assert_wrapped(err: &HuginnError, check: impl Fn(&HuginnError) -> bool) {
    match err {
        HuginnError::ClassificationFailed(inner) => assert!(check(inner), "inner: {inner:?}"),
        other => panic!("expected ClassificationFailed, got {other:?}"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn invoice_is_classified_and_logged() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Invoice", 0.95);
    let pipeline = pipeline(backend.clone(), store.clone());

    let text = "This invoice is for $500 due on March 1st, net 30 terms apply immediately.";
    let response = pipeline.classify(text).await.unwrap();

    assert_eq!(response.label, Label::Invoice);
    assert_eq!(response.confidence, 0.95);
    assert_eq!(backend.calls(), 1);

    let rows = store.recent(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "Invoice");
    assert_eq!(rows[0].confidence, 0.95);
    assert_eq!(rows[0].text_length, 74);
}

#[tokio::test]
async fn short_text_never_reaches_backend() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Email", 0.9);
    let pipeline = pipeline(backend.clone(), store.clone());

    for input in ["", "Hi", "   short   ", "123456789"] {
        let err = pipeline.classify(input).await.unwrap_err();
        assert!(err.is_input_error(), "{input:?} -> {err:?}");
    }

    assert_eq!(backend.calls(), 0);
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn length_is_measured_after_trimming() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Email", 0.9);
    let pipeline = pipeline(backend.clone(), store);

    let err = pipeline.classify("\n\t  Hi there  \n").await.unwrap_err();
    assert!(matches!(err, HuginnError::TextTooShort { min: 10, len: 8 }));

    pipeline.classify("  exactly10!  ").await.unwrap();
    assert_eq!(backend.last_text(), "exactly10!");
}

#[tokio::test]
async fn long_text_is_truncated_before_backend() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Report", 0.7);
    let pipeline = pipeline(backend.clone(), store.clone());

    let text = "é".repeat(5000);
    pipeline.classify(&text).await.unwrap();

    let sent = backend.last_text();
    assert_eq!(sent.chars().count(), 2000);
    assert!(text.starts_with(&sent));

    let rows = store.recent(1).await.unwrap();
    assert_eq!(rows[0].text_length, 2000);
}

#[tokio::test]
async fn text_at_limit_is_sent_unchanged() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Report", 0.7);
    let pipeline = pipeline(backend.clone(), store);

    let text = "a".repeat(2000);
    pipeline.classify(&text).await.unwrap();
    assert_eq!(backend.last_text(), text);
}

#[tokio::test]
async fn label_outside_set_fails_without_logging() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Memo", 0.8);
    let pipeline = pipeline(backend, store.clone());

    let err = pipeline
        .classify("Memo to all staff regarding parking.")
        .await
        .unwrap_err();

    assert!(!err.is_input_error());
    assert_wrapped(&err, |inner| matches!(inner, HuginnError::InvalidCategory(l) if l == "Memo"));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn label_outside_configured_subset_fails() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Resume", 0.8);
    let config = PipelineConfig::default().labels(vec![Label::Invoice, Label::Contract]);
    let pipeline = Pipeline::new(backend, store, config).unwrap();

    let err = pipeline
        .classify("Senior engineer with ten years of experience.")
        .await
        .unwrap_err();
    assert_wrapped(&err, |inner| matches!(inner, HuginnError::InvalidCategory(_)));
}

#[tokio::test]
async fn confidence_is_clamped() {
    let (_dir, store) = temp_store().await;

    let high = pipeline(ScriptedBackend::new("Contract", 1.5), store.clone());
    let response = high
        .classify("This agreement is made between the parties.")
        .await
        .unwrap();
    assert_eq!(response.confidence, 1.0);

    let low = pipeline(ScriptedBackend::new("Contract", -0.2), store.clone());
    let response = low
        .classify("This agreement is made between the parties.")
        .await
        .unwrap();
    assert_eq!(response.confidence, 0.0);

    let rows = store.recent(2).await.unwrap();
    assert_eq!(rows[0].confidence, 0.0);
    assert_eq!(rows[1].confidence, 1.0);
}

#[tokio::test]
async fn backend_failure_is_wrapped() {
    let (_dir, store) = temp_store().await;
    let pipeline = pipeline(Arc::new(FailingBackend), store.clone());

    let err = pipeline
        .classify("Quarterly revenue grew by twelve percent.")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "classification error");
    assert_wrapped(&err, |inner| matches!(inner, HuginnError::AuthenticationFailed));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn log_failure_does_not_fail_request() {
    let (_dir, store) = temp_store().await;
    store.close().await;
    let pipeline = pipeline(ScriptedBackend::new("Email", 0.88), store);

    let response = pipeline
        .classify("Hi team, the meeting moved to Thursday.")
        .await
        .unwrap();
    assert_eq!(response.label, Label::Email);
    assert_eq!(response.confidence, 0.88);
}

#[tokio::test]
async fn bytes_are_decoded_as_utf8() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Resume", 0.6);
    let pipeline = pipeline(backend.clone(), store);

    let response = pipeline
        .classify_bytes("Curriculum vitae: Jane Doe, engineer.".as_bytes().to_vec())
        .await
        .unwrap();
    assert_eq!(response.label, Label::Resume);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn invalid_utf8_bytes_fail_without_backend_call() {
    let (_dir, store) = temp_store().await;
    let backend = ScriptedBackend::new("Resume", 0.6);
    let pipeline = pipeline(backend.clone(), store);

    let err = pipeline
        .classify_bytes(vec![0xff, 0xfe, 0x00, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47])
        .await
        .unwrap_err();

    assert!(!err.is_input_error());
    assert_wrapped(&err, |inner| matches!(inner, HuginnError::Decode(_)));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn short_upload_is_an_input_error() {
    let (_dir, store) = temp_store().await;
    let pipeline = pipeline(ScriptedBackend::new("Email", 0.5), store);

    let err = pipeline.classify_bytes(b"tiny".to_vec()).await.unwrap_err();
    assert!(err.is_input_error());
}

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let (_dir, store) = temp_store().await;
    let config = PipelineConfig::default().min_length(100).max_length(50);
    let result = Pipeline::new(ScriptedBackend::new("Email", 0.5), store, config);
    assert!(matches!(result, Err(HuginnError::Configuration(_))));
}
