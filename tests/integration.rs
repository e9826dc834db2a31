#![cfg(test)]

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mockall::mock;
use ticket_triage::{
    base::{
        config::{Config, ConfigInner},
        error::TriageError,
        roster::default_roster,
        types::{Employer, Priority, Res, Ticket},
    },
    interaction::http::{AppState, TicketWithTriage, router},
    runtime::Runtime,
    service::{
        classify::{Classifier, GenericClassifier},
        embed::{Embedder, GenericEmbedder},
        store::{TicketRecord, TicketStore},
    },
    triage::{EmbeddingIndex, PRIORITY_LABELS, PriorityClassifier, Triager},
};
use tower::ServiceExt;

// Mocks.

mock! {
    pub Embed {}

    #[async_trait]
    impl GenericEmbedder for Embed {
        async fn embed(&self, text: &str) -> Res<Vec<f32>>;
    }
}

mock! {
    pub Classify {
        fn classify<'a>(&self, text: &str, labels: &'a [&'a str]) -> Res<Vec<f64>>;
    }
}

#[async_trait]
impl GenericClassifier for MockClassify {
    async fn classify(&self, text: &str, labels: &[&str]) -> Res<Vec<f64>> {
        MockClassify::classify(self, text, labels)
    }
}

/// Classifier that never answers in time.
struct SlowClassifier;

#[async_trait]
impl GenericClassifier for SlowClassifier {
    async fn classify(&self, _text: &str, labels: &[&str]) -> Res<Vec<f64>> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(vec![0.25; labels.len()])
    }
}

// Helpers.

/// One axis per topic: databases, cloud, frontend.
fn topic_vector(text: &str) -> Vec<f32> {
    let text = text.to_lowercase();
    let has = |words: &[&str]| if words.iter().any(|w| text.contains(w)) { 1.0 } else { 0.0 };

    vec![has(&["sql", "database"]), has(&["docker", "kubernetes"]), has(&["react", "javascript"])]
}

fn get_mock_embedder() -> MockEmbed {
    let mut mock = MockEmbed::new();
    mock.expect_embed().returning(|text| Ok(topic_vector(text)));
    mock
}

fn get_mock_classifier(scores: Vec<f64>) -> MockClassify {
    let mut mock = MockClassify::new();
    mock.expect_classify().returning(move |_, _| Ok(scores.clone()));
    mock
}

fn small_roster() -> Vec<Employer> {
    vec![
        Employer::new("emp4", "Diana", &["SQL", "PostgreSQL", "Data Modeling"]),
        Employer::new("emp5", "Ethan", &["AWS", "Docker", "Kubernetes"]),
        Employer::new("emp3", "Charlie", &["JavaScript", "React", "Node.js", "CSS"]),
    ]
}

async fn build_triager<E, C>(roster: Vec<Employer>, embedder: E, classifier: C) -> Triager
where
    E: GenericEmbedder,
    C: GenericClassifier,
{
    let index = EmbeddingIndex::build(roster, Embedder::new(Arc::new(embedder))).await.expect("Failed to build index");

    Triager::new(Arc::new(index), PriorityClassifier::new(Classifier::new(Arc::new(classifier))))
}

fn app_state(triager: Triager, triage_timeout: Duration) -> AppState {
    AppState {
        triager,
        store: TicketStore::memory(),
        triage_timeout,
    }
}

async fn send(app: axum::Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder.header("content-type", "application/json").body(Body::from(body.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };

    (status, value)
}

// Pipeline tests.

#[tokio::test]
async fn test_triage_assigns_closest_specialist() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.1, 0.7, 0.15, 0.05])).await;

    let result = triager.triage(&Ticket::new("Dashboard broken", "The React page fails to render")).await.unwrap();

    assert_eq!(result.priority, Priority::P1);
    assert!((result.priority_score - 70.0).abs() < 1e-9);
    assert_eq!(result.assignee, "emp3");
    assert_eq!(
        result.rationale,
        "Priority classification confidence: 70.0/100. Ticket content suggests skills needed: JavaScript, React, Node.js, CSS"
    );
    assert_eq!(result.assignee_reason, "Best skills match (similarity score: 1.00): Charlie has expertise in JavaScript, React, Node.js, CSS");
    assert_eq!(
        result.first_reply,
        "Thank you for reporting this issue. \
         We've identified this as a high-priority issue (priority score: 70.0/100) and will address it promptly. \
         Our specialist Charlie has been assigned because of their expertise in JavaScript, React, Node.js. \
         We'll provide updates as we investigate further. Please feel free to add any additional details that might help us resolve this faster."
    );
}

#[tokio::test]
async fn test_triage_sends_combined_text_and_fixed_labels() {
    let mut classifier = MockClassify::new();
    classifier.expect_classify().times(1).returning(|text, labels| {
        assert_eq!(text, "Disk full: The database volume is at 100%");
        assert_eq!(labels.to_vec(), PRIORITY_LABELS.to_vec());

        Ok(vec![0.9, 0.05, 0.03, 0.02])
    });

    let mut embedder = MockEmbed::new();
    embedder.expect_embed().returning(|text| Ok(topic_vector(text)));

    let triager = build_triager(small_roster(), embedder, classifier).await;

    let result = triager.triage(&Ticket::new("Disk full", "The database volume is at 100%")).await.unwrap();

    assert_eq!(result.priority, Priority::P0);
    assert_eq!(result.assignee, "emp4");
}

#[tokio::test]
async fn test_similarity_tie_goes_to_first_listed() {
    let roster = vec![
        Employer::new("first", "Ann", &["Docker", "Kubernetes"]),
        Employer::new("second", "Ben", &["Docker", "Kubernetes"]),
    ];
    let triager = build_triager(roster, get_mock_embedder(), get_mock_classifier(vec![0.25, 0.25, 0.25, 0.25])).await;

    for _ in 0..3 {
        let result = triager.triage(&Ticket::new("Pods evicted", "Kubernetes keeps evicting pods")).await.unwrap();

        assert_eq!(result.assignee, "first");
        assert_eq!(result.priority, Priority::P0);
    }
}

#[tokio::test]
async fn test_classification_tie_goes_to_earliest_label() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.1, 0.1, 0.4, 0.4])).await;

    let result = triager.triage(&Ticket::new("Typo", "A typo on the React settings page")).await.unwrap();

    assert_eq!(result.priority, Priority::P2);
    assert!(result.first_reply.contains("medium-priority issue (priority score: 40.0/100)"));
}

#[tokio::test]
async fn test_fallback_skills_only_when_match_has_none() {
    let roster = vec![Employer::new("generalist", "Gale", &[])];
    let triager = build_triager(roster, get_mock_embedder(), get_mock_classifier(vec![0.0, 0.0, 0.2, 0.8])).await;

    let result = triager.triage(&Ticket::new("Question", "How do I reset my password?")).await.unwrap();

    assert_eq!(result.assignee, "generalist");
    assert_eq!(result.priority, Priority::P3);
    assert!(result.rationale.ends_with("Ticket content suggests skills needed: General technical support"));
    assert!(result.assignee_reason.starts_with("Best skills match (similarity score: 0.00): Gale"));

    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.0, 0.0, 0.2, 0.8])).await;
    let result = triager.triage(&Ticket::new("Question", "How do I reset my password?")).await.unwrap();

    assert!(!result.rationale.contains("General technical support"));
}

#[tokio::test]
async fn test_similarity_renders_two_decimals() {
    let mut embedder = MockEmbed::new();
    embedder.expect_embed().returning(|text| if text.starts_with("Slow") { Ok(vec![1.0, 1.0, 0.0]) } else { Ok(topic_vector(text)) });

    let triager = build_triager(small_roster(), embedder, get_mock_classifier(vec![0.1, 0.2, 0.3, 0.4])).await;

    let result = triager.triage(&Ticket::new("Slow", "queries")).await.unwrap();

    // cos([1, 1, 0], [1, 0, 0]) = 0.7071...; the first of two equal matches wins.
    assert_eq!(result.assignee, "emp4");
    assert!(result.assignee_reason.starts_with("Best skills match (similarity score: 0.71): Diana"));
}

#[tokio::test]
async fn test_triage_is_deterministic() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.31, 0.29, 0.2, 0.2])).await;
    let ticket = Ticket::new("Deploy failed", "Docker image build fails in CI");

    let first = triager.triage(&ticket).await.unwrap();
    let second = triager.triage(&ticket).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
}

#[tokio::test]
async fn test_concurrent_triages_share_one_index() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.1, 0.2, 0.3, 0.4])).await;

    let handles = (0..8)
        .map(|i| {
            let triager = triager.clone();
            tokio::spawn(async move { triager.triage(&Ticket::new(format!("Ticket {i}"), "Kubernetes node is down")).await })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().assignee, "emp5");
    }
}

#[tokio::test]
async fn test_empty_roster_is_rejected_before_embedding() {
    let mut embedder = MockEmbed::new();
    embedder.expect_embed().never();

    let result = EmbeddingIndex::build(Vec::new(), Embedder::new(Arc::new(embedder))).await;

    assert!(matches!(result, Err(TriageError::EmptyRoster)));
}

#[tokio::test]
async fn test_classifier_failure_fails_triage() {
    let mut classifier = MockClassify::new();
    classifier.expect_classify().times(1).returning(|_, _| Err(anyhow::anyhow!("model unavailable")));

    let triager = build_triager(small_roster(), get_mock_embedder(), classifier).await;

    let err = triager.triage(&Ticket::new("Outage", "Everything is down")).await.unwrap_err();

    assert!(matches!(err, TriageError::Inference(_)));
    assert!(err.to_string().contains("model unavailable"));
}

#[tokio::test]
async fn test_embedding_failure_fails_triage() {
    let mut embedder = MockEmbed::new();
    embedder.expect_embed().returning(|text| if text.contains(':') { Err(anyhow::anyhow!("rate limited")) } else { Ok(topic_vector(text)) });

    let triager = build_triager(small_roster(), embedder, get_mock_classifier(vec![0.1, 0.2, 0.3, 0.4])).await;

    let err = triager.triage(&Ticket::new("Outage", "Everything is down")).await.unwrap_err();

    assert!(matches!(err, TriageError::Inference(_)));
}

#[tokio::test]
async fn test_wrong_score_count_is_an_inference_error() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![1.0])).await;

    let err = triager.triage(&Ticket::new("Outage", "Everything is down")).await.unwrap_err();

    assert!(matches!(err, TriageError::Inference(_)));
}

#[tokio::test]
async fn test_offline_backends_respect_invariants() {
    let embedder = Embedder::hash(256);
    let index = EmbeddingIndex::build(default_roster(), embedder.clone()).await.unwrap();
    let triager = Triager::new(Arc::new(index), PriorityClassifier::new(Classifier::similarity(embedder, 0.05)));

    let tickets = [
        Ticket::new("Production down", "Urgent critical outage of the Kubernetes cluster on AWS"),
        Ticket::new("Slow report", "PostgreSQL query for the monthly report is slow"),
        Ticket::new("Button color", "Low priority: the Figma mockup and frontend design disagree"),
        Ticket::new("", ""),
    ];

    let ids = default_roster().into_iter().map(|e| e.id).collect::<Vec<_>>();
    let urgency = [
        "critical issue (priority score: ",
        "high-priority issue (priority score: ",
        "medium-priority issue (priority score: ",
        "low-priority issue (priority score: ",
    ];

    for ticket in &tickets {
        let result = triager.triage(ticket).await.unwrap();

        assert!(ids.contains(&result.assignee));
        assert!((0.0..=100.0).contains(&result.priority_score));

        let phrases = urgency.iter().filter(|phrase| result.first_reply.contains(*phrase)).count();
        assert_eq!(phrases, 1);
        assert!(result.first_reply.contains(&format!("{:.1}/100", result.priority_score)));
    }

    let outage = triager.triage(&tickets[0]).await.unwrap();
    assert_eq!(outage.assignee, "emp5");
    assert_eq!(outage.priority, Priority::P0);
}

// Runtime tests.

fn offline_config(roster_path: Option<std::path::PathBuf>) -> Config {
    Config {
        inner: Arc::new(ConfigInner {
            embedding_backend: "hash".to_string(),
            classifier_backend: "similarity".to_string(),
            hash_embedding_dims: 128,
            roster_path,
            ..Default::default()
        }),
    }
}

#[tokio::test]
async fn test_runtime_builds_offline() {
    let runtime = Runtime::new(offline_config(None)).await.expect("Failed to build runtime");

    assert_eq!(runtime.triager.index().roster().len(), 10);
    assert_eq!(runtime.app_state().triage_timeout, Duration::from_secs(120));
}

#[tokio::test]
async fn test_runtime_fails_on_empty_roster_file() {
    let path = std::env::temp_dir().join(format!("ticket-triage-empty-roster-{}.json", std::process::id()));
    std::fs::write(&path, "[]").unwrap();

    let result = Runtime::new(offline_config(Some(path.clone()))).await;
    std::fs::remove_file(&path).unwrap();

    assert!(result.is_err());
}

// HTTP tests.

#[tokio::test]
async fn test_http_create_and_triage() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.05, 0.15, 0.2, 0.6])).await;
    let app = router(app_state(triager, Duration::from_secs(5)));

    let (status, body) = send(
        app.clone(),
        "POST",
        "/tickets-with-triage",
        Some(serde_json::json!({ "user_id": "u1", "title": "Migration", "description": "SQL migration question" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let created: TicketWithTriage = serde_json::from_value(body).unwrap();
    assert_eq!(created.triage_result.priority, Priority::P3);
    assert_eq!(created.triage_result.assignee, "emp4");
    assert_eq!(created.ticket.assignee.as_deref(), Some("emp4"));
    assert_eq!(created.ticket.priority, Some(Priority::P3));
    assert_eq!(created.ticket.status, "open");

    let (status, body) = send(app, "GET", &format!("/tickets/{}", created.ticket.id), None).await;
    assert_eq!(status, StatusCode::OK);

    let stored: TicketRecord = serde_json::from_value(body).unwrap();
    assert_eq!(stored, created.ticket);
}

#[tokio::test]
async fn test_http_create_then_triage() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.8, 0.1, 0.05, 0.05])).await;
    let app = router(app_state(triager, Duration::from_secs(5)));

    let (status, body) = send(
        app.clone(),
        "POST",
        "/tickets",
        Some(serde_json::json!({ "user_id": "u2", "title": "Cluster down", "description": "Kubernetes API unreachable" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let ticket: TicketRecord = serde_json::from_value(body).unwrap();
    assert!(ticket.priority.is_none());

    let (status, body) = send(app.clone(), "POST", &format!("/tickets/{}/triage", ticket.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["priority"], "P0");
    assert_eq!(body["assignee"], "emp5");

    let (status, body) = send(app, "GET", "/tickets", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["priority"], "P0");
    assert_eq!(body[0]["priority_score"], 80.0);
}

#[tokio::test]
async fn test_http_unknown_ticket_is_404() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.1, 0.2, 0.3, 0.4])).await;
    let app = router(app_state(triager, Duration::from_secs(5)));

    let (status, body) = send(app.clone(), "GET", "/tickets/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Ticket not found");

    let (status, _) = send(app, "POST", "/tickets/nope/triage", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_http_triage_failure_is_500() {
    let mut classifier = MockClassify::new();
    classifier.expect_classify().returning(|_, _| Err(anyhow::anyhow!("model unavailable")));

    let triager = build_triager(small_roster(), get_mock_embedder(), classifier).await;
    let app = router(app_state(triager, Duration::from_secs(5)));

    let (status, _) = send(
        app,
        "POST",
        "/tickets-with-triage",
        Some(serde_json::json!({ "user_id": "u3", "title": "Outage", "description": "Down" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_http_triage_timeout_is_503() {
    let triager = build_triager(small_roster(), get_mock_embedder(), SlowClassifier).await;
    let app = router(app_state(triager, Duration::from_millis(50)));

    let (status, body) = send(
        app,
        "POST",
        "/tickets-with-triage",
        Some(serde_json::json!({ "user_id": "u4", "title": "Outage", "description": "Down" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["detail"], "Triage timed out, please retry");
}

#[tokio::test]
async fn test_http_root_and_employers() {
    let triager = build_triager(small_roster(), get_mock_embedder(), get_mock_classifier(vec![0.1, 0.2, 0.3, 0.4])).await;
    let app = router(app_state(triager, Duration::from_secs(5)));

    let (status, body) = send(app.clone(), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Helpdesk Ticket System API with AI-powered triage");

    let (status, body) = send(app, "GET", "/employers", None).await;
    assert_eq!(status, StatusCode::OK);

    let employers: Vec<Employer> = serde_json::from_value(body).unwrap();
    assert_eq!(employers, small_roster());
}
