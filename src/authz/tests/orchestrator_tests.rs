//! Batch orchestrator integration tests
//!
//! Cross product → one session → concurrent dispatch → per-request report

use agentauth_authz::{
    Authorizer, AuthorizerSession, AuthzError, BackendResult, BatchOrchestrator,
    InMemoryAuthorizer, OrchestratorConfig,
};
use agentauth_core::{expand, Actor, BackendError, BatchSpec, Operation, Resource};
use async_trait::async_trait;
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn alice_bob_sales(operation: Operation) -> BatchSpec {
    BatchSpec::new(names(&["alice", "bob"]), names(&["sales"]), operation)
        .with_relations(names(&["read", "write"]))
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[tokio::test]
async fn test_grant_then_regrant() {
    let authorizer = InMemoryAuthorizer::new();
    let orchestrator = BatchOrchestrator::new();
    let spec = alice_bob_sales(Operation::Grant);

    let first = orchestrator.execute(&authorizer, &spec).await.unwrap();
    assert_eq!(first.len(), 4);
    assert!(first.iter().all(|r| r.succeeded), "Fresh backend should accept every grant");

    let second = orchestrator.execute(&authorizer, &spec).await.unwrap();
    assert_eq!(second.len(), 4);
    assert!(second.iter().all(|r| !r.succeeded), "Rerun should find every relationship");

    assert_eq!(
        second[0].status_line(),
        "Grant for User:alice read on AgentNetwork:sales already existed"
    );
    assert_eq!(authorizer.len().await, 4);
}

#[tokio::test]
async fn test_revoke_after_grant() {
    let authorizer = InMemoryAuthorizer::new();
    let orchestrator = BatchOrchestrator::new();

    orchestrator
        .execute(&authorizer, &alice_bob_sales(Operation::Grant))
        .await
        .unwrap();

    let revoked = orchestrator
        .execute(&authorizer, &alice_bob_sales(Operation::Revoke))
        .await
        .unwrap();
    assert!(revoked.iter().all(|r| r.succeeded));
    assert_eq!(
        revoked[3].status_line(),
        "Revoke for User:bob write on AgentNetwork:sales succeeded"
    );

    let again = orchestrator
        .execute(&authorizer, &alice_bob_sales(Operation::Revoke))
        .await
        .unwrap();
    assert!(again.iter().all(|r| !r.succeeded));
    assert!(authorizer.is_empty().await);
}

#[tokio::test]
async fn test_duplicate_inputs_are_issued() {
    let authorizer = InMemoryAuthorizer::new();
    let spec = BatchSpec::new(names(&["alice", "alice"]), names(&["sales"]), Operation::Grant);

    let report = BatchOrchestrator::new().run(&authorizer, &spec).await.unwrap();

    assert_eq!(report.total(), 2);
    assert_eq!(report.changed(), 1);
    assert_eq!(report.unchanged(), 1);
    assert_eq!(authorizer.calls(), 2);
}

// ============================================================================
// SESSION LIFECYCLE
// ============================================================================

#[tokio::test]
async fn test_one_session_per_batch() {
    let authorizer = InMemoryAuthorizer::new();
    let report = BatchOrchestrator::new()
        .run(&authorizer, &alice_bob_sales(Operation::Grant))
        .await
        .unwrap();

    assert!(report.is_success());
    assert_eq!(authorizer.sessions_opened(), 1);
    assert_eq!(authorizer.sessions_closed(), 1);
    assert_eq!(authorizer.calls(), 4);
}

#[tokio::test]
async fn test_backend_error_fails_batch_and_closes_session() {
    let authorizer = InMemoryAuthorizer::new();
    authorizer
        .fail_on(Actor::new("User", "bob"), "read", Resource::new("AgentNetwork", "sales"))
        .await;

    let err = BatchOrchestrator::new()
        .execute(&authorizer, &alice_bob_sales(Operation::Grant))
        .await
        .unwrap_err();

    let batch = match err {
        AuthzError::Batch(batch) => batch,
        other => panic!("expected batch error, got {:?}", other),
    };
    assert_eq!(batch.failed, 1);
    assert_eq!(batch.total, 4);
    assert!(matches!(batch.source, BackendError::Rejected { status: 500, .. }));

    // Completed requests are still reported
    assert_eq!(batch.report.changed(), 3);
    let (failed_request, _) = batch.report.failures().next().unwrap();
    assert_eq!(failed_request.describe(), "User:bob read on AgentNetwork:sales");

    assert_eq!(authorizer.sessions_opened(), 1);
    assert_eq!(authorizer.sessions_closed(), 1);
}

/// Authorizer whose sessions cannot be opened
struct Unreachable;

#[async_trait]
impl Authorizer for Unreachable {
    fn name(&self) -> &str {
        "Unreachable"
    }

    async fn open(&self) -> BackendResult<Box<dyn AuthorizerSession>> {
        Err(BackendError::unavailable("connection refused"))
    }
}

#[tokio::test]
async fn test_open_failure_is_backend_error() {
    let err = BatchOrchestrator::new()
        .run(&Unreachable, &alice_bob_sales(Operation::Grant))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthzError::Backend(BackendError::Unavailable(_))));
}

/// Authorizer whose sessions fail to close cleanly
#[derive(Default)]
struct LeakyClose {
    closes: Arc<AtomicUsize>,
}

struct LeakySession {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Authorizer for LeakyClose {
    fn name(&self) -> &str {
        "LeakyClose"
    }

    async fn open(&self) -> BackendResult<Box<dyn AuthorizerSession>> {
        Ok(Box::new(LeakySession {
            closes: self.closes.clone(),
        }))
    }
}

#[async_trait]
impl AuthorizerSession for LeakySession {
    async fn grant(&self, _: &Actor, _: &str, _: &Resource) -> BackendResult<bool> {
        Ok(true)
    }

    async fn revoke(&self, _: &Actor, _: &str, _: &Resource) -> BackendResult<bool> {
        Ok(true)
    }

    async fn close(&self) -> BackendResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Err(BackendError::internal("token revocation failed"))
    }
}

#[tokio::test]
async fn test_close_failure_surfaces_on_clean_batch() {
    let authorizer = LeakyClose::default();
    let report = BatchOrchestrator::new()
        .run(&authorizer, &alice_bob_sales(Operation::Revoke))
        .await
        .unwrap();

    assert_eq!(report.changed(), 4);
    assert!(!report.is_success());
    assert_eq!(authorizer.closes.load(Ordering::SeqCst), 1);

    let err = report.into_result().unwrap_err();
    assert_eq!(err.failed, 0);
    assert_eq!(err.source, BackendError::internal("token revocation failed"));
}

/// Authorizer whose grants for `bob` panic
#[derive(Default)]
struct Panicky {
    closes: Arc<AtomicUsize>,
}

struct PanickySession {
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl Authorizer for Panicky {
    fn name(&self) -> &str {
        "Panicky"
    }

    async fn open(&self) -> BackendResult<Box<dyn AuthorizerSession>> {
        Ok(Box::new(PanickySession {
            closes: self.closes.clone(),
        }))
    }
}

#[async_trait]
impl AuthorizerSession for PanickySession {
    async fn grant(&self, actor: &Actor, _: &str, _: &Resource) -> BackendResult<bool> {
        if actor.id == "bob" {
            panic!("grant handler crashed");
        }
        Ok(true)
    }

    async fn revoke(&self, _: &Actor, _: &str, _: &Resource) -> BackendResult<bool> {
        Ok(true)
    }

    async fn close(&self) -> BackendResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[tokio::test]
async fn test_panicking_call_fails_request_and_closes_session() {
    let authorizer = Panicky::default();
    let report = BatchOrchestrator::new()
        .run(&authorizer, &alice_bob_sales(Operation::Grant))
        .await
        .unwrap();

    assert_eq!(report.changed(), 2);
    assert_eq!(report.failed(), 2);
    assert_eq!(authorizer.closes.load(Ordering::SeqCst), 1);

    let (request, error) = report.failures().next().unwrap();
    assert_eq!(request.describe(), "User:bob read on AgentNetwork:sales");
    assert_eq!(
        *error,
        BackendError::internal("backend call panicked: grant handler crashed")
    );
}

#[tokio::test]
async fn test_abandoned_batch_closes_session() {
    let authorizer = InMemoryAuthorizer::new().with_latency(Duration::from_millis(200));
    let spec = alice_bob_sales(Operation::Grant);

    let timed_out = tokio::time::timeout(
        Duration::from_millis(20),
        BatchOrchestrator::new().run(&authorizer, &spec),
    )
    .await;
    assert!(timed_out.is_err());
    assert_eq!(authorizer.sessions_opened(), 1);

    // Close runs on a background task
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(authorizer.sessions_closed(), 1);
    assert!(authorizer.is_empty().await);
}

// ============================================================================
// CONCURRENCY
// ============================================================================

#[tokio::test]
async fn test_requests_are_dispatched_concurrently() {
    let authorizer = InMemoryAuthorizer::new().with_latency(Duration::from_millis(50));
    let actors: Vec<String> = (0..20).map(|i| format!("user{}", i)).collect();
    let spec = BatchSpec::new(actors, names(&["sales"]), Operation::Grant);

    let start = Instant::now();
    let report = BatchOrchestrator::new().run(&authorizer, &spec).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(report.changed(), 20);
    assert_eq!(authorizer.peak_in_flight(), 20);
    assert!(
        elapsed < Duration::from_millis(20 * 50),
        "20 calls of 50ms should overlap, took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_bounded_fan_out() {
    let authorizer = InMemoryAuthorizer::new().with_latency(Duration::from_millis(10));
    let actors: Vec<String> = (0..12).map(|i| format!("user{}", i)).collect();
    let spec = BatchSpec::new(actors, names(&["sales", "hr"]), Operation::Grant);

    let orchestrator = BatchOrchestrator::with_config(OrchestratorConfig {
        max_in_flight: Some(3),
    });
    let report = orchestrator.run(&authorizer, &spec).await.unwrap();

    assert_eq!(report.total(), 24);
    assert_eq!(report.changed(), 24);
    assert_eq!(authorizer.peak_in_flight(), 3, "Calls should overlap up to the bound");

    let issued: Vec<_> = report.outcomes.iter().map(|o| o.request.clone()).collect();
    assert_eq!(issued, spec.requests(), "Report must follow issuance order");
}

#[tokio::test]
async fn test_shared_across_spawned_batches() {
    let authorizer = Arc::new(InMemoryAuthorizer::new());

    let handles: Vec<_> = ["sales", "hr", "ops"]
        .into_iter()
        .map(|network| {
            let authorizer = authorizer.clone();
            tokio::spawn(async move {
                let spec = BatchSpec::new(names(&["alice"]), names(&[network]), Operation::Grant);
                BatchOrchestrator::new()
                    .execute(authorizer.as_ref(), &spec)
                    .await
                    .map(|results| results.len())
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), 1);
    }

    assert_eq!(authorizer.sessions_opened(), 3);
    assert_eq!(authorizer.sessions_closed(), 3);
    assert_eq!(authorizer.len().await, 3);
}

// ============================================================================
// PROPERTY-BASED TESTS (PROPTEST)
// ============================================================================

proptest! {
    #[test]
    fn test_every_triple_is_issued_once(
        actors in proptest::collection::vec("[a-z]{1,6}", 1..5),
        relations in proptest::collection::vec("(read|write|admin)", 1..3),
        resources in proptest::collection::vec("[a-z]{1,6}", 1..4),
    ) {
        tokio_test::block_on(async {
            let authorizer = InMemoryAuthorizer::new();
            let requests = expand(&actors, &relations, &resources, "User", "AgentNetwork");

            let report = BatchOrchestrator::new()
                .run_batch(&authorizer, requests.clone(), Operation::Grant)
                .await
                .unwrap();

            assert_eq!(report.total(), actors.len() * relations.len() * resources.len());
            assert_eq!(authorizer.calls(), report.total());
            assert_eq!(authorizer.sessions_opened(), 1);
            assert_eq!(authorizer.sessions_closed(), 1);
            assert_eq!(report.failed(), 0);
        });
    }
}
