//! End-to-end runs of the command line flow against an in-memory backend

use agentauth_authz::{Authorizer, AuthorizerRegistry, InMemoryAuthorizer};
use agentauth_cli::{print_report, resolve_config, resolve_networks, run, Cli};
use agentauth_core::{Actor, Resource};
use clap::Parser;
use std::io::Write;
use std::process::Command;
use std::sync::{Arc, Once};
use tempfile::NamedTempFile;

/// Variables the flags fall back to
const ENV_FALLBACKS: &[&str] = &[
    "AGENTAUTH_CONFIG",
    "USER",
    "AGENT_MANIFEST_FILE",
    "AGENT_AUTHORIZER",
    "AGENT_AUTHORIZER_ALLOW_ACTION",
    "AGENT_AUTHORIZER_RESOURCE_KEY",
    "AGENT_AUTHORIZER_ACTOR_KEY",
    "FGA_API_URL",
    "FGA_STORE_ID",
    "FGA_AUTHORIZATION_MODEL_ID",
    "FGA_API_TOKEN",
];

/// Parse flags with the environment fallbacks cleared
fn parse(args: &[&str]) -> Cli {
    static CLEAR_ENV: Once = Once::new();
    CLEAR_ENV.call_once(|| {
        for name in ENV_FALLBACKS {
            std::env::remove_var(name);
        }
    });

    Cli::parse_from(std::iter::once("agentauth").chain(args.iter().copied()))
}

/// One `read` batch on `sales` against the shared in-memory backend
fn shared_batch(users: &str, extra: &[&str]) -> Cli {
    let mut args = vec![
        "--authorizer",
        "shared",
        "--user",
        users,
        "--network",
        "sales",
        "--relations",
        "read",
        "--actor-type",
        "User",
        "--resource-type",
        "AgentNetwork",
    ];
    args.extend_from_slice(extra);
    parse(&args)
}

fn registry_with(store: &InMemoryAuthorizer) -> AuthorizerRegistry {
    let mut registry = AuthorizerRegistry::with_builtins();
    let store = store.clone();
    registry.register("shared", move |_| Ok(Arc::new(store.clone()) as Arc<dyn Authorizer>));
    registry
}

fn temp_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn lines(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out).lines().map(str::to_string).collect()
}

// ============================================================================
// BATCH RUNS
// ============================================================================

#[tokio::test]
async fn test_grant_from_manifest_and_config() {
    let manifest = temp_file(r#"{ "sales.hocon": true, "hr.hocon": false, "ops.hocon": {} }"#);
    let config = temp_file(
        r#"
        [batch]
        relations = "read write"

        [authorizer]
        backend = "shared"
        "#,
    );

    let store = InMemoryAuthorizer::new();
    let cli = parse(&[
        "--config",
        config.path().to_str().unwrap(),
        "--manifest",
        manifest.path().to_str().unwrap(),
        "--user",
        "alice",
        "--actor-type",
        "User",
        "--resource-type",
        "AgentNetwork",
    ]);

    let mut out = Vec::new();
    let report = run(&cli, &registry_with(&store), &mut out).await.unwrap();

    assert_eq!(
        report.status_lines(),
        vec![
            "Grant for User:alice read on AgentNetwork:sales succeeded",
            "Grant for User:alice write on AgentNetwork:sales succeeded",
            "Grant for User:alice read on AgentNetwork:ops succeeded",
            "Grant for User:alice write on AgentNetwork:ops succeeded",
        ]
    );

    let hr = Resource::new("AgentNetwork", "hr");
    assert!(!store.contains(&Actor::new("User", "alice"), "read", &hr).await);
}

#[tokio::test]
async fn test_revoke_named_networks() {
    let store = InMemoryAuthorizer::new();
    let registry = registry_with(&store);
    let mut out = Vec::new();

    let grant = shared_batch("alice bob", &[]);
    run(&grant, &registry, &mut out).await.unwrap().into_result().unwrap();
    assert_eq!(store.len().await, 2);

    let revoke = shared_batch("alice bob", &["--revoke"]);
    let report = run(&revoke, &registry, &mut out).await.unwrap();
    let results = report.into_result().unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.succeeded));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unknown_authorizer_fails_before_dispatch() {
    let store = InMemoryAuthorizer::new();
    let cli = parse(&["--authorizer", "ldap", "--user", "alice", "--network", "sales"]);

    let mut out = Vec::new();
    let err = run(&cli, &registry_with(&store), &mut out).await.unwrap_err();

    assert!(format!("{:#}", err).contains("Unknown authorizer 'ldap'"));
    assert!(out.is_empty());
    assert_eq!(store.sessions_opened(), 0);
}

// ============================================================================
// OUTPUT
// ============================================================================

#[tokio::test]
async fn test_output_reports_each_request() {
    let store = InMemoryAuthorizer::new();
    let cli = shared_batch("alice", &[]);

    let mut out = Vec::new();
    let report = run(&cli, &registry_with(&store), &mut out).await.unwrap();
    let results = print_report(report, &mut out).unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(
        lines(&out),
        vec![
            "Using Authorizer: InMemoryAuthorizer",
            "Grant for User:alice read on AgentNetwork:sales succeeded",
        ]
    );
}

#[tokio::test]
async fn test_output_marks_failed_requests() {
    let store = InMemoryAuthorizer::new();
    store
        .fail_on(Actor::new("User", "bob"), "read", Resource::new("AgentNetwork", "sales"))
        .await;
    let cli = shared_batch("alice bob", &[]);

    let mut out = Vec::new();
    let report = run(&cli, &registry_with(&store), &mut out).await.unwrap();
    let err = print_report(report, &mut out).unwrap_err();

    assert!(format!("{:#}", err).contains("failed (1 of 2 requests)"));
    assert_eq!(
        lines(&out),
        vec![
            "Using Authorizer: InMemoryAuthorizer".to_string(),
            "Grant for User:alice read on AgentNetwork:sales succeeded".to_string(),
            "FAILED: User:bob read on AgentNetwork:sales: Backend rejected request (500): \
             injected failure for User:bob read on AgentNetwork:sales"
                .to_string(),
        ]
    );
}

#[test]
fn test_binary_exits_non_zero_on_failed_request() {
    let mut command = Command::new(env!("CARGO_BIN_EXE_agentauth"));
    for name in ENV_FALLBACKS {
        command.env_remove(name);
    }

    // Nothing listens on the discard port, so every write fails in transport
    let output = command
        .args([
            "--authorizer",
            "openfga",
            "--fga-api-url",
            "http://127.0.0.1:9",
            "--fga-store-id",
            "01HSTORE",
            "--user",
            "alice",
            "--network",
            "sales",
            "--relations",
            "read",
        ])
        .output()
        .unwrap();

    assert!(!output.status.success());

    let stdout = lines(&output.stdout);
    assert_eq!(stdout.len(), 2, "unexpected output: {:?}", stdout);
    assert_eq!(stdout[0], "Using Authorizer: OpenFgaAuthorizer");
    assert!(
        stdout[1].starts_with("FAILED: User:alice read on AgentNetwork:sales: Transport error"),
        "unexpected line: {}",
        stdout[1]
    );
}

// ============================================================================
// RESOLUTION
// ============================================================================

#[test]
fn test_networks_flag_wins_over_manifest() {
    let manifest = temp_file(r#"{ "from_manifest.hocon": true }"#);
    let cli = parse(&[
        "--user",
        "alice",
        "--network",
        "sales hr",
        "--manifest",
        manifest.path().to_str().unwrap(),
    ]);

    let config = resolve_config(&cli).unwrap();
    assert_eq!(resolve_networks(&cli, &config).unwrap(), vec!["sales", "hr"]);
}

#[test]
fn test_missing_manifest_is_an_error() {
    let cli = parse(&["--user", "alice", "--manifest", "/nonexistent/manifest.json"]);

    let config = resolve_config(&cli).unwrap();
    let err = resolve_networks(&cli, &config).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read manifest"));
}

#[test]
fn test_malformed_config_file() {
    let config = temp_file("[batch\nrelations = ");
    let cli = parse(&["--config", config.path().to_str().unwrap(), "--user", "alice"]);

    let err = resolve_config(&cli).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config file"));
}
