use std::io::Write;
use std::sync::Arc;

use ldp_authorizer::config::{default_config, load_config_from_path};
use ldp_authorizer::{
    build_authorizer, AccessMap, AccessMode, AuditOutcome, AuthorizerConfig, AuthorizerInput,
    ChainKind, ConfigError, Credentials, Decision, DenialKind, InMemoryResourceSet,
    MultiPermissionMap, PermissionSet, RouteConfig,
};

fn config(audit: bool) -> AuthorizerConfig {
    AuthorizerConfig {
        base_url: "http://pod.example/".into(),
        auxiliary_suffixes: vec![".acl".into()],
        routes: vec![
            RouteConfig {
                pattern: "^/\\.well-known/".into(),
                chain: ChainKind::AllowAll,
                notes: None,
            },
            RouteConfig {
                pattern: "^/locked/".into(),
                chain: ChainKind::DenyAll,
                notes: None,
            },
            RouteConfig {
                pattern: "^/".into(),
                chain: ChainKind::WebAcl,
                notes: Some("pod space".into()),
            },
        ],
        audit,
    }
}

fn request(target: &str, modes: &[AccessMode], permissions: MultiPermissionMap) -> AuthorizerInput {
    AuthorizerInput::new(
        target.into(),
        Credentials::anonymous(),
        AccessMap::single(target.into(), modes.iter().copied()),
        permissions,
    )
}

#[tokio::test]
async fn static_routes_take_precedence() {
    let (authorizer, _) =
        build_authorizer(&config(false), Arc::new(InMemoryResourceSet::new())).unwrap();

    let open = authorizer
        .handle_safe(&request(
            "http://pod.example/.well-known/solid",
            &[AccessMode::Read],
            MultiPermissionMap::new(),
        ))
        .await
        .unwrap();
    assert_eq!(open, Decision::Granted);

    let locked = authorizer
        .handle_safe(&request(
            "http://pod.example/locked/secret",
            &[AccessMode::Read],
            MultiPermissionMap::new(),
        ))
        .await
        .unwrap();
    assert_eq!(locked.denial_kind(), Some(DenialKind::Unauthorized));
}

#[tokio::test]
async fn web_acl_route_handles_documents_and_acls() {
    let resources: InMemoryResourceSet = ["http://pod.example/notes/a"].into_iter().collect();
    let (authorizer, _) = build_authorizer(&config(false), Arc::new(resources)).unwrap();
    let permissions = MultiPermissionMap::new().with(
        "http://pod.example/notes/a".into(),
        PermissionSet::new().with(AccessMode::Read, true),
    );

    let document = authorizer
        .handle_safe(&request(
            "http://pod.example/notes/a",
            &[AccessMode::Read],
            permissions.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(document, Decision::Granted);

    let acl = authorizer
        .handle_safe(&request(
            "http://pod.example/notes/a.acl",
            &[AccessMode::Read],
            permissions.clone(),
        ))
        .await
        .unwrap();
    assert_eq!(acl, Decision::Granted);

    let write = authorizer
        .handle_safe(&request(
            "http://pod.example/notes/a",
            &[AccessMode::Write],
            permissions,
        ))
        .await
        .unwrap();
    assert_eq!(write.denial_kind(), Some(DenialKind::Unauthorized));
}

#[tokio::test]
async fn web_acl_route_masks_deletes_of_absent_resources() {
    let (authorizer, _) =
        build_authorizer(&config(false), Arc::new(InMemoryResourceSet::new())).unwrap();
    let permissions = MultiPermissionMap::new().with(
        "http://pod.example/notes/".into(),
        PermissionSet::new().with(AccessMode::Read, true),
    );

    let decision = authorizer
        .handle_safe(&request(
            "http://pod.example/notes/gone",
            &[AccessMode::Delete],
            permissions,
        ))
        .await
        .unwrap();

    assert_eq!(decision.denial_kind(), Some(DenialKind::NotFound));
    assert_eq!(decision.into_result().unwrap_err().status_code(), 404);
}

#[tokio::test]
async fn audit_event_emitted_on_decision() {
    let (authorizer, audited) =
        build_authorizer(&config(true), Arc::new(InMemoryResourceSet::new())).unwrap();
    let mut rx = audited.expect("audit enabled").subscribe();

    authorizer
        .handle_safe(&request(
            "http://pod.example/locked/x",
            &[AccessMode::Read],
            MultiPermissionMap::new(),
        ))
        .await
        .unwrap();

    let event = rx.recv().await.expect("receive audit event");
    assert_eq!(event.target, "http://pod.example/locked/x");
    assert_eq!(event.outcome, AuditOutcome::Unauthorized);
    assert_eq!(
        event.denied_identifier.as_deref(),
        Some("http://pod.example/locked/x")
    );
    assert!(!event.authenticated);
}

#[test]
fn invalid_base_url_is_rejected() {
    let mut broken = config(false);
    broken.base_url = "not a url".into();
    let result = build_authorizer(&broken, Arc::new(InMemoryResourceSet::new()));
    assert!(matches!(result, Err(ConfigError::InvalidBaseUrl(_))));
}

#[tokio::test]
async fn config_loaded_from_file_builds_a_router() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "base_url: http://pod.example/\nroutes:\n  - pattern: \"^/\"\n    chain: deny_all"
    )
    .unwrap();

    let loaded = load_config_from_path(file.path()).unwrap();
    let (authorizer, _) =
        build_authorizer(&loaded, Arc::new(InMemoryResourceSet::new())).unwrap();

    let mut input = request(
        "http://pod.example/any",
        &[AccessMode::Read],
        MultiPermissionMap::new(),
    );
    input.credentials = Credentials::agent("https://alice.example/#me");
    let decision = authorizer.handle_safe(&input).await.unwrap();
    assert_eq!(decision.denial_kind(), Some(DenialKind::Forbidden));
}

#[tokio::test]
async fn default_config_routes_everything_through_web_acl() {
    let (authorizer, audited) = build_authorizer(
        &default_config("http://pod.example/"),
        Arc::new(InMemoryResourceSet::new()),
    )
    .unwrap();
    assert!(audited.is_none());

    let decision = authorizer
        .handle_safe(&request(
            "http://pod.example/doc",
            &[AccessMode::Read],
            MultiPermissionMap::new().with(
                "http://pod.example/doc".into(),
                PermissionSet::new().with(AccessMode::Read, true),
            ),
        ))
        .await
        .unwrap();
    assert_eq!(decision, Decision::Granted);
}
