use std::sync::Arc;

use ldp_authorizer::{
    AccessMode, AllowAllAuthorizer, Authorizer, AuthorizerInput, Credential, CredentialGroup,
    Credentials, Decision, DenialKind, DenyAllAuthorizer, NotApplicable,
    PermissionBasedAuthorizer, PermissionSet, WaterfallAuthorizer,
};

const R: &str = "http://x/r";

fn read_write(credentials: Credentials, write: bool) -> AuthorizerInput {
    AuthorizerInput::single(
        R.into(),
        credentials,
        [AccessMode::Read, AccessMode::Write],
        PermissionSet::new()
            .with(AccessMode::Read, true)
            .with(AccessMode::Write, write),
    )
}

#[tokio::test]
async fn all_modes_granted_lets_anonymous_through() {
    let decision = PermissionBasedAuthorizer::new()
        .handle(&read_write(Credentials::anonymous(), true))
        .await
        .unwrap();
    assert_eq!(decision, Decision::Granted);
    assert!(decision.into_result().is_ok());
}

#[tokio::test]
async fn denial_kind_follows_authentication() {
    let authorizer = PermissionBasedAuthorizer::new();

    let anonymous = authorizer
        .handle(&read_write(Credentials::anonymous(), false))
        .await
        .unwrap();
    assert_eq!(anonymous.denial_kind(), Some(DenialKind::Unauthorized));
    assert_eq!(anonymous.into_result().unwrap_err().status_code(), 401);

    let agent = authorizer
        .handle(&read_write(Credentials::agent("https://alice.example/#me"), false))
        .await
        .unwrap();
    assert_eq!(agent.denial_kind(), Some(DenialKind::Forbidden));
    assert_eq!(agent.into_result().unwrap_err().status_code(), 403);

    let client_only = Credentials::anonymous().with(
        CredentialGroup::Client,
        Some(Credential {
            client_id: Some("https://app.example/id".into()),
            ..Credential::default()
        }),
    );
    let client = authorizer
        .handle(&read_write(client_only, false))
        .await
        .unwrap();
    assert_eq!(client.denial_kind(), Some(DenialKind::Forbidden));
}

#[tokio::test]
async fn explicit_false_and_missing_entry_are_equivalent() {
    let authorizer = PermissionBasedAuthorizer::new();
    let missing = AuthorizerInput::single(
        R.into(),
        Credentials::anonymous(),
        [AccessMode::Write],
        PermissionSet::new(),
    );
    let explicit = AuthorizerInput::single(
        R.into(),
        Credentials::anonymous(),
        [AccessMode::Write],
        PermissionSet::new().with(AccessMode::Write, false),
    );

    assert_eq!(
        authorizer.handle(&missing).await.unwrap(),
        authorizer.handle(&explicit).await.unwrap()
    );
}

#[tokio::test]
async fn identical_inputs_give_identical_outcomes() {
    let authorizer = PermissionBasedAuthorizer::new();
    let first = authorizer
        .handle(&read_write(Credentials::anonymous(), false))
        .await
        .unwrap();
    let second = authorizer
        .handle(&read_write(Credentials::anonymous(), false))
        .await
        .unwrap();
    assert_eq!(first, second);
}

struct NeverApplicable;

#[async_trait::async_trait]
impl Authorizer for NeverApplicable {
    async fn can_handle(&self, _input: &AuthorizerInput) -> Result<(), NotApplicable> {
        Err(NotApplicable::new("never"))
    }

    async fn handle(
        &self,
        _input: &AuthorizerInput,
    ) -> Result<Decision, ldp_authorizer::AuthorizerError> {
        Ok(Decision::Granted)
    }
}

#[tokio::test]
async fn handle_safe_never_turns_not_applicable_into_a_grant() {
    let decision = NeverApplicable
        .handle_safe(&read_write(Credentials::anonymous(), true))
        .await
        .unwrap();
    assert!(matches!(decision, Decision::NotApplicable(_)));
    assert!(!decision.is_granted());
}

#[tokio::test]
async fn waterfall_uses_first_applicable_member() {
    let members: Vec<Arc<dyn Authorizer>> = vec![
        Arc::new(NeverApplicable),
        Arc::new(DenyAllAuthorizer),
        Arc::new(AllowAllAuthorizer),
    ];
    let waterfall = WaterfallAuthorizer::new(members);
    let decision = waterfall
        .handle_safe(&read_write(Credentials::anonymous(), true))
        .await
        .unwrap();
    assert_eq!(decision.denial_kind(), Some(DenialKind::Unauthorized));
}

#[tokio::test]
async fn waterfall_without_applicable_member_is_not_applicable() {
    let waterfall = WaterfallAuthorizer::new(vec![Arc::new(NeverApplicable) as Arc<dyn Authorizer>]);
    let input = read_write(Credentials::anonymous(), true);

    let signal = waterfall.can_handle(&input).await.unwrap_err();
    assert!(signal.reason.contains("never"));
    assert!(matches!(
        waterfall.handle(&input).await.unwrap(),
        Decision::NotApplicable(_)
    ));
}
