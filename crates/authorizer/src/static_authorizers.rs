use async_trait::async_trait;

use crate::{
    Authorizer, AuthorizerError, AuthorizerInput, Decision, Denial, DenialKind, NotApplicable,
};

/// Grants every request.
#[derive(Clone, Debug, Default)]
pub struct AllowAllAuthorizer;

#[async_trait]
impl Authorizer for AllowAllAuthorizer {
    async fn can_handle(&self, _input: &AuthorizerInput) -> Result<(), NotApplicable> {
        Ok(())
    }

    async fn handle(&self, _input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        Ok(Decision::Granted)
    }
}

/// Refuses every request, as Unauthorized or Forbidden depending on the credentials.
#[derive(Clone, Debug, Default)]
pub struct DenyAllAuthorizer;

#[async_trait]
impl Authorizer for DenyAllAuthorizer {
    async fn can_handle(&self, _input: &AuthorizerInput) -> Result<(), NotApplicable> {
        Ok(())
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        let kind = DenialKind::for_credentials(&input.credentials);
        Ok(Decision::Denied(Denial::new(kind, input.target.clone(), None)))
    }
}
