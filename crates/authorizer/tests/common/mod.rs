#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use ldp_authorizer::{
    AuthorizerError, Authorizer, AuthorizerInput, AuxiliaryIdentifierStrategy, Decision,
    NotApplicable, ResourceIdentifier, ResourceSet,
};
use tokio::sync::Mutex;

/// Authorizer that records every input it handles and answers with a fixed decision.
pub struct RecordingAuthorizer {
    pub calls: Arc<Mutex<Vec<AuthorizerInput>>>,
    decision: Decision,
}

impl RecordingAuthorizer {
    pub fn answering(decision: Decision) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            decision,
        }
    }

    pub fn granting() -> Self {
        Self::answering(Decision::Granted)
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl Authorizer for RecordingAuthorizer {
    async fn can_handle(&self, _input: &AuthorizerInput) -> Result<(), NotApplicable> {
        Ok(())
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        self.calls.lock().await.push(input.clone());
        Ok(self.decision.clone())
    }
}

/// Resource store that is always unavailable.
pub struct UnavailableResourceSet;

#[async_trait]
impl ResourceSet for UnavailableResourceSet {
    async fn has_resource(&self, _identifier: &ResourceIdentifier) -> Result<bool, AuthorizerError> {
        Err(AuthorizerError::ResourceStore("backend offline".into()))
    }
}

/// Recognises `.acl` resources but cannot resolve their subject.
pub struct UnresolvableAuxiliaryStrategy;

impl AuxiliaryIdentifierStrategy for UnresolvableAuxiliaryStrategy {
    fn is_auxiliary_identifier(&self, identifier: &ResourceIdentifier) -> bool {
        identifier.as_str().ends_with(".acl")
    }

    fn associated_identifier(
        &self,
        _identifier: &ResourceIdentifier,
    ) -> Result<ResourceIdentifier, AuthorizerError> {
        Err(AuthorizerError::ResourceStore("subject lookup failed".into()))
    }
}
