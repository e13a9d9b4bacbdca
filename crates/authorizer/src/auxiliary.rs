use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::strategy::AuxiliaryIdentifierStrategy;
use crate::{Authorizer, AuthorizerError, AuthorizerInput, Decision, NotApplicable};

/// Authorizes auxiliary resources as if the request targeted the resource
/// they augment. Inputs whose target is not auxiliary are not applicable.
pub struct AuxiliaryAuthorizer {
    source: Arc<dyn Authorizer>,
    strategy: Arc<dyn AuxiliaryIdentifierStrategy>,
}

impl AuxiliaryAuthorizer {
    pub fn new(source: Arc<dyn Authorizer>, strategy: Arc<dyn AuxiliaryIdentifierStrategy>) -> Self {
        Self { source, strategy }
    }

    fn ensure_auxiliary(&self, input: &AuthorizerInput) -> Result<(), NotApplicable> {
        if self.strategy.is_auxiliary_identifier(&input.target) {
            Ok(())
        } else {
            Err(NotApplicable::new(format!(
                "{} is not an auxiliary resource",
                input.target
            )))
        }
    }

    /// Re-keys the target and its requested modes onto the associated
    /// identifier. Credentials and the permission map are carried over as-is.
    fn rewrite(&self, input: &AuthorizerInput) -> Result<AuthorizerInput, AuthorizerError> {
        let associated = self.strategy.associated_identifier(&input.target)?;
        let mut rewritten = input.clone();
        if let Some(modes) = rewritten.requested_modes.remove(&input.target) {
            rewritten.requested_modes.extend(associated.clone(), modes);
        }
        rewritten.target = associated;
        Ok(rewritten)
    }
}

#[async_trait]
impl Authorizer for AuxiliaryAuthorizer {
    async fn can_handle(&self, input: &AuthorizerInput) -> Result<(), NotApplicable> {
        self.ensure_auxiliary(input)?;
        // A failed lookup is claimed here so `handle` reports the error.
        match self.rewrite(input) {
            Ok(rewritten) => self.source.can_handle(&rewritten).await,
            Err(_) => Ok(()),
        }
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        if let Err(signal) = self.ensure_auxiliary(input) {
            return Ok(Decision::NotApplicable(signal));
        }
        let rewritten = self.rewrite(input)?;
        debug!(
            target = "ldp-authorizer",
            auxiliary = %input.target,
            associated = %rewritten.target,
            "authorizing auxiliary resource through its subject"
        );
        self.source.handle_safe(&rewritten).await
    }
}
