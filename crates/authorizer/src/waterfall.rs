use std::sync::Arc;

use async_trait::async_trait;

use crate::{Authorizer, AuthorizerError, AuthorizerInput, Decision, NotApplicable};

/// Hands the input to the first member that can handle it.
pub struct WaterfallAuthorizer {
    authorizers: Vec<Arc<dyn Authorizer>>,
}

impl WaterfallAuthorizer {
    pub fn new(authorizers: Vec<Arc<dyn Authorizer>>) -> Self {
        Self { authorizers }
    }

    async fn find(&self, input: &AuthorizerInput) -> Result<&Arc<dyn Authorizer>, NotApplicable> {
        let mut reasons = Vec::new();
        for authorizer in &self.authorizers {
            match authorizer.can_handle(input).await {
                Ok(()) => return Ok(authorizer),
                Err(signal) => reasons.push(signal.reason),
            }
        }
        Err(NotApplicable::new(format!(
            "no authorizer can handle {}: [{}]",
            input.target,
            reasons.join("; ")
        )))
    }
}

#[async_trait]
impl Authorizer for WaterfallAuthorizer {
    async fn can_handle(&self, input: &AuthorizerInput) -> Result<(), NotApplicable> {
        self.find(input).await.map(|_| ())
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        match self.find(input).await {
            Ok(authorizer) => authorizer.handle(input).await,
            Err(signal) => Ok(Decision::NotApplicable(signal)),
        }
    }
}
