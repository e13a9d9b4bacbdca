use async_trait::async_trait;
use tracing::debug;

use crate::{
    Authorizer, AuthorizerError, AuthorizerInput, Decision, Denial, DenialKind, NotApplicable,
};

/// Checks every requested mode against the resolved permission map.
///
/// The first missing grant, in map order, decides the outcome.
#[derive(Clone, Debug, Default)]
pub struct PermissionBasedAuthorizer;

impl PermissionBasedAuthorizer {
    pub fn new() -> Self {
        Self
    }

    fn evaluate(&self, input: &AuthorizerInput) -> Decision {
        for (identifier, modes) in input.requested_modes.iter() {
            let permissions = input.available_permissions.get(identifier);
            for mode in modes {
                let granted = permissions.is_some_and(|set| set.is_granted(*mode));
                if !granted {
                    let kind = DenialKind::for_credentials(&input.credentials);
                    debug!(
                        target = "ldp-authorizer",
                        %identifier,
                        %mode,
                        %kind,
                        "requested mode not granted"
                    );
                    return Decision::Denied(Denial::new(kind, identifier.clone(), Some(*mode)));
                }
            }
        }
        Decision::Granted
    }
}

#[async_trait]
impl Authorizer for PermissionBasedAuthorizer {
    async fn can_handle(&self, _input: &AuthorizerInput) -> Result<(), NotApplicable> {
        Ok(())
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        Ok(self.evaluate(input))
    }
}
