use std::borrow::Cow;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::strategy::{IdentifierStrategy, ResourceSet};
use crate::{
    AccessMode, Authorizer, AuthorizerError, AuthorizerInput, Decision, Denial, NotApplicable,
};

enum Masked<'a> {
    NotFound(Denial),
    Forward(Cow<'a, AuthorizerInput>),
}

/// Keeps DELETE responses from revealing whether a resource exists.
///
/// A requester may learn that a resource is absent only if its read access
/// on the resource or on the parent container already tells it so. In every
/// other case the delete grant is withdrawn and the source authorizer
/// refuses the request for an ordinary permission reason.
pub struct ReadDeleteAuthorizer {
    source: Arc<dyn Authorizer>,
    resources: Arc<dyn ResourceSet>,
    identifiers: Arc<dyn IdentifierStrategy>,
}

impl ReadDeleteAuthorizer {
    pub fn new(
        source: Arc<dyn Authorizer>,
        resources: Arc<dyn ResourceSet>,
        identifiers: Arc<dyn IdentifierStrategy>,
    ) -> Self {
        Self {
            source,
            resources,
            identifiers,
        }
    }

    async fn mask<'a>(&self, input: &'a AuthorizerInput) -> Result<Masked<'a>, AuthorizerError> {
        let mut forwarded = Cow::Borrowed(input);

        for (identifier, modes) in input.requested_modes.iter() {
            if !modes.contains(&AccessMode::Delete) {
                continue;
            }
            if self.resources.has_resource(identifier).await? {
                continue;
            }

            let permissions = &input.available_permissions;
            if permissions.is_granted(identifier, AccessMode::Read) {
                debug!(
                    target = "ldp-authorizer",
                    %identifier,
                    "delete on absent resource, read granted"
                );
                return Ok(Masked::NotFound(Denial::not_found(identifier.clone())));
            }
            if !self.identifiers.is_root_container(identifier) {
                let parent = self.identifiers.parent_container(identifier)?;
                if permissions.is_granted(&parent, AccessMode::Read) {
                    debug!(
                        target = "ldp-authorizer",
                        %identifier,
                        %parent,
                        "delete on absent resource, parent read granted"
                    );
                    return Ok(Masked::NotFound(Denial::not_found(identifier.clone())));
                }
            }
            if permissions.contains(identifier) {
                if let Some(set) = forwarded.to_mut().available_permissions.get_mut(identifier) {
                    set.set(AccessMode::Delete, false);
                }
            }
        }

        Ok(Masked::Forward(forwarded))
    }
}

#[async_trait]
impl Authorizer for ReadDeleteAuthorizer {
    async fn can_handle(&self, input: &AuthorizerInput) -> Result<(), NotApplicable> {
        self.source.can_handle(input).await
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        match self.mask(input).await? {
            Masked::NotFound(denial) => Ok(Decision::Denied(denial)),
            Masked::Forward(forwarded) => self.source.handle(&forwarded).await,
        }
    }
}
