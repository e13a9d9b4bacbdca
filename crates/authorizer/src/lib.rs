mod audit;
mod auxiliary;
pub mod builder;
pub mod config;
mod modes;
mod path_based;
mod permission_based;
mod read_delete;
mod static_authorizers;
pub mod strategy;
mod waterfall;

pub use crate::audit::{AuditEvent, AuditOutcome, AuditedAuthorizer};
pub use crate::auxiliary::AuxiliaryAuthorizer;
pub use crate::builder::{build_authorizer, build_router};
pub use crate::config::{AuthorizerConfig, ChainKind, ConfigError, RouteConfig};
pub use crate::modes::MethodModesExtractor;
pub use crate::path_based::PathBasedAuthorizer;
pub use crate::permission_based::PermissionBasedAuthorizer;
pub use crate::read_delete::ReadDeleteAuthorizer;
pub use crate::static_authorizers::{AllowAllAuthorizer, DenyAllAuthorizer};
pub use crate::strategy::{
    AuxiliaryIdentifierStrategy, IdentifierStrategy, InMemoryResourceSet, ResourceSet,
    SingleRootIdentifierStrategy, SuffixAuxiliaryStrategy,
};
pub use crate::waterfall::WaterfallAuthorizer;

pub use ldp_core_types::{
    AccessMap, AccessMode, AuthorizerInput, Credential, CredentialGroup, Credentials,
    MultiPermissionMap, PermissionSet, ResourceIdentifier,
};

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signal that an authorizer does not apply to an input.
///
/// This is a routing signal, never a security verdict.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("not applicable: {reason}")]
pub struct NotApplicable {
    pub reason: String,
}

impl NotApplicable {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Protocol-visible reason a request was refused.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthorized,
    Forbidden,
    NotFound,
}

impl DenialKind {
    /// Status the HTTP layer reports for this denial.
    pub fn status_code(&self) -> u16 {
        match self {
            DenialKind::Unauthorized => 401,
            DenialKind::Forbidden => 403,
            DenialKind::NotFound => 404,
        }
    }

    /// Unauthorized for anonymous requesters, Forbidden otherwise.
    pub fn for_credentials(credentials: &Credentials) -> Self {
        if credentials.is_authenticated() {
            DenialKind::Forbidden
        } else {
            DenialKind::Unauthorized
        }
    }
}

impl fmt::Display for DenialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DenialKind::Unauthorized => "unauthorized",
            DenialKind::Forbidden => "forbidden",
            DenialKind::NotFound => "not found",
        };
        f.write_str(label)
    }
}

/// A refusal, with the resource and mode that caused it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Denial {
    pub kind: DenialKind,
    pub identifier: ResourceIdentifier,
    pub mode: Option<AccessMode>,
}

impl Denial {
    pub fn new(kind: DenialKind, identifier: ResourceIdentifier, mode: Option<AccessMode>) -> Self {
        Self {
            kind,
            identifier,
            mode,
        }
    }

    pub fn not_found(identifier: ResourceIdentifier) -> Self {
        Self::new(DenialKind::NotFound, identifier, None)
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Some(mode) => write!(f, "{} ({} on {})", self.kind, mode, self.identifier),
            None => write!(f, "{} ({})", self.kind, self.identifier),
        }
    }
}

/// Outcome of running an authorizer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Granted,
    Denied(Denial),
    NotApplicable(NotApplicable),
}

impl Decision {
    pub fn is_granted(&self) -> bool {
        matches!(self, Decision::Granted)
    }

    pub fn denial_kind(&self) -> Option<DenialKind> {
        match self {
            Decision::Denied(denial) => Some(denial.kind),
            _ => None,
        }
    }

    /// Collapse into what the request pipeline acts on. A routing miss
    /// that reached this point is a misconfiguration, never a grant.
    pub fn into_result(self) -> Result<(), AuthorizationFailure> {
        match self {
            Decision::Granted => Ok(()),
            Decision::Denied(denial) => Err(AuthorizationFailure::Denied(denial)),
            Decision::NotApplicable(signal) => Err(AuthorizationFailure::Misconfigured(signal)),
        }
    }
}

/// Failure handed to the HTTP layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AuthorizationFailure {
    #[error("request denied: {0}")]
    Denied(Denial),
    #[error("no authorizer configured for request: {0}")]
    Misconfigured(NotApplicable),
}

impl AuthorizationFailure {
    pub fn status_code(&self) -> u16 {
        match self {
            AuthorizationFailure::Denied(denial) => denial.kind.status_code(),
            AuthorizationFailure::Misconfigured(_) => 500,
        }
    }
}

/// Errors raised by collaborators while reaching a verdict. These are
/// propagated unchanged and never turned into a decision.
#[derive(Clone, Debug, Error)]
pub enum AuthorizerError {
    #[error("resource store failure: {0}")]
    ResourceStore(String),
    #[error("invalid identifier {identifier}: {reason}")]
    InvalidIdentifier {
        identifier: ResourceIdentifier,
        reason: String,
    },
    #[error("{0} is not an auxiliary resource")]
    NotAuxiliary(ResourceIdentifier),
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// Authorization step in a request pipeline.
///
/// `can_handle` is a cheap, side-effect free applicability check; `handle`
/// performs the authorization. Inputs are borrowed: implementations that
/// need to adjust an input forward a modified copy.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn can_handle(&self, input: &AuthorizerInput) -> Result<(), NotApplicable>;

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError>;

    async fn handle_safe(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        if let Err(signal) = self.can_handle(input).await {
            return Ok(Decision::NotApplicable(signal));
        }
        self.handle(input).await
    }
}
