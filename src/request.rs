//! Request files evaluated by `ldp-authz check`.
//!
//! A request file describes one incoming request the way the HTTP layer
//! would hand it to the authorizer: the target, the requester's
//! credentials, what it wants to do and the permissions already computed
//! for it. `existing_resources` stands in for the resource store.

use std::path::Path;
use std::sync::Arc;

use ldp_authorizer::{
    build_authorizer, AccessMap, AccessMode, AuthorizerConfig, AuthorizerError, AuthorizerInput,
    ConfigError, Credentials, Decision, DenialKind, InMemoryResourceSet, MethodModesExtractor,
    MultiPermissionMap, ResourceIdentifier,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RequestFile {
    pub target: ResourceIdentifier,
    #[serde(default)]
    pub credentials: Credentials,
    /// HTTP method, used when `requested_modes` is absent.
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub requested_modes: Option<AccessMap>,
    #[serde(default)]
    pub available_permissions: MultiPermissionMap,
    #[serde(default)]
    pub existing_resources: Vec<ResourceIdentifier>,
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse request: {0}")]
    Parse(String),
    #[error("request names neither a method nor requested modes")]
    MissingModes,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Authorizer(#[from] AuthorizerError),
}

impl RequestFile {
    pub fn parse(raw: &str) -> Result<Self, RequestError> {
        match serde_json::from_str(raw) {
            Ok(request) => Ok(request),
            Err(json_err) => serde_yaml::from_str(raw).map_err(|yaml_err| {
                RequestError::Parse(format!(
                    "json error: {}; yaml error: {}",
                    json_err, yaml_err
                ))
            }),
        }
    }

    pub async fn load(path: &Path) -> Result<Self, RequestError> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::parse(&raw)
    }
}

/// Verdict as printed by the CLI.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct Outcome {
    pub decision: &'static str,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<AccessMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Outcome {
    pub fn is_granted(&self) -> bool {
        self.status == 200
    }
}

impl From<Decision> for Outcome {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Granted => Outcome {
                decision: "granted",
                status: 200,
                identifier: None,
                mode: None,
                reason: None,
            },
            Decision::Denied(denial) => Outcome {
                decision: match denial.kind {
                    DenialKind::Unauthorized => "unauthorized",
                    DenialKind::Forbidden => "forbidden",
                    DenialKind::NotFound => "not_found",
                },
                status: denial.kind.status_code(),
                identifier: Some(denial.identifier.to_string()),
                mode: denial.mode,
                reason: None,
            },
            Decision::NotApplicable(signal) => Outcome {
                decision: "not_applicable",
                status: 500,
                identifier: None,
                mode: None,
                reason: Some(signal.reason),
            },
        }
    }
}

/// Run a request through the chains described by `config`.
pub async fn evaluate(
    request: RequestFile,
    config: &AuthorizerConfig,
) -> Result<Outcome, RequestError> {
    let resources: Arc<InMemoryResourceSet> =
        Arc::new(request.existing_resources.into_iter().collect());

    let requested_modes = match (request.requested_modes, request.method) {
        (Some(modes), _) => modes,
        (None, Some(method)) => {
            MethodModesExtractor::new(resources.clone())
                .extract(&method, &request.target)
                .await?
        }
        (None, None) => return Err(RequestError::MissingModes),
    };

    let (authorizer, audited) = build_authorizer(config, resources)?;
    let mut audit_rx = audited.map(|audited| audited.subscribe());

    let input = AuthorizerInput::new(
        request.target,
        request.credentials,
        requested_modes,
        request.available_permissions,
    );
    let decision = authorizer.handle_safe(&input).await?;

    if let Some(rx) = audit_rx.as_mut() {
        while let Ok(event) = rx.try_recv() {
            info!(
                target = "ldp-authz",
                id = %event.id,
                outcome = ?event.outcome,
                authenticated = event.authenticated,
                "audit {}",
                event.target
            );
        }
    }

    debug!(target = "ldp-authz", resource = %input.target, ?decision, "request evaluated");
    Ok(decision.into())
}
