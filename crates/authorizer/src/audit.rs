use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use crate::{
    Authorizer, AuthorizerError, AuthorizerInput, Decision, DenialKind, NotApplicable,
};

/// Outcome categories recorded in the audit stream.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Granted,
    Unauthorized,
    Forbidden,
    NotFound,
    NotApplicable,
}

impl From<&Decision> for AuditOutcome {
    fn from(decision: &Decision) -> Self {
        match decision {
            Decision::Granted => AuditOutcome::Granted,
            Decision::Denied(denial) => match denial.kind {
                DenialKind::Unauthorized => AuditOutcome::Unauthorized,
                DenialKind::Forbidden => AuditOutcome::Forbidden,
                DenialKind::NotFound => AuditOutcome::NotFound,
            },
            Decision::NotApplicable(_) => AuditOutcome::NotApplicable,
        }
    }
}

/// Event emitted whenever the wrapped authorizer reaches a decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub target: String,
    pub outcome: AuditOutcome,
    pub denied_identifier: Option<String>,
    pub authenticated: bool,
    pub timestamp: SystemTime,
}

/// Publishes an [`AuditEvent`] for every decision of the wrapped authorizer.
pub struct AuditedAuthorizer {
    source: Arc<dyn Authorizer>,
    events: broadcast::Sender<AuditEvent>,
}

impl AuditedAuthorizer {
    pub fn new(source: Arc<dyn Authorizer>) -> Self {
        let (tx, _rx) = broadcast::channel(128);
        Self { source, events: tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.events.subscribe()
    }

    fn publish_event(&self, input: &AuthorizerInput, decision: &Decision) {
        let denied_identifier = match decision {
            Decision::Denied(denial) => Some(denial.identifier.to_string()),
            _ => None,
        };
        let event = AuditEvent {
            id: Uuid::new_v4(),
            target: input.target.to_string(),
            outcome: AuditOutcome::from(decision),
            denied_identifier,
            authenticated: input.credentials.is_authenticated(),
            timestamp: SystemTime::now(),
        };

        if let Err(err) = self.events.send(event) {
            warn!(
                target = "ldp-authorizer",
                "failed to publish audit event: {err}"
            );
        }
    }
}

#[async_trait]
impl Authorizer for AuditedAuthorizer {
    async fn can_handle(&self, input: &AuthorizerInput) -> Result<(), NotApplicable> {
        self.source.can_handle(input).await
    }

    async fn handle(&self, input: &AuthorizerInput) -> Result<Decision, AuthorizerError> {
        let decision = self.source.handle(input).await?;
        self.publish_event(input, &decision);
        Ok(decision)
    }
}
