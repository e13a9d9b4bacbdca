use std::sync::Arc;

use crate::strategy::ResourceSet;
use crate::{AccessMap, AccessMode, AuthorizerError, ResourceIdentifier};

/// Derives the modes a request needs on its target from the HTTP method.
pub struct MethodModesExtractor {
    resources: Arc<dyn ResourceSet>,
}

impl MethodModesExtractor {
    pub fn new(resources: Arc<dyn ResourceSet>) -> Self {
        Self { resources }
    }

    pub async fn extract(
        &self,
        method: &str,
        target: &ResourceIdentifier,
    ) -> Result<AccessMap, AuthorizerError> {
        let mut modes = AccessMap::new();
        match method.to_ascii_uppercase().as_str() {
            "GET" | "HEAD" => modes.add(target.clone(), AccessMode::Read),
            "POST" => modes.add(target.clone(), AccessMode::Append),
            "PUT" => {
                modes.add(target.clone(), AccessMode::Write);
                if !self.resources.has_resource(target).await? {
                    modes.add(target.clone(), AccessMode::Create);
                }
            }
            "PATCH" => {
                modes.add(target.clone(), AccessMode::Append);
                if !self.resources.has_resource(target).await? {
                    modes.add(target.clone(), AccessMode::Create);
                }
            }
            "DELETE" => modes.add(target.clone(), AccessMode::Delete),
            other => return Err(AuthorizerError::UnsupportedMethod(other.to_string())),
        }
        Ok(modes)
    }
}
