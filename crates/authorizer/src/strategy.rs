//! Collaborators consulted by the authorizers: resource existence,
//! container navigation and auxiliary resource mapping.

use async_trait::async_trait;
use dashmap::DashSet;
use url::Url;

use crate::{AuthorizerError, ResourceIdentifier};

/// Existence checks against the resource store.
#[async_trait]
pub trait ResourceSet: Send + Sync {
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> Result<bool, AuthorizerError>;
}

/// Container hierarchy navigation.
pub trait IdentifierStrategy: Send + Sync {
    fn is_root_container(&self, identifier: &ResourceIdentifier) -> bool;

    fn parent_container(
        &self,
        identifier: &ResourceIdentifier,
    ) -> Result<ResourceIdentifier, AuthorizerError>;
}

/// Maps auxiliary resources (ACL documents, descriptions) to the resource they augment.
pub trait AuxiliaryIdentifierStrategy: Send + Sync {
    fn is_auxiliary_identifier(&self, identifier: &ResourceIdentifier) -> bool;

    fn associated_identifier(
        &self,
        identifier: &ResourceIdentifier,
    ) -> Result<ResourceIdentifier, AuthorizerError>;
}

fn ensure_trailing_slash(raw: &str) -> String {
    if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    }
}

/// A deployment with a single root container at the base URL.
#[derive(Clone, Debug)]
pub struct SingleRootIdentifierStrategy {
    base_url: String,
}

impl SingleRootIdentifierStrategy {
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: ensure_trailing_slash(base_url.as_ref()),
        }
    }

    fn supports_identifier(&self, identifier: &ResourceIdentifier) -> bool {
        identifier.as_str().starts_with(&self.base_url)
    }
}

impl IdentifierStrategy for SingleRootIdentifierStrategy {
    fn is_root_container(&self, identifier: &ResourceIdentifier) -> bool {
        identifier.as_str() == self.base_url
    }

    fn parent_container(
        &self,
        identifier: &ResourceIdentifier,
    ) -> Result<ResourceIdentifier, AuthorizerError> {
        let invalid = |reason: &str| AuthorizerError::InvalidIdentifier {
            identifier: identifier.clone(),
            reason: reason.to_string(),
        };
        if !self.supports_identifier(identifier) {
            return Err(invalid("outside of the configured base URL"));
        }
        if self.is_root_container(identifier) {
            return Err(invalid("the root container has no parent"));
        }

        let url = Url::parse(identifier.as_str()).map_err(|err| invalid(&err.to_string()))?;
        let relative = if identifier.is_container() { ".." } else { "." };
        let parent = url.join(relative).map_err(|err| invalid(&err.to_string()))?;
        Ok(ResourceIdentifier::new(parent.as_str()))
    }
}

/// Auxiliary resources identified by a suffix appended to their subject,
/// e.g. `http://x/foo.acl` for `http://x/foo`.
#[derive(Clone, Debug)]
pub struct SuffixAuxiliaryStrategy {
    suffixes: Vec<String>,
}

impl SuffixAuxiliaryStrategy {
    pub fn new<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(Into::into)
                .filter(|suffix: &String| !suffix.is_empty())
                .collect(),
        }
    }

    fn matching_suffix(&self, identifier: &ResourceIdentifier) -> Option<&str> {
        self.suffixes
            .iter()
            .map(String::as_str)
            .filter(|suffix| identifier.as_str().ends_with(suffix))
            .max_by_key(|suffix| suffix.len())
    }
}

impl AuxiliaryIdentifierStrategy for SuffixAuxiliaryStrategy {
    fn is_auxiliary_identifier(&self, identifier: &ResourceIdentifier) -> bool {
        self.matching_suffix(identifier).is_some()
    }

    fn associated_identifier(
        &self,
        identifier: &ResourceIdentifier,
    ) -> Result<ResourceIdentifier, AuthorizerError> {
        let suffix = self
            .matching_suffix(identifier)
            .ok_or_else(|| AuthorizerError::NotAuxiliary(identifier.clone()))?;
        let path = identifier.as_str();
        Ok(ResourceIdentifier::new(&path[..path.len() - suffix.len()]))
    }
}

/// Resource set held in memory, safe to share across requests.
#[derive(Debug, Default)]
pub struct InMemoryResourceSet {
    resources: DashSet<ResourceIdentifier>,
}

impl InMemoryResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, identifier: ResourceIdentifier) {
        self.resources.insert(identifier);
    }
}

impl<I: Into<ResourceIdentifier>> FromIterator<I> for InMemoryResourceSet {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let set = Self::new();
        for identifier in iter {
            set.insert(identifier.into());
        }
        set
    }
}

#[async_trait]
impl ResourceSet for InMemoryResourceSet {
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> Result<bool, AuthorizerError> {
        Ok(self.resources.contains(identifier))
    }
}
