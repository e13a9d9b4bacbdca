//! Request-scoped primitives shared by the authorization crates.
//!
//! Everything here is built fresh for each incoming request by upstream
//! stages (authentication, permission resolution) and dropped once the
//! request completes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error raised when parsing one of the closed vocabularies below.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown access mode: {0}")]
    AccessMode(String),
    #[error("unknown credential group: {0}")]
    CredentialGroup(String),
}

/// Absolute URI naming a resource.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ResourceIdentifier {
    pub path: String,
}

impl ResourceIdentifier {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn is_container(&self) -> bool {
        self.path.ends_with('/')
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ResourceIdentifier {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

/// Capability that can be requested on a resource.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum AccessMode {
    Read,
    Append,
    Write,
    Delete,
    Create,
    Control,
}

impl AccessMode {
    pub const ALL: [AccessMode; 6] = [
        AccessMode::Read,
        AccessMode::Append,
        AccessMode::Write,
        AccessMode::Delete,
        AccessMode::Create,
        AccessMode::Control,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Append => "append",
            AccessMode::Write => "write",
            AccessMode::Delete => "delete",
            AccessMode::Create => "create",
            AccessMode::Control => "control",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        AccessMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| ParseError::AccessMode(raw.to_string()))
    }
}

/// Named bucket of identity evidence.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum CredentialGroup {
    Public,
    Agent,
    Client,
}

impl FromStr for CredentialGroup {
    type Err = ParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(CredentialGroup::Public),
            "agent" => Ok(CredentialGroup::Agent),
            "client" => Ok(CredentialGroup::Client),
            _ => Err(ParseError::CredentialGroup(raw.to_string())),
        }
    }
}

/// Identity payload attached to a credential group.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(default))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Credential {
    pub web_id: Option<String>,
    pub client_id: Option<String>,
    pub issuer: Option<String>,
}

impl Credential {
    pub fn web_id(web_id: impl Into<String>) -> Self {
        Self {
            web_id: Some(web_id.into()),
            ..Self::default()
        }
    }
}

/// Credentials extracted for a single request.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Credentials {
    groups: BTreeMap<CredentialGroup, Option<Credential>>,
}

impl Credentials {
    /// Credentials of a requester that presented nothing.
    pub fn anonymous() -> Self {
        let mut groups = BTreeMap::new();
        groups.insert(CredentialGroup::Public, Some(Credential::default()));
        Self { groups }
    }

    /// Credentials of a requester authenticated as `web_id`.
    pub fn agent(web_id: impl Into<String>) -> Self {
        Self::anonymous().with(CredentialGroup::Agent, Some(Credential::web_id(web_id)))
    }

    pub fn with(mut self, group: CredentialGroup, credential: Option<Credential>) -> Self {
        self.groups.insert(group, credential);
        self
    }

    pub fn get(&self, group: CredentialGroup) -> Option<&Credential> {
        self.groups.get(&group).and_then(Option::as_ref)
    }

    /// True iff some group other than `public` carries a payload.
    pub fn is_authenticated(&self) -> bool {
        self.groups
            .iter()
            .any(|(group, credential)| *group != CredentialGroup::Public && credential.is_some())
    }
}

/// Grant state per access mode. Absent entries are not granted.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PermissionSet {
    modes: BTreeMap<AccessMode, bool>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mode: AccessMode, granted: bool) -> Self {
        self.modes.insert(mode, granted);
        self
    }

    pub fn set(&mut self, mode: AccessMode, granted: bool) {
        self.modes.insert(mode, granted);
    }

    pub fn is_granted(&self, mode: AccessMode) -> bool {
        self.modes.get(&mode).copied().unwrap_or(false)
    }

    pub fn get(&self, mode: AccessMode) -> Option<bool> {
        self.modes.get(&mode).copied()
    }
}

/// Every mode requested against every resource an operation touches.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccessMap {
    entries: BTreeMap<ResourceIdentifier, BTreeSet<AccessMode>>,
}

impl AccessMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(
        identifier: ResourceIdentifier,
        modes: impl IntoIterator<Item = AccessMode>,
    ) -> Self {
        let mut map = Self::new();
        map.extend(identifier, modes);
        map
    }

    pub fn add(&mut self, identifier: ResourceIdentifier, mode: AccessMode) {
        self.entries.entry(identifier).or_default().insert(mode);
    }

    pub fn extend(
        &mut self,
        identifier: ResourceIdentifier,
        modes: impl IntoIterator<Item = AccessMode>,
    ) {
        self.entries.entry(identifier).or_default().extend(modes);
    }

    pub fn get(&self, identifier: &ResourceIdentifier) -> Option<&BTreeSet<AccessMode>> {
        self.entries.get(identifier)
    }

    pub fn remove(&mut self, identifier: &ResourceIdentifier) -> Option<BTreeSet<AccessMode>> {
        self.entries.remove(identifier)
    }

    pub fn contains(&self, identifier: &ResourceIdentifier, mode: AccessMode) -> bool {
        self.entries
            .get(identifier)
            .is_some_and(|modes| modes.contains(&mode))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceIdentifier, &BTreeSet<AccessMode>)> {
        self.entries.iter()
    }
}

/// Resolved grant state per resource, as produced by the permission reader.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(transparent))]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MultiPermissionMap {
    entries: BTreeMap<ResourceIdentifier, PermissionSet>,
}

impl MultiPermissionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, identifier: ResourceIdentifier, permissions: PermissionSet) -> Self {
        self.entries.insert(identifier, permissions);
        self
    }

    pub fn insert(&mut self, identifier: ResourceIdentifier, permissions: PermissionSet) {
        self.entries.insert(identifier, permissions);
    }

    pub fn get(&self, identifier: &ResourceIdentifier) -> Option<&PermissionSet> {
        self.entries.get(identifier)
    }

    pub fn get_mut(&mut self, identifier: &ResourceIdentifier) -> Option<&mut PermissionSet> {
        self.entries.get_mut(identifier)
    }

    pub fn contains(&self, identifier: &ResourceIdentifier) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn is_granted(&self, identifier: &ResourceIdentifier, mode: AccessMode) -> bool {
        self.entries
            .get(identifier)
            .is_some_and(|permissions| permissions.is_granted(mode))
    }
}

/// Everything an authorizer needs to reach a verdict for one request.
///
/// `target` is the primary resource of the operation; `requested_modes` may
/// also name related resources (auxiliary documents, parent containers).
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthorizerInput {
    pub target: ResourceIdentifier,
    pub credentials: Credentials,
    pub requested_modes: AccessMap,
    pub available_permissions: MultiPermissionMap,
}

impl AuthorizerInput {
    pub fn new(
        target: ResourceIdentifier,
        credentials: Credentials,
        requested_modes: AccessMap,
        available_permissions: MultiPermissionMap,
    ) -> Self {
        Self {
            target,
            credentials,
            requested_modes,
            available_permissions,
        }
    }

    /// Input for an operation touching a single resource.
    pub fn single(
        target: ResourceIdentifier,
        credentials: Credentials,
        modes: impl IntoIterator<Item = AccessMode>,
        permissions: PermissionSet,
    ) -> Self {
        let requested_modes = AccessMap::single(target.clone(), modes);
        let available_permissions = MultiPermissionMap::new().with(target.clone(), permissions);
        Self::new(target, credentials, requested_modes, available_permissions)
    }
}
