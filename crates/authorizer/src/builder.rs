//! Assembles the authorizer chains described by an [`AuthorizerConfig`].

use std::sync::Arc;

use crate::config::{AuthorizerConfig, ChainKind, ConfigError};
use crate::strategy::{ResourceSet, SingleRootIdentifierStrategy, SuffixAuxiliaryStrategy};
use crate::{
    AllowAllAuthorizer, AuditedAuthorizer, Authorizer, AuxiliaryAuthorizer, DenyAllAuthorizer,
    PathBasedAuthorizer, PermissionBasedAuthorizer, ReadDeleteAuthorizer, WaterfallAuthorizer,
};

/// Chain for WAC-protected space: auxiliary resources are checked through
/// their subject, everything else directly, both behind delete masking.
pub fn web_acl_chain(
    resources: Arc<dyn ResourceSet>,
    identifiers: Arc<SingleRootIdentifierStrategy>,
    auxiliary: Arc<SuffixAuxiliaryStrategy>,
) -> Arc<dyn Authorizer> {
    let masked: Arc<dyn Authorizer> = Arc::new(ReadDeleteAuthorizer::new(
        Arc::new(PermissionBasedAuthorizer::new()),
        resources,
        identifiers,
    ));
    let auxiliary: Arc<dyn Authorizer> =
        Arc::new(AuxiliaryAuthorizer::new(Arc::clone(&masked), auxiliary));
    Arc::new(WaterfallAuthorizer::new(vec![auxiliary, masked]))
}

/// Path router for the configured routes, without the audit wrapper.
pub fn build_router(
    config: &AuthorizerConfig,
    resources: Arc<dyn ResourceSet>,
) -> Result<PathBasedAuthorizer, ConfigError> {
    if url::Url::parse(&config.base_url).is_err() {
        return Err(ConfigError::InvalidBaseUrl(config.base_url.clone()));
    }
    let identifiers = Arc::new(SingleRootIdentifierStrategy::new(&config.base_url));
    let auxiliary = Arc::new(SuffixAuxiliaryStrategy::new(
        config.auxiliary_suffixes.iter().cloned(),
    ));
    let web_acl = web_acl_chain(resources, identifiers, auxiliary);

    let routes = config.routes.iter().map(|route| {
        let chain: Arc<dyn Authorizer> = match route.chain {
            ChainKind::WebAcl => Arc::clone(&web_acl),
            ChainKind::AllowAll => Arc::new(AllowAllAuthorizer),
            ChainKind::DenyAll => Arc::new(DenyAllAuthorizer),
        };
        (route.pattern.as_str(), chain)
    });
    PathBasedAuthorizer::new(&config.base_url, routes)
}

/// Router built from the configuration. The second value is the audited
/// wrapper, present when auditing is enabled, so callers can subscribe.
pub fn build_authorizer(
    config: &AuthorizerConfig,
    resources: Arc<dyn ResourceSet>,
) -> Result<(Arc<dyn Authorizer>, Option<Arc<AuditedAuthorizer>>), ConfigError> {
    let router: Arc<dyn Authorizer> = Arc::new(build_router(config, resources)?);

    if config.audit {
        let audited = Arc::new(AuditedAuthorizer::new(router));
        let handle: Arc<dyn Authorizer> = audited.clone();
        Ok((handle, Some(audited)))
    } else {
        Ok((router, None))
    }
}
