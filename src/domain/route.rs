//! Route composition
//!
//! Builds the host-routing table (host rules → path matchers → backend or
//! redirect) from the caller's ordered service and redirect lists, deriving
//! one environment-scoped hostname per entry along the way.
//!
//! Hostname grammar: the apex marker `"@"` (or an empty subdomain — both
//! spellings are accepted, for services and redirects alike) collapses to
//! the environment label alone, so the apex of `example.com` is
//! `example.com` in production and `stage.example.com` in stage. A non-apex
//! subdomain is suffixed with a dot-prefixed environment label:
//! `api` → `api.stage.example.com` in stage, `api.example.com` in production.
//!
//! Path-matcher names deliberately use the *raw* subdomain (or the reserved
//! literal `root` for the apex) rather than the environment-scoped label, so
//! matcher identity stays stable across environments while hostnames vary.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use url::Url;

use crate::config::Environment;
use crate::domain::zone::Zone;
use crate::errors::{Error, Result};
use crate::naming::sanitize_hostname;

/// Subdomain spelling that denotes the zone apex
pub const APEX_MARKER: &str = "@";

/// Reserved path-matcher name for the zone apex
pub const ROOT_PATH_MATCHER: &str = "root";

static SUBDOMAIN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?(\.[a-z0-9]([a-z0-9-]*[a-z0-9])?)*$")
        .expect("valid regex")
});

/// Stable reference to a compute backend, as returned by the
/// infrastructure provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendRef(String);

impl BackendRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackendRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A hostname routed to a compute backend
#[derive(Debug, Clone)]
pub struct Service {
    /// Subdomain within the zone; `"@"` or empty denotes the apex. May be
    /// dot-separated (`api.v2`); the environment label is appended after
    /// the whole subdomain.
    pub subdomain: String,
    pub zone: Zone,
    pub backend: BackendRef,
}

/// A hostname routed to a redirect action instead of a backend
#[derive(Debug, Clone)]
pub struct Redirect {
    /// Subdomain within the zone; `"@"` or empty denotes the apex. May be
    /// dot-separated (`api.v2`), as for [`Service`]
    pub subdomain: String,
    pub zone: Zone,
    /// Absolute target URL of the redirect
    pub target: String,
}

/// A fully qualified, environment-scoped hostname
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hostname(String);

impl Hostname {
    /// Derive the hostname for a subdomain within a zone.
    ///
    /// ```
    /// use edgekit::config::Environment;
    /// use edgekit::domain::Hostname;
    ///
    /// assert_eq!(Hostname::derive("@", "example.com", Environment::Prod).as_str(), "example.com");
    /// assert_eq!(
    ///     Hostname::derive("api", "example.com", Environment::Stage).as_str(),
    ///     "api.stage.example.com"
    /// );
    /// ```
    pub fn derive(subdomain: &str, zone_name: &str, environment: Environment) -> Self {
        let label = scoped_label(subdomain, environment);
        if label.is_empty() {
            Self(zone_name.to_string())
        } else {
            Self(format!("{}.{}", label, zone_name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The dots-to-dashes form used where naming rules forbid dots
    pub fn sanitized(&self) -> String {
        sanitize_hostname(&self.0)
    }
}

impl fmt::Display for Hostname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// HTTP response code issued by a redirect action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectResponseCode {
    SeeOther,
}

/// A host-redirect action carried by a path matcher or as the table default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectAction {
    pub host_redirect: String,
    pub strip_query: bool,
    pub redirect_response_code: RedirectResponseCode,
}

impl RedirectAction {
    /// The redirect shape used everywhere in this crate: HTTP 303 See
    /// Other, query string preserved.
    pub fn see_other(host: impl Into<String>) -> Self {
        Self {
            host_redirect: host.into(),
            strip_query: false,
            redirect_response_code: RedirectResponseCode::SeeOther,
        }
    }
}

/// What a path matcher resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    Backend(BackendRef),
    Redirect(RedirectAction),
}

/// Maps a set of hosts onto exactly one named path matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRule {
    pub hosts: Vec<Hostname>,
    pub path_matcher: String,
}

/// A named rule resolving a hostname to a backend or a redirect action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatcher {
    pub name: String,
    pub target: RouteTarget,
}

/// The composed host-routing table.
///
/// `host_rules`/`path_matchers` are `None` when no services or redirects
/// were supplied: the collections are then "not configured" rather than
/// "configured empty", so a provider-level idempotency check does not see a
/// spurious diff against an object that omits the fields entirely.
#[derive(Debug, Clone)]
pub struct RouteTable {
    /// Catch-all for unmatched hosts: HTTP 303 to the default domain
    pub default_redirect: RedirectAction,
    pub host_rules: Option<Vec<HostRule>>,
    pub path_matchers: Option<Vec<PathMatcher>>,
}

impl RouteTable {
    /// Whether any host rules were configured at all
    pub fn is_configured(&self) -> bool {
        self.host_rules.is_some()
    }
}

/// The per-hostname work item consumed by DNS and certificate provisioning
#[derive(Debug, Clone)]
pub struct HostBinding {
    pub hostname: Hostname,
    pub zone: Zone,
    /// Record name relative to the zone; `"@"` for the apex
    pub dns_label: String,
}

/// Output of route composition
#[derive(Debug, Clone)]
pub struct ComposedRoutes {
    pub table: RouteTable,
    pub bindings: Vec<HostBinding>,
}

/// Builds a [`RouteTable`] from ordered services and redirects.
#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
    environment: Environment,
    default_domain: String,
    services: Vec<Service>,
    redirects: Vec<Redirect>,
}

impl RouteTableBuilder {
    pub fn new(environment: Environment, default_domain: impl Into<String>) -> Self {
        Self {
            environment,
            default_domain: default_domain.into(),
            services: Vec::new(),
            redirects: Vec::new(),
        }
    }

    pub fn service(mut self, service: Service) -> Self {
        self.services.push(service);
        self
    }

    pub fn services(mut self, services: impl IntoIterator<Item = Service>) -> Self {
        self.services.extend(services);
        self
    }

    pub fn redirect(mut self, redirect: Redirect) -> Self {
        self.redirects.push(redirect);
        self
    }

    pub fn redirects(mut self, redirects: impl IntoIterator<Item = Redirect>) -> Self {
        self.redirects.extend(redirects);
        self
    }

    /// Compose the routing table and the per-hostname work list.
    ///
    /// Entries keep their input order. Fails with a `Config` error on
    /// malformed subdomains, unparseable redirect targets, or unresolvable
    /// path-matcher name collisions, and with a `ReferentialIntegrity`
    /// error when a service carries an empty backend reference.
    pub fn build(self) -> Result<ComposedRoutes> {
        if self.default_domain.is_empty() {
            return Err(Error::config("Route table requires a non-empty default domain"));
        }

        let mut host_rules = Vec::new();
        let mut path_matchers = Vec::new();
        let mut bindings = Vec::new();
        let mut used_names = HashSet::new();

        for service in &self.services {
            validate_subdomain(&service.subdomain)?;
            if service.backend.as_str().is_empty() {
                return Err(Error::referential(
                    format!("service '{}' in zone '{}'", service.subdomain, service.zone.name),
                    "backend",
                ));
            }

            let name = claim_matcher_name(&service.subdomain, &service.zone, &mut used_names)?;
            let hostname =
                Hostname::derive(&service.subdomain, &service.zone.name, self.environment);
            host_rules
                .push(HostRule { hosts: vec![hostname.clone()], path_matcher: name.clone() });
            path_matchers
                .push(PathMatcher { name, target: RouteTarget::Backend(service.backend.clone()) });
            bindings.push(HostBinding {
                dns_label: dns_label(&service.subdomain, self.environment),
                hostname,
                zone: service.zone.clone(),
            });
        }

        for redirect in &self.redirects {
            validate_subdomain(&redirect.subdomain)?;
            Url::parse(&redirect.target).map_err(|e| {
                Error::config(format!(
                    "Redirect target '{}' is not a valid URL: {}",
                    redirect.target, e
                ))
            })?;

            let name = claim_matcher_name(&redirect.subdomain, &redirect.zone, &mut used_names)?;
            let hostname =
                Hostname::derive(&redirect.subdomain, &redirect.zone.name, self.environment);
            host_rules
                .push(HostRule { hosts: vec![hostname.clone()], path_matcher: name.clone() });
            path_matchers.push(PathMatcher {
                name,
                target: RouteTarget::Redirect(RedirectAction::see_other(redirect.target.clone())),
            });
            bindings.push(HostBinding {
                dns_label: dns_label(&redirect.subdomain, self.environment),
                hostname,
                zone: redirect.zone.clone(),
            });
        }

        let configured = !bindings.is_empty();
        let table = RouteTable {
            default_redirect: RedirectAction::see_other(self.default_domain),
            host_rules: configured.then_some(host_rules),
            path_matchers: configured.then_some(path_matchers),
        };

        Ok(ComposedRoutes { table, bindings })
    }
}

fn is_apex(subdomain: &str) -> bool {
    subdomain == APEX_MARKER || subdomain.is_empty()
}

/// The environment-scoped label preceding the zone name. Empty for the
/// production apex.
fn scoped_label(subdomain: &str, environment: Environment) -> String {
    if is_apex(subdomain) {
        environment.suffix("")
    } else {
        format!("{}{}", subdomain, environment.suffix("."))
    }
}

/// DNS record name for a subdomain; the zone apex is spelled `"@"`
fn dns_label(subdomain: &str, environment: Environment) -> String {
    let label = scoped_label(subdomain, environment);
    if label.is_empty() {
        APEX_MARKER.to_string()
    } else {
        label
    }
}

fn validate_subdomain(subdomain: &str) -> Result<()> {
    if is_apex(subdomain) || SUBDOMAIN_PATTERN.is_match(subdomain) {
        Ok(())
    } else {
        Err(Error::config(format!("Invalid subdomain label '{}'", subdomain)))
    }
}

/// Claim a unique path-matcher name. The apex uses the reserved `root`
/// literal, everything else the raw subdomain; when the same subdomain
/// appears in a second zone, that entry is disambiguated with the sanitized
/// zone name. A remaining collision means the caller declared the same
/// subdomain twice within one zone.
fn claim_matcher_name(subdomain: &str, zone: &Zone, used: &mut HashSet<String>) -> Result<String> {
    let base = if is_apex(subdomain) {
        ROOT_PATH_MATCHER.to_string()
    } else {
        subdomain.to_string()
    };
    if used.insert(base.clone()) {
        return Ok(base);
    }

    let qualified = format!("{}-{}", base, sanitize_hostname(&zone.name));
    if used.insert(qualified.clone()) {
        return Ok(qualified);
    }

    Err(Error::config(format!(
        "Duplicate path matcher '{}': subdomain '{}' declared twice in zone '{}'",
        qualified, subdomain, zone.name
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::zone::ZoneAccount;
    use proptest::prelude::*;

    fn zone(name: &str) -> Zone {
        Zone::new(
            name,
            ZoneAccount { zone_id: format!("{}-zone", name), account_id: "acct-1".into() },
        )
    }

    fn service(subdomain: &str, zone_name: &str) -> Service {
        Service {
            subdomain: subdomain.into(),
            zone: zone(zone_name),
            backend: BackendRef::new(format!("backends/{}", zone_name)),
        }
    }

    #[test]
    fn apex_hostname_in_production_is_zone_name() {
        let hostname = Hostname::derive("@", "example.com", Environment::Prod);
        assert_eq!(hostname.as_str(), "example.com");
    }

    #[test]
    fn apex_hostname_in_stage_gets_env_label() {
        let hostname = Hostname::derive("@", "example.com", Environment::Stage);
        assert_eq!(hostname.as_str(), "stage.example.com");
    }

    #[test]
    fn non_apex_hostname_in_stage() {
        let hostname = Hostname::derive("api", "example.com", Environment::Stage);
        assert_eq!(hostname.as_str(), "api.stage.example.com");
    }

    #[test]
    fn empty_subdomain_is_treated_as_apex() {
        let with_marker = Hostname::derive("@", "example.com", Environment::Dev);
        let with_empty = Hostname::derive("", "example.com", Environment::Dev);
        assert_eq!(with_marker, with_empty);
    }

    #[test]
    fn sanitized_hostname_has_no_dots() {
        let hostname = Hostname::derive("api", "example.com", Environment::Stage);
        assert_eq!(hostname.sanitized(), "api-stage-example-com");
    }

    #[test]
    fn apex_service_uses_root_path_matcher() {
        let composed = RouteTableBuilder::new(Environment::Prod, "example.com")
            .service(service("@", "example.com"))
            .build()
            .unwrap();

        let matchers = composed.table.path_matchers.unwrap();
        assert_eq!(matchers[0].name, ROOT_PATH_MATCHER);
        let rules = composed.table.host_rules.unwrap();
        assert_eq!(rules[0].hosts[0].as_str(), "example.com");
        assert_eq!(rules[0].path_matcher, ROOT_PATH_MATCHER);
        assert_eq!(composed.bindings[0].dns_label, "@");
    }

    #[test]
    fn stage_service_keeps_raw_subdomain_as_matcher_name() {
        let composed = RouteTableBuilder::new(Environment::Stage, "example.com")
            .service(service("api", "example.com"))
            .build()
            .unwrap();

        let rules = composed.table.host_rules.unwrap();
        assert_eq!(rules[0].hosts[0].as_str(), "api.stage.example.com");
        // Matcher identity is stable across environments.
        assert_eq!(rules[0].path_matcher, "api");
        assert_eq!(composed.bindings[0].dns_label, "api.stage");
    }

    #[test]
    fn redirect_issues_see_other_without_query_stripping() {
        let composed = RouteTableBuilder::new(Environment::Prod, "example.com")
            .redirect(Redirect {
                subdomain: "www".into(),
                zone: zone("example.com"),
                target: "https://example.com".into(),
            })
            .build()
            .unwrap();

        let rules = composed.table.host_rules.unwrap();
        assert_eq!(rules[0].hosts[0].as_str(), "www.example.com");

        let matchers = composed.table.path_matchers.unwrap();
        match &matchers[0].target {
            RouteTarget::Redirect(action) => {
                assert_eq!(action.host_redirect, "https://example.com");
                assert!(!action.strip_query);
                assert_eq!(action.redirect_response_code, RedirectResponseCode::SeeOther);
            }
            other => panic!("expected redirect target, got {:?}", other),
        }
    }

    #[test]
    fn apex_redirect_follows_the_service_convention() {
        let composed = RouteTableBuilder::new(Environment::Prod, "example.com")
            .redirect(Redirect {
                subdomain: "@".into(),
                zone: zone("example.org"),
                target: "https://example.com".into(),
            })
            .build()
            .unwrap();

        let rules = composed.table.host_rules.unwrap();
        assert_eq!(rules[0].hosts[0].as_str(), "example.org");
        assert_eq!(rules[0].path_matcher, ROOT_PATH_MATCHER);
        assert_eq!(composed.bindings[0].dns_label, "@");
    }

    #[test]
    fn empty_inputs_leave_collections_unconfigured() {
        let composed =
            RouteTableBuilder::new(Environment::Prod, "example.com").build().unwrap();
        assert!(!composed.table.is_configured());
        assert!(composed.table.host_rules.is_none());
        assert!(composed.table.path_matchers.is_none());
        assert!(composed.bindings.is_empty());
        assert_eq!(composed.table.default_redirect.host_redirect, "example.com");
    }

    #[test]
    fn same_subdomain_in_two_zones_yields_distinct_hostnames_and_matchers() {
        let composed = RouteTableBuilder::new(Environment::Prod, "example.com")
            .service(service("api", "example.com"))
            .service(service("api", "example.org"))
            .build()
            .unwrap();

        let rules = composed.table.host_rules.unwrap();
        assert_eq!(rules[0].hosts[0].as_str(), "api.example.com");
        assert_eq!(rules[1].hosts[0].as_str(), "api.example.org");

        let matchers = composed.table.path_matchers.unwrap();
        assert_eq!(matchers[0].name, "api");
        assert_eq!(matchers[1].name, "api-example-org");
    }

    #[test]
    fn duplicate_subdomain_within_one_zone_is_rejected() {
        let result = RouteTableBuilder::new(Environment::Prod, "example.com")
            .service(service("api", "example.com"))
            .service(service("api", "example.com"))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn empty_backend_reference_is_a_referential_error() {
        let result = RouteTableBuilder::new(Environment::Prod, "example.com")
            .service(Service {
                subdomain: "api".into(),
                zone: zone("example.com"),
                backend: BackendRef::new(""),
            })
            .build();
        assert!(matches!(result, Err(Error::ReferentialIntegrity { .. })));
    }

    #[test]
    fn invalid_redirect_target_is_a_config_error() {
        let result = RouteTableBuilder::new(Environment::Prod, "example.com")
            .redirect(Redirect {
                subdomain: "www".into(),
                zone: zone("example.com"),
                target: "not a url".into(),
            })
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn dotted_subdomain_labels_are_accepted() {
        let composed = RouteTableBuilder::new(Environment::Stage, "example.com")
            .service(service("api.v2", "example.com"))
            .build()
            .unwrap();

        let rules = composed.table.host_rules.unwrap();
        assert_eq!(rules[0].hosts[0].as_str(), "api.v2.stage.example.com");
        assert_eq!(rules[0].path_matcher, "api.v2");
        assert_eq!(composed.bindings[0].dns_label, "api.v2.stage");
    }

    #[test]
    fn invalid_subdomain_is_rejected() {
        let result = RouteTableBuilder::new(Environment::Prod, "example.com")
            .service(service("Bad_Label", "example.com"))
            .build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_default_domain_is_rejected() {
        let result = RouteTableBuilder::new(Environment::Prod, "").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    proptest! {
        #[test]
        fn non_apex_stage_hostnames_follow_the_grammar(
            subdomain in "[a-z][a-z0-9]{0,10}",
            zone_name in "[a-z][a-z0-9]{0,10}\\.(com|org|net)"
        ) {
            let hostname = Hostname::derive(&subdomain, &zone_name, Environment::Stage);
            prop_assert_eq!(hostname.as_str(), format!("{}.stage.{}", subdomain, zone_name));
        }

        #[test]
        fn production_hostnames_never_carry_an_env_label(
            subdomain in "[a-z][a-z0-9]{0,10}",
            zone_name in "[a-z][a-z0-9]{0,10}\\.com"
        ) {
            let hostname = Hostname::derive(&subdomain, &zone_name, Environment::Prod);
            prop_assert_eq!(hostname.as_str(), format!("{}.{}", subdomain, zone_name));
            let apex = Hostname::derive("@", &zone_name, Environment::Prod);
            prop_assert_eq!(apex.as_str(), zone_name.as_str());
            prop_assert!(!apex.as_str().starts_with('.'));
        }

        #[test]
        fn derivation_is_pure(
            subdomain in "[a-z][a-z0-9]{0,10}",
            zone_name in "[a-z][a-z0-9]{0,10}\\.com"
        ) {
            for env in [Environment::Dev, Environment::Stage, Environment::Prod] {
                prop_assert_eq!(
                    Hostname::derive(&subdomain, &zone_name, env),
                    Hostname::derive(&subdomain, &zone_name, env)
                );
            }
        }
    }
}
