//! Domain layer
//!
//! Pure domain entities for edge provisioning with zero provider
//! dependencies: zones, services, redirects, derived hostnames, and the
//! host-routing table. Everything here is deterministic and testable
//! without a provider in the loop.
//!
//! ## Module Organization
//!
//! - `zone`: DNS zones and record types
//! - `route`: services, redirects, hostname derivation, route composition
//! - `endpoint`: resource spec payloads handed to the infrastructure provider

pub mod endpoint;
pub mod route;
pub mod zone;

pub use endpoint::{
    CertificateMapEntrySpec, CertificateMapSpec, ForwardingRuleSpec, GlobalAddressSpec,
    HttpRedirectUrlMapSpec, HttpsUpgradeAction, LoadBalancingScheme, ManagedCertificateSpec,
    ManagedDomains, TargetProxySpec, UrlHostRule, UrlMapSpec, UrlPathMatcher,
};
pub use route::{
    BackendRef, ComposedRoutes, HostBinding, HostRule, Hostname, PathMatcher, Redirect,
    RedirectAction, RedirectResponseCode, RouteTable, RouteTableBuilder, RouteTarget, Service,
    APEX_MARKER, ROOT_PATH_MATCHER,
};
pub use zone::{DnsRecordType, Zone, ZoneAccount, ZoneRecord};
