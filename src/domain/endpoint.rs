//! Resource spec payloads
//!
//! Typed payloads for the declarative objects this crate hands to the
//! infrastructure provider: addresses, certificates, certificate maps, URL
//! maps, proxies, and forwarding rules. Field names serialize in the target
//! API's camelCase wire form.
//!
//! These structs carry data only; identity, dependency edges, and
//! ignore-changes markers travel separately on the
//! [`ResourceDeclaration`](crate::provider::ResourceDeclaration).

use serde::{Deserialize, Serialize};

use crate::domain::route::{RedirectAction, RouteTable, RouteTarget};

/// Scheme used by every forwarding rule this crate declares: the global
/// external managed HTTP(S) load balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoadBalancingScheme {
    ExternalManaged,
}

/// A global static IP address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalAddressSpec {
    pub name: String,
}

/// A named collection of hostname→certificate bindings consumed by an
/// HTTPS proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMapSpec {
    pub name: String,
    pub description: String,
    pub location: String,
    pub certificate_map_id: String,
}

/// The managed-domain list of a certificate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDomains {
    pub domains: Vec<String>,
}

/// A TLS certificate whose issuance and renewal is handled upstream once
/// the domain is declared
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedCertificateSpec {
    pub name: String,
    pub description: String,
    pub location: String,
    pub certificate_id: String,
    pub managed: ManagedDomains,
}

/// One hostname→certificate binding within a certificate map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateMapEntrySpec {
    pub name: String,
    pub description: String,
    pub location: String,
    pub certificate_map_entry_id: String,
    pub certificate_map_id: String,
    pub certificates: Vec<String>,
    /// The original dotted hostname this entry serves
    pub hostname: String,
}

/// Host rule in URL-map wire form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlHostRule {
    pub hosts: Vec<String>,
    pub path_matcher: String,
}

/// Path matcher in URL-map wire form: either a default service or a
/// default redirect, never both
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlPathMatcher {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_url_redirect: Option<RedirectAction>,
}

/// The HTTPS-side URL map carrying the routing table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlMapSpec {
    pub name: String,
    pub description: String,
    pub default_url_redirect: RedirectAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_rules: Option<Vec<UrlHostRule>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_matchers: Option<Vec<UrlPathMatcher>>,
}

impl UrlMapSpec {
    /// Render a composed route table into wire form. Unconfigured
    /// collections stay absent rather than serializing as `[]`.
    pub fn from_route_table(
        name: impl Into<String>,
        description: impl Into<String>,
        table: &RouteTable,
    ) -> Self {
        let host_rules = table.host_rules.as_ref().map(|rules| {
            rules
                .iter()
                .map(|rule| UrlHostRule {
                    hosts: rule.hosts.iter().map(|h| h.as_str().to_string()).collect(),
                    path_matcher: rule.path_matcher.clone(),
                })
                .collect()
        });
        let path_matchers = table.path_matchers.as_ref().map(|matchers| {
            matchers
                .iter()
                .map(|matcher| match &matcher.target {
                    RouteTarget::Backend(backend) => UrlPathMatcher {
                        name: matcher.name.clone(),
                        default_service: Some(backend.as_str().to_string()),
                        default_url_redirect: None,
                    },
                    RouteTarget::Redirect(action) => UrlPathMatcher {
                        name: matcher.name.clone(),
                        default_service: None,
                        default_url_redirect: Some(action.clone()),
                    },
                })
                .collect()
        });

        Self {
            name: name.into(),
            description: description.into(),
            default_url_redirect: table.default_redirect.clone(),
            host_rules,
            path_matchers,
        }
    }
}

/// The action carried by the HTTP-side URL map: unconditionally upgrade
/// to HTTPS
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpsUpgradeAction {
    pub https_redirect: bool,
    pub strip_query: bool,
}

impl Default for HttpsUpgradeAction {
    fn default() -> Self {
        Self { https_redirect: true, strip_query: false }
    }
}

/// The HTTP-side URL map whose sole rule is the HTTPS upgrade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRedirectUrlMapSpec {
    pub name: String,
    pub description: String,
    pub default_url_redirect: HttpsUpgradeAction,
}

/// A target proxy binding a URL map (and, for HTTPS, a certificate map)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetProxySpec {
    pub name: String,
    pub description: String,
    pub url_map: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_map: Option<String>,
}

/// A listener binding a public IP and port to a proxy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardingRuleSpec {
    pub name: String,
    pub description: String,
    pub load_balancing_scheme: LoadBalancingScheme,
    pub target: String,
    pub ip_address: String,
    pub port_range: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::domain::route::{BackendRef, HostRule, Hostname, PathMatcher};

    fn configured_table() -> RouteTable {
        let hostname = Hostname::derive("api", "example.com", Environment::Prod);
        RouteTable {
            default_redirect: RedirectAction::see_other("example.com"),
            host_rules: Some(vec![HostRule {
                hosts: vec![hostname],
                path_matcher: "api".into(),
            }]),
            path_matchers: Some(vec![PathMatcher {
                name: "api".into(),
                target: RouteTarget::Backend(BackendRef::new("backends/api")),
            }]),
        }
    }

    #[test]
    fn url_map_spec_serializes_camel_case() {
        let spec =
            UrlMapSpec::from_route_table("urlmap-primary", "managed", &configured_table());
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["hostRules"][0]["hosts"][0], "api.example.com");
        assert_eq!(value["hostRules"][0]["pathMatcher"], "api");
        assert_eq!(value["pathMatchers"][0]["defaultService"], "backends/api");
        assert_eq!(value["defaultUrlRedirect"]["hostRedirect"], "example.com");
        assert_eq!(value["defaultUrlRedirect"]["stripQuery"], false);
        assert_eq!(value["defaultUrlRedirect"]["redirectResponseCode"], "SEE_OTHER");
    }

    #[test]
    fn unconfigured_collections_are_omitted_from_wire_form() {
        let table = RouteTable {
            default_redirect: RedirectAction::see_other("example.com"),
            host_rules: None,
            path_matchers: None,
        };
        let spec = UrlMapSpec::from_route_table("urlmap-primary", "managed", &table);
        let value = serde_json::to_value(&spec).unwrap();

        assert!(value.get("hostRules").is_none());
        assert!(value.get("pathMatchers").is_none());
    }

    #[test]
    fn redirect_matcher_carries_redirect_not_service() {
        let hostname = Hostname::derive("www", "example.com", Environment::Prod);
        let table = RouteTable {
            default_redirect: RedirectAction::see_other("example.com"),
            host_rules: Some(vec![HostRule {
                hosts: vec![hostname],
                path_matcher: "www".into(),
            }]),
            path_matchers: Some(vec![PathMatcher {
                name: "www".into(),
                target: RouteTarget::Redirect(RedirectAction::see_other("https://example.com")),
            }]),
        };
        let spec = UrlMapSpec::from_route_table("urlmap-primary", "managed", &table);
        let value = serde_json::to_value(&spec).unwrap();

        assert!(value["pathMatchers"][0].get("defaultService").is_none());
        assert_eq!(
            value["pathMatchers"][0]["defaultUrlRedirect"]["hostRedirect"],
            "https://example.com"
        );
    }

    #[test]
    fn https_upgrade_action_defaults() {
        let value = serde_json::to_value(HttpsUpgradeAction::default()).unwrap();
        assert_eq!(value["httpsRedirect"], true);
        assert_eq!(value["stripQuery"], false);
    }

    #[test]
    fn load_balancing_scheme_wire_name() {
        let value = serde_json::to_value(LoadBalancingScheme::ExternalManaged).unwrap();
        assert_eq!(value, "EXTERNAL_MANAGED");
    }
}
