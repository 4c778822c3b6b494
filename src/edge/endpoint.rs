//! Edge endpoint assembly
//!
//! Wires a composed route table and certificate map into the public
//! listener pair: HTTPS URL map → target proxy → forwarding rule on port
//! 443, plus an HTTP sibling on port 80 whose URL map unconditionally
//! upgrades to HTTPS. Both forwarding rules share the supplied static IP.
//!
//! Multiple independent endpoints may coexist; a non-default `id` is folded
//! into every generated identity so IPs, proxies, and forwarding rules
//! never collide.

use validator::Validate;

use crate::context::ProvisioningContext;
use crate::domain::endpoint::{
    CertificateMapSpec, ForwardingRuleSpec, HttpRedirectUrlMapSpec, HttpsUpgradeAction,
    LoadBalancingScheme, TargetProxySpec, UrlMapSpec,
};
use crate::domain::route::{Redirect, RouteTableBuilder, Service};
use crate::domain::zone::DnsRecordType;
use crate::errors::Result;
use crate::provider::{DnsRecordRequest, ResourceDeclaration, ResourceKind, ResourceRef};

use super::certificates::{ensure_certificate, CertificateBinding, CertificateMapHandle};
use super::{DEFAULT_ENDPOINT_ID, GLOBAL_LOCATION};

/// Scheme prefix the HTTPS proxy uses to attach the certificate map
const CERTIFICATE_MANAGER_PREFIX: &str = "//certificatemanager.googleapis.com/";

/// Inputs of one edge endpoint
#[derive(Debug, Clone, Validate)]
pub struct EdgeEndpointArgs {
    pub services: Vec<Service>,
    pub redirects: Vec<Redirect>,

    /// Catch-all redirect target for unmatched hosts
    #[validate(length(min = 1, message = "Default domain cannot be empty"))]
    pub default_domain: String,

    /// Hostname the per-service CNAME records point at
    #[validate(length(min = 1, message = "IP alias cannot be empty"))]
    pub ip_alias: String,

    /// The static IP both forwarding rules bind to
    pub ip: ResourceRef,

    /// Endpoint id; `"primary"` unless several endpoints coexist
    #[validate(length(min = 1, message = "Endpoint id cannot be empty"))]
    pub id: String,
}

impl EdgeEndpointArgs {
    pub fn new(
        default_domain: impl Into<String>,
        ip_alias: impl Into<String>,
        ip: ResourceRef,
    ) -> Self {
        Self {
            services: Vec::new(),
            redirects: Vec::new(),
            default_domain: default_domain.into(),
            ip_alias: ip_alias.into(),
            ip,
            id: DEFAULT_ENDPOINT_ID.to_string(),
        }
    }

    pub fn with_services(mut self, services: impl IntoIterator<Item = Service>) -> Self {
        self.services.extend(services);
        self
    }

    pub fn with_redirects(mut self, redirects: impl IntoIterator<Item = Redirect>) -> Self {
        self.redirects.extend(redirects);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// References to everything one assembled endpoint declared
#[derive(Debug, Clone)]
pub struct EdgeEndpoint {
    pub certificate_map: ResourceRef,
    pub certificates: Vec<CertificateBinding>,
    pub url_map: ResourceRef,
    pub https_proxy: ResourceRef,
    pub https_forwarding_rule: ResourceRef,
    pub http_redirect_url_map: ResourceRef,
    pub http_proxy: ResourceRef,
    pub http_forwarding_rule: ResourceRef,
    pub ip: ResourceRef,
}

/// Provision one complete edge endpoint.
///
/// Order is strict: certificate map first, then per-hostname DNS records
/// and certificates (sequentially, in input order), then the HTTPS chain,
/// then the HTTP redirect chain. A failure on any hostname fails the whole
/// assembly — there is no serve-without-cert fallback; re-running is the
/// retry path.
pub async fn provision_edge_endpoint(
    args: EdgeEndpointArgs,
    ctx: &ProvisioningContext,
) -> Result<EdgeEndpoint> {
    args.validate()?;

    let id = args.id.clone();
    tracing::info!(
        endpoint_id = %id,
        services = args.services.len(),
        redirects = args.redirects.len(),
        "Assembling edge endpoint"
    );

    let map = declare_certificate_map(&id, ctx).await?;

    let composed = RouteTableBuilder::new(ctx.environment(), args.default_domain.clone())
        .services(args.services)
        .redirects(args.redirects)
        .build()?;

    let mut certificates = Vec::with_capacity(composed.bindings.len());
    for binding in &composed.bindings {
        ctx.upsert_dns_record(
            &binding.zone,
            DnsRecordRequest {
                name: binding.dns_label.clone(),
                record_type: DnsRecordType::Cname,
                value: args.ip_alias.clone(),
                proxied: false,
            },
        )
        .await?;
        certificates.push(ensure_certificate(&binding.hostname, &map, ctx).await?);
    }

    // HTTPS chain: URL map -> proxy -> forwarding rule.
    let url_map_spec = UrlMapSpec::from_route_table(
        ctx.srn().name(&["urlmap", &id]),
        ctx.description(),
        &composed.table,
    );
    let mut url_map_declaration = ResourceDeclaration::new(
        ctx.rn().name(&["net", "gcp", "urlmap", &id]),
        ResourceKind::UrlMap,
        &url_map_spec,
    )?
    .ignore("fingerprint");
    if !composed.table.is_configured() {
        // An absent collection must stay absent, or every reconciliation
        // pass would try to clear server-populated defaults.
        url_map_declaration =
            url_map_declaration.ignore("hostRules").ignore("pathMatchers");
    }
    let url_map = ctx.declare(url_map_declaration).await?;

    let https_name = proxy_short_name(&id, "https");
    let http_name = proxy_short_name(&id, "http");

    let https_proxy_spec = TargetProxySpec {
        name: ctx.srn().name(&[&https_name, "proxy"]),
        description: ctx.description(),
        url_map: url_map.as_str().to_string(),
        certificate_map: Some(format!("{}{}", CERTIFICATE_MANAGER_PREFIX, map.name)),
    };
    let https_proxy = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["net", "gcp", "proxy", &https_name]),
                ResourceKind::TargetHttpsProxy,
                &https_proxy_spec,
            )?
            .depends_on(&url_map)
            .depends_on(&map.reference),
        )
        .await?;

    let https_forwarding_rule = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["net", "gcp", "fwd", &https_name]),
                ResourceKind::GlobalForwardingRule,
                &ForwardingRuleSpec {
                    name: ctx.srn().name(&[&https_name, "fwd"]),
                    description: ctx.description(),
                    load_balancing_scheme: LoadBalancingScheme::ExternalManaged,
                    target: https_proxy.as_str().to_string(),
                    ip_address: args.ip.as_str().to_string(),
                    port_range: "443".to_string(),
                },
            )?
            .depends_on(&https_proxy),
        )
        .await?;

    // HTTP chain: a redirect-only URL map -> proxy -> forwarding rule.
    let http_map_id = format!("{}-http", id);
    let http_redirect_url_map = ctx
        .declare(ResourceDeclaration::new(
            ctx.rn().name(&["net", "gcp", "urlmap", &http_map_id]),
            ResourceKind::UrlMap,
            &HttpRedirectUrlMapSpec {
                name: ctx.srn().name(&["urlmap", &http_map_id]),
                description: ctx.description(),
                default_url_redirect: HttpsUpgradeAction::default(),
            },
        )?)
        .await?;

    let http_proxy = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["net", "gcp", "proxy", &http_name]),
                ResourceKind::TargetHttpProxy,
                &TargetProxySpec {
                    name: ctx.srn().name(&[&http_name, "proxy"]),
                    description: ctx.description(),
                    url_map: http_redirect_url_map.as_str().to_string(),
                    certificate_map: None,
                },
            )?
            .depends_on(&http_redirect_url_map),
        )
        .await?;

    let http_forwarding_rule = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["net", "gcp", "fwd", &http_name]),
                ResourceKind::GlobalForwardingRule,
                &ForwardingRuleSpec {
                    name: ctx.srn().name(&[&http_name, "fwd"]),
                    description: ctx.description(),
                    load_balancing_scheme: LoadBalancingScheme::ExternalManaged,
                    target: http_proxy.as_str().to_string(),
                    ip_address: args.ip.as_str().to_string(),
                    port_range: "80".to_string(),
                },
            )?
            .depends_on(&http_proxy),
        )
        .await?;

    tracing::info!(endpoint_id = %id, hostnames = certificates.len(), "Edge endpoint assembled");

    Ok(EdgeEndpoint {
        certificate_map: map.reference,
        certificates,
        url_map,
        https_proxy,
        https_forwarding_rule,
        http_redirect_url_map,
        http_proxy,
        http_forwarding_rule,
        ip: args.ip,
    })
}

async fn declare_certificate_map(
    id: &str,
    ctx: &ProvisioningContext,
) -> Result<CertificateMapHandle> {
    let name = format!(
        "projects/{}/locations/global/certificateMaps/{}",
        ctx.config().project.project,
        id
    );
    let reference = ctx
        .declare(ResourceDeclaration::new(
            ctx.rn().name(&["net", "gcp", "certmap", id]),
            ResourceKind::CertificateMap,
            &CertificateMapSpec {
                name: name.clone(),
                description: ctx.description(),
                location: GLOBAL_LOCATION.to_string(),
                certificate_map_id: id.to_string(),
            },
        )?)
        .await?;

    Ok(CertificateMapHandle { id: id.to_string(), name, reference })
}

/// Proxies and forwarding rules keep the bare scheme name for the default
/// endpoint and fold the endpoint id in otherwise.
fn proxy_short_name(id: &str, scheme: &str) -> String {
    if id == DEFAULT_ENDPOINT_ID {
        scheme.to_string()
    } else {
        format!("{}-{}", id, scheme)
    }
}
