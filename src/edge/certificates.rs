//! Certificate provisioning
//!
//! Ensures each distinct hostname has a managed certificate and a
//! certificate-map entry binding it into the shared map. Both objects are
//! keyed by the sanitized (dots→dashes) hostname, so re-invocation is a
//! no-op at the data-model level.

use crate::context::ProvisioningContext;
use crate::domain::endpoint::{CertificateMapEntrySpec, ManagedCertificateSpec, ManagedDomains};
use crate::domain::route::Hostname;
use crate::errors::Result;
use crate::provider::{ResourceDeclaration, ResourceKind, ResourceRef};

use super::GLOBAL_LOCATION;

/// The shared certificate map an endpoint's entries are appended to
#[derive(Debug, Clone)]
pub struct CertificateMapHandle {
    /// Short map id (the endpoint id)
    pub id: String,
    /// Fully qualified map name in the target API
    pub name: String,
    pub reference: ResourceRef,
}

/// The pair of objects provisioned for one hostname
#[derive(Debug, Clone)]
pub struct CertificateBinding {
    pub hostname: Hostname,
    pub certificate: ResourceRef,
    pub map_entry: ResourceRef,
}

/// Ensure a managed certificate and its map entry exist for `hostname`.
///
/// The certificate's managed-domain list is known to drift under upstream
/// rotation; it is declared with an ignore-changes marker so reconciliation
/// pins it instead of rewriting it every pass.
pub async fn ensure_certificate(
    hostname: &Hostname,
    map: &CertificateMapHandle,
    ctx: &ProvisioningContext,
) -> Result<CertificateBinding> {
    let project = &ctx.config().project.project;
    let safe_name = hostname.sanitized();

    let certificate_spec = ManagedCertificateSpec {
        name: format!("projects/{}/locations/global/certificates/{}", project, safe_name),
        description: ctx.description(),
        location: GLOBAL_LOCATION.to_string(),
        certificate_id: safe_name.clone(),
        managed: ManagedDomains { domains: vec![hostname.as_str().to_string()] },
    };
    let certificate = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["net", "gcp", "cert", hostname.as_str()]),
                ResourceKind::ManagedCertificate,
                &certificate_spec,
            )?
            .ignore("managed"),
        )
        .await?;

    tracing::info!(hostname = %hostname, certificate = %certificate, "Managed certificate declared");

    let entry_spec = CertificateMapEntrySpec {
        name: format!("{}/certificateMapEntries/{}", map.id, safe_name),
        description: ctx.description(),
        location: GLOBAL_LOCATION.to_string(),
        certificate_map_entry_id: safe_name,
        certificate_map_id: map.id.clone(),
        certificates: vec![certificate.as_str().to_string()],
        hostname: hostname.as_str().to_string(),
    };
    let map_entry = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["net", "gcp", "certmap", &map.id, hostname.as_str()]),
                ResourceKind::CertificateMapEntry,
                &entry_spec,
            )?
            .depends_on(&certificate)
            .depends_on(&map.reference),
        )
        .await?;

    Ok(CertificateBinding { hostname: hostname.clone(), certificate, map_entry })
}
