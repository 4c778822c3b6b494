//! Public IP provisioning
//!
//! Declares a global static address and registers an A record for it in a
//! "technical" zone, yielding the DNS alias the edge assembly points its
//! per-service CNAME records at.

use crate::context::ProvisioningContext;
use crate::domain::endpoint::GlobalAddressSpec;
use crate::domain::zone::{DnsRecordType, Zone};
use crate::errors::Result;
use crate::provider::{DnsRecordRequest, ResourceDeclaration, ResourceKind, ResourceRef};

/// Inputs for a public IP
#[derive(Debug, Clone)]
pub struct PublicIpArgs {
    /// Address id; matches the edge endpoint id it will serve
    pub id: String,
    /// The zone hosting the technical A record
    pub technical_zone: Zone,
}

impl PublicIpArgs {
    pub fn new(id: impl Into<String>, technical_zone: Zone) -> Self {
        Self { id: id.into(), technical_zone }
    }
}

/// A provisioned address and its DNS alias
#[derive(Debug, Clone)]
pub struct PublicIp {
    pub address: ResourceRef,
    /// Fully qualified alias, e.g. `primary.demo-123.gcloud.example.net`
    pub alias: String,
}

/// Declare a global static address plus its technical-zone A record.
///
/// The allocated address value and its label fingerprint are owned by the
/// target platform after creation, so both fields carry ignore-changes
/// markers.
pub async fn provision_public_ip(
    args: PublicIpArgs,
    ctx: &ProvisioningContext,
) -> Result<PublicIp> {
    let address = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["net", "gcp", "ip", &args.id]),
                ResourceKind::GlobalAddress,
                &GlobalAddressSpec { name: ctx.srn().name(&["ip", &args.id]) },
            )?
            .ignore("address")
            .ignore("labelFingerprint"),
        )
        .await?;

    let alias_label = format!("{}.{}.gcloud", args.id, ctx.config().project.project);
    ctx.upsert_dns_record(
        &args.technical_zone,
        DnsRecordRequest {
            name: alias_label.clone(),
            record_type: DnsRecordType::A,
            // The provider resolves the reference to the allocated address.
            value: address.as_str().to_string(),
            proxied: false,
        },
    )
    .await?;

    let alias = format!("{}.{}", alias_label, args.technical_zone.name);
    tracing::info!(address = %address, alias = %alias, "Public IP provisioned");

    Ok(PublicIp { address, alias })
}
