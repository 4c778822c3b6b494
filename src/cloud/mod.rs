//! Single-resource provisioning helpers
//!
//! The boilerplate side of the deployment surface: projects, public IPs,
//! storage buckets, scheduler jobs, service accounts, hosted repositories,
//! and zone-level static DNS records. Each helper declares one object (or a
//! small fixed set) through the provider seams with the same identity
//! scheme the edge assembly uses; none carries composition logic of its
//! own.

pub mod github;
pub mod project;
pub mod public_ip;
pub mod scheduler;
pub mod service_account;
pub mod storage;

pub use github::{provision_github_repository, GithubRepository, GithubRepositoryArgs};
pub use project::{provision_project, Project, ProjectArgs};
pub use public_ip::{provision_public_ip, PublicIp, PublicIpArgs};
pub use scheduler::{provision_scheduler_jobs, SchedulerArgs, SchedulerJob};
pub use service_account::{provision_service_account, ServiceAccountArgs};
pub use storage::{provision_bucket, StorageBucket, StorageBucketArgs};

use crate::context::ProvisioningContext;
use crate::domain::zone::Zone;
use crate::errors::Result;
use crate::provider::DnsRecordRequest;

/// Upsert the static records a zone carries (SPF, verification records and
/// the like), in declaration order.
pub async fn provision_zone_records(zone: &Zone, ctx: &ProvisioningContext) -> Result<()> {
    for record in &zone.records {
        ctx.upsert_dns_record(
            zone,
            DnsRecordRequest {
                name: record.name.clone(),
                record_type: record.record_type,
                value: record.value.clone(),
                proxied: false,
            },
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment, ProjectConfig};
    use crate::domain::zone::{DnsRecordType, ZoneAccount, ZoneRecord};
    use crate::provider::MemoryProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn zone_records_are_upserted_in_order() {
        let provider = Arc::new(MemoryProvider::new());
        let config = AppConfig::new(
            Environment::Prod,
            ProjectConfig { project: "demo-123".into(), region: "us-central1".into() },
        );
        let ctx = ProvisioningContext::new(config, provider.clone(), provider.clone());

        let zone = Zone::new(
            "example.com",
            ZoneAccount { zone_id: "z1".into(), account_id: "a1".into() },
        )
        .with_record(ZoneRecord {
            name: "@".into(),
            record_type: DnsRecordType::Txt,
            value: "v=spf1 -all".into(),
        })
        .with_record(ZoneRecord {
            name: "mail".into(),
            record_type: DnsRecordType::A,
            value: "198.51.100.7".into(),
        });

        provision_zone_records(&zone, &ctx).await.unwrap();

        let upserts = provider.dns_upserts();
        assert_eq!(upserts.len(), 2);
        assert_eq!(upserts[0].request.name, "@");
        assert_eq!(upserts[1].request.name, "mail");
    }
}
