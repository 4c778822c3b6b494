//! Provisioning context
//!
//! Bundles the configuration, the two identity namers, and the provider
//! handles every provisioning function needs. Built once per run by the
//! embedding deployment program and passed by reference.

use std::sync::Arc;

use crate::config::{AppConfig, Environment};
use crate::domain::zone::Zone;
use crate::errors::Result;
use crate::naming::ResourceNamer;
use crate::provider::{
    DnsProvider, DnsRecordRequest, InfrastructureProvider, ResourceDeclaration, ResourceRef,
};

/// Shared state for one provisioning run
#[derive(Clone)]
pub struct ProvisioningContext {
    config: AppConfig,
    rn: ResourceNamer,
    srn: ResourceNamer,
    infra: Arc<dyn InfrastructureProvider>,
    dns: Arc<dyn DnsProvider>,
}

impl ProvisioningContext {
    pub fn new(
        config: AppConfig,
        infra: Arc<dyn InfrastructureProvider>,
        dns: Arc<dyn DnsProvider>,
    ) -> Self {
        let environment = config.environment;
        Self {
            config,
            rn: ResourceNamer::hierarchical(environment),
            srn: ResourceNamer::flat(environment),
            infra,
            dns,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.config.environment
    }

    /// The hierarchical namer used for internal bookkeeping identities
    pub fn rn(&self) -> &ResourceNamer {
        &self.rn
    }

    /// The flat namer used where target naming rules forbid `/` and `:`
    pub fn srn(&self) -> &ResourceNamer {
        &self.srn
    }

    /// The description stamped on every declared object
    pub fn description(&self) -> String {
        self.config.managed_by_description()
    }

    /// Declare one object with the infrastructure provider
    pub async fn declare(&self, declaration: ResourceDeclaration) -> Result<ResourceRef> {
        tracing::debug!(
            identity = %declaration.identity,
            kind = %declaration.kind,
            depends_on = declaration.depends_on.len(),
            "Declaring resource"
        );
        self.infra.declare(declaration).await
    }

    /// Upsert one DNS record through the DNS provider
    pub async fn upsert_dns_record(&self, zone: &Zone, record: DnsRecordRequest) -> Result<()> {
        tracing::debug!(
            zone = %zone.name,
            record = %record.name,
            record_type = %record.record_type,
            "Upserting DNS record"
        );
        self.dns.upsert_record(zone, record).await
    }
}

impl std::fmt::Debug for ProvisioningContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningContext")
            .field("environment", &self.config.environment)
            .field("project", &self.config.project.project)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectConfig;
    use crate::provider::MemoryProvider;

    fn context() -> (Arc<MemoryProvider>, ProvisioningContext) {
        let provider = Arc::new(MemoryProvider::new());
        let config = AppConfig::new(
            Environment::Stage,
            ProjectConfig { project: "demo-123".into(), region: "us-central1".into() },
        );
        let ctx = ProvisioningContext::new(config, provider.clone(), provider.clone());
        (provider, ctx)
    }

    #[test]
    fn namers_share_the_config_environment() {
        let (_, ctx) = context();
        assert_eq!(ctx.rn().name(&["net", "gcp", "ip", "primary"]), "net/gcp/ip/primary:stage");
        assert_eq!(ctx.srn().name(&["ip", "primary"]), "ip-primary-stage");
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn declare_delegates_to_the_provider() {
        let (provider, ctx) = context();
        let spec = crate::domain::endpoint::GlobalAddressSpec { name: "ip".into() };
        let declaration = ResourceDeclaration::new(
            "net/gcp/ip/primary:stage",
            crate::provider::ResourceKind::GlobalAddress,
            &spec,
        )
        .unwrap();
        ctx.declare(declaration).await.unwrap();
        assert_eq!(provider.identities(), vec!["net/gcp/ip/primary:stage"]);
        assert!(logs_contain("Declaring resource"));
    }
}
