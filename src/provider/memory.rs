//! In-memory recording provider
//!
//! Records every declaration and DNS upsert in arrival order instead of
//! touching a cloud API. Used as the test double throughout the crate and
//! as a dry-run backend for inspecting what a provisioning pass would
//! declare.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::zone::Zone;
use crate::errors::Result;

use super::{
    DnsProvider, DnsRecordRequest, InfrastructureProvider, ResourceDeclaration, ResourceKind,
    ResourceRef,
};

/// A DNS upsert captured together with the zone it targeted
#[derive(Debug, Clone)]
pub struct RecordedDnsUpsert {
    pub zone_name: String,
    pub request: DnsRecordRequest,
}

/// Recording implementation of both provider traits
#[derive(Debug, Default)]
pub struct MemoryProvider {
    declarations: Mutex<Vec<ResourceDeclaration>>,
    dns_upserts: Mutex<Vec<RecordedDnsUpsert>>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// All declarations in arrival order
    pub fn declarations(&self) -> Vec<ResourceDeclaration> {
        self.declarations.lock().expect("provider lock").clone()
    }

    /// Identities of all declarations, in arrival order
    pub fn identities(&self) -> Vec<String> {
        self.declarations().into_iter().map(|d| d.identity).collect()
    }

    /// All declarations of one kind, in arrival order
    pub fn declarations_of(&self, kind: ResourceKind) -> Vec<ResourceDeclaration> {
        self.declarations().into_iter().filter(|d| d.kind == kind).collect()
    }

    /// The declaration with the given identity, if any
    pub fn find(&self, identity: &str) -> Option<ResourceDeclaration> {
        self.declarations().into_iter().find(|d| d.identity == identity)
    }

    /// All DNS upserts in arrival order
    pub fn dns_upserts(&self) -> Vec<RecordedDnsUpsert> {
        self.dns_upserts.lock().expect("provider lock").clone()
    }

    /// The stable reference the provider hands out for an identity
    pub fn reference_for(identity: &str) -> ResourceRef {
        ResourceRef::new(format!("ref:{}", identity))
    }
}

#[async_trait]
impl InfrastructureProvider for MemoryProvider {
    async fn declare(&self, declaration: ResourceDeclaration) -> Result<ResourceRef> {
        let reference = Self::reference_for(&declaration.identity);
        self.declarations.lock().expect("provider lock").push(declaration);
        Ok(reference)
    }
}

#[async_trait]
impl DnsProvider for MemoryProvider {
    async fn upsert_record(&self, zone: &Zone, record: DnsRecordRequest) -> Result<()> {
        self.dns_upserts
            .lock()
            .expect("provider lock")
            .push(RecordedDnsUpsert { zone_name: zone.name.clone(), request: record });
        Ok(())
    }
}
