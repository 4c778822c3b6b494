//! Provider seams
//!
//! This crate decides *what* objects to declare, *in what order*, and
//! *under what identity*; the actual cloud work happens behind two
//! backend-agnostic traits:
//!
//! - [`InfrastructureProvider`] accepts a declarative
//!   [`ResourceDeclaration`] (identity, kind, spec payload, dependency
//!   edges, ignore-changes markers) and returns a stable [`ResourceRef`]
//!   once the object exists or is updated. The provider owns its own retry
//!   and parallelism policy; "blocking" here means logical apply order, not
//!   a network call made by this crate.
//! - [`DnsProvider`] upserts one record into a zone.
//!
//! Previously declared objects are never mutated in place — each
//! reconciliation pass re-declares the full graph, and identity being a
//! pure function of input makes repeated runs converge.
//!
//! # Example Implementation
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use edgekit::provider::{InfrastructureProvider, ResourceDeclaration, ResourceRef};
//! use edgekit::Result;
//!
//! struct PulumiBackend { /* backend-specific fields */ }
//!
//! #[async_trait]
//! impl InfrastructureProvider for PulumiBackend {
//!     async fn declare(&self, declaration: ResourceDeclaration) -> Result<ResourceRef> {
//!         // register the object with the engine, await its reference
//!         Ok(ResourceRef::new("projects/demo/..."))
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::route::BackendRef;
use crate::domain::zone::{DnsRecordType, Zone};
use crate::errors::Result;

pub mod memory;

pub use memory::MemoryProvider;

/// The kinds of declarative objects this crate emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Project,
    ProjectService,
    GlobalAddress,
    ManagedCertificate,
    CertificateMap,
    CertificateMapEntry,
    UrlMap,
    TargetHttpsProxy,
    TargetHttpProxy,
    GlobalForwardingRule,
    StorageBucket,
    BackendBucket,
    BucketIamMember,
    ServiceAccount,
    IamMember,
    SchedulerJob,
    GithubRepository,
    RepositoryCollaborator,
    TeamRepository,
    BranchProtection,
    RepositoryActionsPermissions,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Project => "project",
            ResourceKind::ProjectService => "project-service",
            ResourceKind::GlobalAddress => "global-address",
            ResourceKind::ManagedCertificate => "managed-certificate",
            ResourceKind::CertificateMap => "certificate-map",
            ResourceKind::CertificateMapEntry => "certificate-map-entry",
            ResourceKind::UrlMap => "url-map",
            ResourceKind::TargetHttpsProxy => "target-https-proxy",
            ResourceKind::TargetHttpProxy => "target-http-proxy",
            ResourceKind::GlobalForwardingRule => "global-forwarding-rule",
            ResourceKind::StorageBucket => "storage-bucket",
            ResourceKind::BackendBucket => "backend-bucket",
            ResourceKind::BucketIamMember => "bucket-iam-member",
            ResourceKind::ServiceAccount => "service-account",
            ResourceKind::IamMember => "iam-member",
            ResourceKind::SchedulerJob => "scheduler-job",
            ResourceKind::GithubRepository => "github-repository",
            ResourceKind::RepositoryCollaborator => "repository-collaborator",
            ResourceKind::TeamRepository => "team-repository",
            ResourceKind::BranchProtection => "branch-protection",
            ResourceKind::RepositoryActionsPermissions => "repository-actions-permissions",
        };
        write!(f, "{}", name)
    }
}

/// Stable reference to a declared object, handed back by the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(String);

impl ResourceRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<ResourceRef> for BackendRef {
    fn from(reference: ResourceRef) -> Self {
        BackendRef::new(reference.0)
    }
}

/// A declarative object handed to the infrastructure provider.
///
/// Dependency edges express required apply order; `ignore_changes` names
/// spec fields the provider must pin on reconciliation instead of
/// correcting every pass (used for the certificate's managed-domain list,
/// which drifts under upstream rotation, and for the unconfigured
/// route-table case).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDeclaration {
    pub identity: String,
    pub kind: ResourceKind,
    pub spec: serde_json::Value,
    pub depends_on: Vec<ResourceRef>,
    pub ignore_changes: Vec<String>,
}

impl ResourceDeclaration {
    /// Build a declaration from a typed spec payload
    pub fn new<T: Serialize>(
        identity: impl Into<String>,
        kind: ResourceKind,
        spec: &T,
    ) -> Result<Self> {
        Ok(Self {
            identity: identity.into(),
            kind,
            spec: serde_json::to_value(spec)?,
            depends_on: Vec::new(),
            ignore_changes: Vec::new(),
        })
    }

    /// Attach a dependency edge
    pub fn depends_on(mut self, reference: &ResourceRef) -> Self {
        self.depends_on.push(reference.clone());
        self
    }

    /// Mark a spec field as pinned on reconciliation
    pub fn ignore(mut self, field: impl Into<String>) -> Self {
        self.ignore_changes.push(field.into());
        self
    }
}

/// One record upsert request for a [`DnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecordRequest {
    /// Record name relative to the zone; `"@"` denotes the apex
    pub name: String,
    pub record_type: DnsRecordType,
    pub value: String,
    pub proxied: bool,
}

/// Accepts declarative object specs and dependency edges, returning a
/// stable reference once the object exists or is updated.
#[async_trait]
pub trait InfrastructureProvider: Send + Sync {
    /// Declare (create or converge) one object.
    ///
    /// # Errors
    ///
    /// [`Error::Provider`](crate::Error::Provider) when the backend rejects
    /// or fails the operation; the error is propagated unchanged.
    async fn declare(&self, declaration: ResourceDeclaration) -> Result<ResourceRef>;
}

/// Upserts DNS records into a hosted zone.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Create or update one record in the given zone.
    async fn upsert_record(&self, zone: &Zone, record: DnsRecordRequest) -> Result<()>;
}
