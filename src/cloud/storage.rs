//! Storage bucket provisioning
//!
//! Declares a bucket with uniform access, optional CORS and soft-delete
//! policies, an optional public-read IAM binding, and an optional backend
//! bucket so the edge can route a hostname straight at stored assets.

use serde::{Deserialize, Serialize};

use crate::context::ProvisioningContext;
use crate::errors::Result;
use crate::provider::{ResourceDeclaration, ResourceKind, ResourceRef};

const PUBLIC_READ_ROLE: &str = "roles/storage.objectViewer";
const SOFT_DELETE_RETENTION_SECONDS: u64 = 604_800; // 7 days

/// Inputs for a storage bucket
#[derive(Debug, Clone)]
pub struct StorageBucketArgs {
    /// Bucket short name, e.g. `uploads`
    pub name: String,
    /// Namespace prefix, e.g. the owning service's short code
    pub prefix: String,
    /// Bucket location; defaults to the configured region
    pub location: Option<String>,
    /// Grant `allUsers` read access
    pub public: bool,
    pub cors_enabled: bool,
    pub soft_delete_enabled: bool,
    /// Force CDN on the backend bucket (production enables it regardless)
    pub cdn_enabled: bool,
    /// Also declare a backend bucket for edge routing
    pub create_backend: bool,
    /// Exact bucket name overriding the generated one
    pub custom_name: Option<String>,
}

impl StorageBucketArgs {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            location: None,
            public: false,
            cors_enabled: false,
            soft_delete_enabled: false,
            cdn_enabled: false,
            create_backend: false,
            custom_name: None,
        }
    }
}

/// A provisioned bucket and, when requested, its backend bucket
#[derive(Debug, Clone)]
pub struct StorageBucket {
    pub bucket: ResourceRef,
    pub backend: Option<ResourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CorsRule {
    origins: Vec<String>,
    methods: Vec<String>,
    response_headers: Vec<String>,
    max_age_seconds: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SoftDeletePolicy {
    retention_duration_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketSpec {
    name: String,
    location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cors: Option<Vec<CorsRule>>,
    uniform_bucket_level_access: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    soft_delete_policy: Option<SoftDeletePolicy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketIamMemberSpec {
    bucket: String,
    role: String,
    member: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BackendBucketSpec {
    name: String,
    description: String,
    bucket_name: String,
    enable_cdn: bool,
    custom_response_headers: Vec<String>,
}

/// Declare a storage bucket and its optional companions.
pub async fn provision_bucket(
    args: StorageBucketArgs,
    ctx: &ProvisioningContext,
) -> Result<StorageBucket> {
    let location = args.location.clone().unwrap_or_else(|| ctx.config().project.region.clone());
    let bucket_name =
        args.custom_name.clone().unwrap_or_else(|| ctx.srn().name(&[&args.prefix, &args.name]));

    let cors = args.cors_enabled.then(|| {
        vec![CorsRule {
            origins: vec!["*".into()],
            methods: vec!["*".into()],
            response_headers: vec!["Content-Type".into()],
            max_age_seconds: 3600,
        }]
    });
    let soft_delete_policy = args.soft_delete_enabled.then(|| SoftDeletePolicy {
        retention_duration_seconds: SOFT_DELETE_RETENTION_SECONDS,
    });

    let bucket = ctx
        .declare(ResourceDeclaration::new(
            ctx.rn().name(&["storage", "gcp", "bucket", &args.prefix, &args.name]),
            ResourceKind::StorageBucket,
            &BucketSpec {
                name: bucket_name.clone(),
                location: location.to_uppercase(),
                cors,
                uniform_bucket_level_access: true,
                soft_delete_policy,
            },
        )?)
        .await?;

    if args.public {
        ctx.declare(
            ResourceDeclaration::new(
                ctx.rn().name(&[
                    "storage", "gcp", "bucket", &args.prefix, &args.name, "public-access",
                ]),
                ResourceKind::BucketIamMember,
                &BucketIamMemberSpec {
                    bucket: bucket_name.clone(),
                    role: PUBLIC_READ_ROLE.to_string(),
                    member: "allUsers".to_string(),
                },
            )?
            .depends_on(&bucket),
        )
        .await?;
    }

    let backend = if args.create_backend {
        let reference = ctx
            .declare(
                ResourceDeclaration::new(
                    ctx.rn().name(&["storage", "gcp", "bucket", &args.prefix, &args.name, "backend"]),
                    ResourceKind::BackendBucket,
                    &BackendBucketSpec {
                        name: ctx.srn().name(&["bucket", &args.name]),
                        description: ctx.description(),
                        bucket_name,
                        enable_cdn: ctx.environment().is_production() || args.cdn_enabled,
                        custom_response_headers: vec![
                            "Cache-Status: {cdn_cache_status}".to_string()
                        ],
                    },
                )?
                .depends_on(&bucket),
            )
            .await?;
        Some(reference)
    } else {
        None
    };

    Ok(StorageBucket { bucket, backend })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment, ProjectConfig};
    use crate::provider::MemoryProvider;
    use std::sync::Arc;

    fn context(environment: Environment) -> (Arc<MemoryProvider>, ProvisioningContext) {
        let provider = Arc::new(MemoryProvider::new());
        let config = AppConfig::new(
            environment,
            ProjectConfig { project: "demo-123".into(), region: "us-central1".into() },
        );
        let ctx = ProvisioningContext::new(config, provider.clone(), provider.clone());
        (provider, ctx)
    }

    #[tokio::test]
    async fn plain_bucket_uses_generated_name_and_region() {
        let (provider, ctx) = context(Environment::Stage);
        provision_bucket(StorageBucketArgs::new("uploads", "hc"), &ctx).await.unwrap();

        let bucket = &provider.declarations_of(ResourceKind::StorageBucket)[0];
        assert_eq!(bucket.spec["name"], "hc-uploads-stage");
        assert_eq!(bucket.spec["location"], "US-CENTRAL1");
        assert_eq!(bucket.spec["uniformBucketLevelAccess"], true);
        assert!(bucket.spec.get("cors").is_none());
        assert!(bucket.spec.get("softDeletePolicy").is_none());
    }

    #[tokio::test]
    async fn custom_name_overrides_generated_name() {
        let (provider, ctx) = context(Environment::Prod);
        let mut args = StorageBucketArgs::new("backups", "sql");
        args.custom_name = Some("sql-backups".into());
        provision_bucket(args, &ctx).await.unwrap();

        let bucket = &provider.declarations_of(ResourceKind::StorageBucket)[0];
        assert_eq!(bucket.spec["name"], "sql-backups");
    }

    #[tokio::test]
    async fn public_bucket_gets_read_binding() {
        let (provider, ctx) = context(Environment::Prod);
        let mut args = StorageBucketArgs::new("assets", "web");
        args.public = true;
        let result = provision_bucket(args, &ctx).await.unwrap();

        let binding = &provider.declarations_of(ResourceKind::BucketIamMember)[0];
        assert_eq!(binding.spec["role"], PUBLIC_READ_ROLE);
        assert_eq!(binding.spec["member"], "allUsers");
        assert!(binding.depends_on.contains(&result.bucket));
    }

    #[tokio::test]
    async fn production_backend_forces_cdn() {
        let (provider, ctx) = context(Environment::Prod);
        let mut args = StorageBucketArgs::new("assets", "web");
        args.create_backend = true;
        let result = provision_bucket(args, &ctx).await.unwrap();

        assert!(result.backend.is_some());
        let backend = &provider.declarations_of(ResourceKind::BackendBucket)[0];
        assert_eq!(backend.spec["enableCdn"], true);
        assert!(backend.depends_on.contains(&result.bucket));
    }

    #[tokio::test]
    async fn soft_delete_and_cors_are_opt_in() {
        let (provider, ctx) = context(Environment::Dev);
        let mut args = StorageBucketArgs::new("uploads", "hc");
        args.cors_enabled = true;
        args.soft_delete_enabled = true;
        provision_bucket(args, &ctx).await.unwrap();

        let bucket = &provider.declarations_of(ResourceKind::StorageBucket)[0];
        assert_eq!(bucket.spec["cors"][0]["maxAgeSeconds"], 3600);
        assert_eq!(
            bucket.spec["softDeletePolicy"]["retentionDurationSeconds"],
            SOFT_DELETE_RETENTION_SECONDS
        );
    }
}
