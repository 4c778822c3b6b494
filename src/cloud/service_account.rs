//! Service account provisioning
//!
//! Declares a service account and one project IAM binding per requested
//! role.

use serde::{Deserialize, Serialize};

use crate::context::ProvisioningContext;
use crate::errors::Result;
use crate::naming::dash_to_title;
use crate::provider::{ResourceDeclaration, ResourceKind, ResourceRef};

/// Inputs for a service account
#[derive(Debug, Clone)]
pub struct ServiceAccountArgs {
    /// Account short name, e.g. `web-app`
    pub name: String,
    /// Human-facing display name; derived from `name` when omitted
    pub display_name: Option<String>,
    /// Project the account belongs to (may differ from the run's project)
    pub project: String,
    /// Role short names granted on the project, e.g. `storage.admin`
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceAccountSpec {
    account_id: String,
    description: String,
    display_name: String,
    project: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IamMemberSpec {
    project: String,
    role: String,
    member: String,
}

/// Declare the account, then one IAM member per role.
pub async fn provision_service_account(
    args: ServiceAccountArgs,
    ctx: &ProvisioningContext,
) -> Result<ResourceRef> {
    let display_name = args
        .display_name
        .clone()
        .unwrap_or_else(|| format!("{} Service", dash_to_title(&args.name)));

    let account = ctx
        .declare(ResourceDeclaration::new(
            ctx.rn().name(&["iam", "gcp", "sa", &args.project, &args.name]),
            ResourceKind::ServiceAccount,
            &ServiceAccountSpec {
                account_id: args.name.clone(),
                description: ctx.description(),
                display_name,
                project: args.project.clone(),
            },
        )?)
        .await?;

    for role in &args.roles {
        ctx.declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["iam", "gcp", "sa", &args.project, &args.name, "role", role]),
                ResourceKind::IamMember,
                &IamMemberSpec {
                    project: args.project.clone(),
                    role: format!("roles/{}", role),
                    // The provider resolves the reference to the account email.
                    member: format!("serviceAccount:{}", account.as_str()),
                },
            )?
            .depends_on(&account),
        )
        .await?;
    }

    Ok(account)
}
