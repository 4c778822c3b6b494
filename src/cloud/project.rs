//! Project provisioning
//!
//! Declares a cloud project under an organization or folder and enables
//! the APIs it needs, each enablement depending on the project.

use serde::{Deserialize, Serialize};

use crate::context::ProvisioningContext;
use crate::errors::{Error, Result};
use crate::provider::{ResourceDeclaration, ResourceKind, ResourceRef};

/// Inputs for a project
#[derive(Debug, Clone)]
pub struct ProjectArgs {
    /// Project ID, e.g. `hccloud`
    pub id: String,
    /// Human-facing project name, e.g. `HC Cloud`
    pub name: String,
    /// Billing account the project is charged to
    pub billing_account_id: String,
    /// API short names to enable, e.g. `compute`, `certificatemanager`
    pub services: Vec<String>,
    /// Parent organization ID; mutually optional with `parent_folder`
    pub parent_org: Option<String>,
    /// Reference to a parent folder
    pub parent_folder: Option<ResourceRef>,
}

impl ProjectArgs {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        billing_account_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            billing_account_id: billing_account_id.into(),
            services: Vec::new(),
            parent_org: None,
            parent_folder: None,
        }
    }

    pub fn with_services(
        mut self,
        services: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.services.extend(services.into_iter().map(Into::into));
        self
    }
}

/// A provisioned project and its enabled APIs
#[derive(Debug, Clone)]
pub struct Project {
    pub project: ResourceRef,
    pub services: Vec<ResourceRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectSpec {
    project_id: String,
    name: String,
    billing_account: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    org_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectServiceSpec {
    project: String,
    service: String,
    disable_dependent_services: bool,
}

/// Declare the project, then one API enablement per requested service.
///
/// Projects migrate between organizations out of band, so the parent
/// organization carries an ignore-changes marker.
pub async fn provision_project(args: ProjectArgs, ctx: &ProvisioningContext) -> Result<Project> {
    if args.parent_org.is_none() && args.parent_folder.is_none() {
        return Err(Error::config(format!(
            "Project '{}' needs a parent organization or folder",
            args.id
        )));
    }

    let project = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["root", "gcp", "project", &args.id]),
                ResourceKind::Project,
                &ProjectSpec {
                    project_id: args.id.clone(),
                    name: args.name.clone(),
                    billing_account: args.billing_account_id.clone(),
                    org_id: args.parent_org.clone(),
                    folder_id: args.parent_folder.as_ref().map(|f| f.as_str().to_string()),
                },
            )?
            .ignore("orgId"),
        )
        .await?;

    let mut services = Vec::with_capacity(args.services.len());
    for service in &args.services {
        let reference = ctx
            .declare(
                ResourceDeclaration::new(
                    ctx.rn().name(&["root", "gcp", "project", &args.id, "service", service]),
                    ResourceKind::ProjectService,
                    &ProjectServiceSpec {
                        project: args.id.clone(),
                        service: format!("{}.googleapis.com", service),
                        disable_dependent_services: true,
                    },
                )?
                .depends_on(&project),
            )
            .await?;
        services.push(reference);
    }

    tracing::info!(project = %args.id, services = services.len(), "Project provisioned");

    Ok(Project { project, services })
}
