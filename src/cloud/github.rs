//! Repository provisioning
//!
//! Declares a source-hosting repository together with its access grants,
//! branch protections, and workflow permissions. The repository name
//! defaults to the dash-cased title.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::context::ProvisioningContext;
use crate::errors::Result;
use crate::naming::dash_case;
use crate::provider::{ResourceDeclaration, ResourceKind, ResourceRef};

/// Branches protected when `protection` is enabled; one per deployment
/// environment plus the production branch.
const PROTECTED_BRANCHES: [&str; 3] = ["dev", "stage", "master"];

/// Access level granted on a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryRole {
    Pull,
    Triage,
    Push,
    Maintain,
    Admin,
}

impl fmt::Display for RepositoryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepositoryRole::Pull => "pull",
            RepositoryRole::Triage => "triage",
            RepositoryRole::Push => "push",
            RepositoryRole::Maintain => "maintain",
            RepositoryRole::Admin => "admin",
        };
        write!(f, "{}", name)
    }
}

/// One user granted access to the repository
#[derive(Debug, Clone)]
pub struct RepositoryUser {
    pub login: String,
    pub role: RepositoryRole,
}

/// One team granted access to the repository
#[derive(Debug, Clone)]
pub struct RepositoryTeam {
    pub team: String,
    pub role: RepositoryRole,
}

/// Inputs for a hosted repository
#[derive(Debug, Clone)]
pub struct GithubRepositoryArgs {
    /// Human-facing title, e.g. `Web App`
    pub title: String,
    /// Repository name; dash-cased title when omitted
    pub name: Option<String>,
    /// Owning organization
    pub org: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub public: bool,
    /// Protect the deployment branches with required reviews
    pub protection: bool,
    /// Allow workflow runs on the repository
    pub actions_enabled: bool,
    pub archived: bool,
    pub users: Vec<RepositoryUser>,
    pub teams: Vec<RepositoryTeam>,
}

impl GithubRepositoryArgs {
    pub fn new(title: impl Into<String>, org: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            name: None,
            org: org.into(),
            description: None,
            homepage: None,
            public: false,
            protection: false,
            actions_enabled: false,
            archived: false,
            users: Vec::new(),
            teams: Vec::new(),
        }
    }
}

/// A provisioned repository
#[derive(Debug, Clone)]
pub struct GithubRepository {
    pub repository: ResourceRef,
    /// The resolved repository name
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositorySpec {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage_url: Option<String>,
    visibility: String,
    allow_merge_commit: bool,
    allow_rebase_merge: bool,
    allow_squash_merge: bool,
    archived: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CollaboratorSpec {
    repository: String,
    username: String,
    permission: RepositoryRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TeamRepositorySpec {
    repository: String,
    team_id: String,
    permission: RepositoryRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequiredReviews {
    dismiss_stale_reviews: bool,
    required_approving_review_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BranchProtectionSpec {
    repository_id: String,
    pattern: String,
    required_pull_request_reviews: Vec<RequiredReviews>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActionsPermissionsSpec {
    repository: String,
    allowed_actions: String,
}

/// Declare the repository, then its grants and protections, each depending
/// on the repository.
///
/// Merge-message templates drift as maintainers adjust them in the UI, so
/// they carry ignore-changes markers.
pub async fn provision_github_repository(
    args: GithubRepositoryArgs,
    ctx: &ProvisioningContext,
) -> Result<GithubRepository> {
    let name = args.name.clone().unwrap_or_else(|| dash_case(&args.title));
    let visibility = if args.public { "public" } else { "private" };

    let repository = ctx
        .declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["code", "github", &args.org, "repo", &name]),
                ResourceKind::GithubRepository,
                &RepositorySpec {
                    name: name.clone(),
                    description: args.description.clone(),
                    homepage_url: args.homepage.clone(),
                    visibility: visibility.to_string(),
                    allow_merge_commit: true,
                    allow_rebase_merge: false,
                    allow_squash_merge: false,
                    archived: args.archived,
                },
            )?
            .ignore("mergeCommitMessage")
            .ignore("mergeCommitTitle")
            .ignore("squashMergeCommitMessage")
            .ignore("squashMergeCommitTitle"),
        )
        .await?;

    for user in &args.users {
        ctx.declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["code", "github", &args.org, "repo", &name, "user", &user.login]),
                ResourceKind::RepositoryCollaborator,
                &CollaboratorSpec {
                    repository: name.clone(),
                    username: user.login.clone(),
                    permission: user.role,
                },
            )?
            .depends_on(&repository),
        )
        .await?;
    }

    for team in &args.teams {
        ctx.declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["code", "github", &args.org, "repo", &name, "team", &team.team]),
                ResourceKind::TeamRepository,
                &TeamRepositorySpec {
                    repository: name.clone(),
                    team_id: team.team.clone(),
                    permission: team.role,
                },
            )?
            .depends_on(&repository),
        )
        .await?;
    }

    if args.protection {
        for branch in PROTECTED_BRANCHES {
            ctx.declare(
                ResourceDeclaration::new(
                    ctx.rn().name(&[
                        "code", "github", &args.org, "repo", &name, "branch", branch,
                        "protection",
                    ]),
                    ResourceKind::BranchProtection,
                    &BranchProtectionSpec {
                        repository_id: name.clone(),
                        pattern: branch.to_string(),
                        required_pull_request_reviews: vec![RequiredReviews {
                            dismiss_stale_reviews: true,
                            required_approving_review_count: 1,
                        }],
                    },
                )?
                .depends_on(&repository),
            )
            .await?;
        }
    }

    if args.actions_enabled {
        ctx.declare(
            ResourceDeclaration::new(
                ctx.rn().name(&["code", "github", &args.org, "repo", &name, "actions"]),
                ResourceKind::RepositoryActionsPermissions,
                &ActionsPermissionsSpec {
                    repository: name.clone(),
                    allowed_actions: "all".to_string(),
                },
            )?
            .depends_on(&repository),
        )
        .await?;
    }

    Ok(GithubRepository { repository, name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, Environment, ProjectConfig};
    use crate::provider::MemoryProvider;
    use std::sync::Arc;

    fn context() -> (Arc<MemoryProvider>, ProvisioningContext) {
        let provider = Arc::new(MemoryProvider::new());
        let config = AppConfig::new(
            Environment::Prod,
            ProjectConfig { project: "demo-123".into(), region: "us-central1".into() },
        );
        let ctx = ProvisioningContext::new(config, provider.clone(), provider.clone());
        (provider, ctx)
    }

    #[tokio::test]
    async fn repository_name_defaults_to_dash_cased_title() {
        let (provider, ctx) = context();
        let result =
            provision_github_repository(GithubRepositoryArgs::new("Web App", "deepvision"), &ctx)
                .await
                .unwrap();

        assert_eq!(result.name, "web-app");
        let repo = &provider.declarations_of(ResourceKind::GithubRepository)[0];
        assert_eq!(repo.identity, "code/github/deepvision/repo/web-app");
        assert_eq!(repo.spec["name"], "web-app");
        assert_eq!(repo.spec["visibility"], "private");
    }

    #[tokio::test]
    async fn merge_message_templates_are_pinned() {
        let (provider, ctx) = context();
        provision_github_repository(GithubRepositoryArgs::new("Web App", "deepvision"), &ctx)
            .await
            .unwrap();

        let repo = &provider.declarations_of(ResourceKind::GithubRepository)[0];
        assert_eq!(
            repo.ignore_changes,
            vec![
                "mergeCommitMessage".to_string(),
                "mergeCommitTitle".to_string(),
                "squashMergeCommitMessage".to_string(),
                "squashMergeCommitTitle".to_string(),
            ]
        );
        assert_eq!(repo.spec["allowMergeCommit"], true);
        assert_eq!(repo.spec["allowSquashMerge"], false);
    }

    #[tokio::test]
    async fn grants_depend_on_the_repository() {
        let (provider, ctx) = context();
        let mut args = GithubRepositoryArgs::new("Web App", "deepvision");
        args.users =
            vec![RepositoryUser { login: "jdoe".into(), role: RepositoryRole::Admin }];
        args.teams =
            vec![RepositoryTeam { team: "platform".into(), role: RepositoryRole::Push }];
        let result = provision_github_repository(args, &ctx).await.unwrap();

        let collaborator = &provider.declarations_of(ResourceKind::RepositoryCollaborator)[0];
        assert_eq!(collaborator.spec["username"], "jdoe");
        assert_eq!(collaborator.spec["permission"], "admin");
        assert!(collaborator.depends_on.contains(&result.repository));

        let team = &provider.declarations_of(ResourceKind::TeamRepository)[0];
        assert_eq!(team.spec["teamId"], "platform");
        assert_eq!(team.spec["permission"], "push");
        assert!(team.depends_on.contains(&result.repository));
    }

    #[tokio::test]
    async fn protection_covers_every_deployment_branch() {
        let (provider, ctx) = context();
        let mut args = GithubRepositoryArgs::new("Web App", "deepvision");
        args.protection = true;
        provision_github_repository(args, &ctx).await.unwrap();

        let protections = provider.declarations_of(ResourceKind::BranchProtection);
        assert_eq!(protections.len(), PROTECTED_BRANCHES.len());
        for (declaration, branch) in protections.iter().zip(PROTECTED_BRANCHES) {
            assert_eq!(declaration.spec["pattern"], branch);
            assert_eq!(
                declaration.spec["requiredPullRequestReviews"][0]
                    ["requiredApprovingReviewCount"],
                1
            );
        }
    }

    #[tokio::test]
    async fn actions_permissions_are_opt_in() {
        let (provider, ctx) = context();
        provision_github_repository(GithubRepositoryArgs::new("Web App", "deepvision"), &ctx)
            .await
            .unwrap();
        assert!(provider.declarations_of(ResourceKind::RepositoryActionsPermissions).is_empty());

        let mut args = GithubRepositoryArgs::new("Docs Site", "deepvision");
        args.actions_enabled = true;
        provision_github_repository(args, &ctx).await.unwrap();

        let actions = &provider.declarations_of(ResourceKind::RepositoryActionsPermissions)[0];
        assert_eq!(actions.identity, "code/github/deepvision/repo/docs-site/actions");
        assert_eq!(actions.spec["allowedActions"], "all");
    }
}
