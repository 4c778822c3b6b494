//! Scheduler job provisioning
//!
//! Declares HTTP-target scheduled jobs against a service endpoint. Jobs may
//! be pinned to a single environment; pinned jobs are skipped everywhere
//! else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Environment;
use crate::context::ProvisioningContext;
use crate::errors::Result;
use crate::provider::{ResourceDeclaration, ResourceKind, ResourceRef};

const DEFAULT_TIME_ZONE: &str = "America/New_York";
const DEFAULT_SCHEDULE: &str = "* * * * *";

/// One scheduled job
#[derive(Debug, Clone)]
pub struct SchedulerJob {
    pub name: String,
    /// Cron expression; every minute when omitted
    pub schedule: Option<String>,
    /// Restrict the job to one environment
    pub environment: Option<Environment>,
    /// Request path; defaults to `/workers/<name>`
    pub url: Option<String>,
}

impl SchedulerJob {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), schedule: None, environment: None, url: None }
    }
}

/// Inputs for a batch of scheduled jobs targeting one service
#[derive(Debug, Clone)]
pub struct SchedulerArgs {
    pub jobs: Vec<SchedulerJob>,
    pub time_zone: Option<String>,
    /// Bearer token added to every job request when present
    pub auth_token: Option<String>,
    /// Hostname the jobs call, e.g. `api.example.com`
    pub service_endpoint: String,
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpTarget {
    http_method: String,
    uri: String,
    headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulerJobSpec {
    name: String,
    time_zone: String,
    schedule: String,
    description: String,
    http_target: HttpTarget,
}

/// Declare the jobs applicable to the current environment, in input order.
pub async fn provision_scheduler_jobs(
    args: SchedulerArgs,
    ctx: &ProvisioningContext,
) -> Result<Vec<ResourceRef>> {
    let time_zone = args.time_zone.unwrap_or_else(|| DEFAULT_TIME_ZONE.to_string());
    let mut headers = BTreeMap::new();
    if let Some(token) = &args.auth_token {
        headers.insert("Authorization".to_string(), format!("Bearer {}", token));
    }

    let project = &ctx.config().project.project;
    let region = &ctx.config().project.region;

    let mut references = Vec::new();
    for job in &args.jobs {
        if let Some(pinned) = job.environment {
            if pinned != ctx.environment() {
                tracing::debug!(job = %job.name, environment = %pinned, "Skipping pinned job");
                continue;
            }
        }

        let uri = match &job.url {
            Some(path) => format!("https://{}{}", args.service_endpoint, path),
            None => format!("https://{}/workers/{}", args.service_endpoint, job.name),
        };

        let reference = ctx
            .declare(ResourceDeclaration::new(
                ctx.rn().name(&["service", &args.service_name, "gcp", "scheduled", &job.name]),
                ResourceKind::SchedulerJob,
                &SchedulerJobSpec {
                    name: format!("projects/{}/locations/{}/jobs/{}", project, region, job.name),
                    time_zone: time_zone.clone(),
                    schedule: job
                        .schedule
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SCHEDULE.to_string()),
                    description: ctx.description(),
                    http_target: HttpTarget {
                        http_method: "POST".to_string(),
                        uri,
                        headers: headers.clone(),
                    },
                },
            )?)
            .await?;
        references.push(reference);
    }

    Ok(references)
}
