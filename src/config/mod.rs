//! # Configuration Management
//!
//! Deployment environment and target-project configuration for the edgekit
//! provisioning core. This library owns no config file format; the values
//! here are supplied by the embedding deployment program, with an
//! environment-variable fallback for local runs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::errors::{Error, Result};

/// Deployment environment. Everything provisioned by this crate is
/// environment-qualified; production is the unsuffixed baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Stage,
    Prod,
}

impl Environment {
    /// The canonical short tag used in identities and hostnames
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Stage => "stage",
            Environment::Prod => "prod",
        }
    }

    /// Environment suffix rendered with an explicit separator.
    ///
    /// Production is the unsuffixed baseline and always yields an empty
    /// string; every other environment yields `<separator><tag>`.
    ///
    /// ```
    /// use edgekit::config::Environment;
    ///
    /// assert_eq!(Environment::Prod.suffix("."), "");
    /// assert_eq!(Environment::Stage.suffix("."), ".stage");
    /// assert_eq!(Environment::Dev.suffix("-"), "-dev");
    /// ```
    pub fn suffix(&self, separator: &str) -> String {
        match self {
            Environment::Prod => String::new(),
            other => format!("{}{}", separator, other.as_str()),
        }
    }

    /// Whether this is the production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Prod)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dev" => Ok(Environment::Dev),
            "stage" => Ok(Environment::Stage),
            // Deployment stacks historically name the production branch
            // "master"; accept it alongside the canonical tags.
            "prod" | "production" | "master" => Ok(Environment::Prod),
            other => Err(Error::config(format!("Unknown environment '{}'", other))),
        }
    }
}

/// Target cloud project configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProjectConfig {
    /// The cloud project ID, e.g. `my-project-123456`
    #[validate(length(min = 1, message = "Project ID cannot be empty"))]
    pub project: String,

    /// The default region, e.g. `us-central1`
    #[validate(length(min = 1, message = "Region cannot be empty"))]
    pub region: String,
}

/// Identification of the deployment package driving this run; folded into
/// the description stamped on every managed object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInfo {
    pub version: String,
    pub description: String,
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self {
            version: crate::VERSION.to_string(),
            description: crate::APP_NAME.to_string(),
        }
    }
}

/// Application configuration for a provisioning run
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// The environment this run provisions for
    pub environment: Environment,

    /// Target project settings
    #[validate(nested)]
    pub project: ProjectConfig,

    /// Deployment package identification
    pub package: PackageInfo,
}

impl AppConfig {
    /// Build a configuration from explicit values
    pub fn new(environment: Environment, project: ProjectConfig) -> Self {
        Self { environment, project, package: PackageInfo::default() }
    }

    /// Create configuration from environment variables (`EDGEKIT_ENV`,
    /// `EDGEKIT_PROJECT`, `EDGEKIT_REGION`).
    pub fn from_env() -> Result<Self> {
        let environment = std::env::var("EDGEKIT_ENV")
            .map_err(|_| Error::config("EDGEKIT_ENV is not set"))?
            .parse()?;
        let project = std::env::var("EDGEKIT_PROJECT")
            .map_err(|_| Error::config("EDGEKIT_PROJECT is not set"))?;
        let region =
            std::env::var("EDGEKIT_REGION").unwrap_or_else(|_| "us-central1".to_string());

        let config =
            Self::new(environment, ProjectConfig { project, region });
        config.validate()?;
        Ok(config)
    }

    /// The description stamped on every object this crate declares, so the
    /// managing package and version are visible in the cloud console.
    pub fn managed_by_description(&self) -> String {
        format!("Managed by edgekit [{}/{}]", self.package.description, self.package.version)
    }
}
