//! # Edgekit
//!
//! Edgekit is a declarative edge-provisioning library: it composes hostnames,
//! routes, managed certificates, and global load-balancer frontends into
//! resource declarations handed to pluggable infrastructure and DNS
//! providers.
//!
//! ## Architecture
//!
//! The library is organized in layers:
//!
//! ```text
//! Edge Assembly → Route Composition → Resource Identity
//!       ↓                ↓                  ↓
//! Provider Seams    Domain Model    Naming / Environment
//! ```
//!
//! ## Core Components
//!
//! - **Naming**: environment-scoped resource identities and hostnames, with
//!   production as the unsuffixed baseline
//! - **Route Composition**: host rules and path matchers derived from service
//!   and redirect declarations across DNS zones
//! - **Edge Assembly**: certificate map, per-hostname certificates and DNS
//!   records, URL maps, proxies, and forwarding rules in dependency order
//! - **Providers**: trait seams over the target platforms, with an in-memory
//!   recorder for tests
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use edgekit::cloud::provision_public_ip;
//! use edgekit::{AppConfig, ProvisioningContext, Result};
//!
//! # async fn run(
//! #     infra: Arc<dyn edgekit::provider::InfrastructureProvider>,
//! #     dns: Arc<dyn edgekit::provider::DnsProvider>,
//! #     zone: edgekit::domain::Zone,
//! # ) -> Result<()> {
//! let config = AppConfig::from_env()?;
//! let ctx = ProvisioningContext::new(config, infra, dns);
//! let ip = provision_public_ip(
//!     edgekit::cloud::PublicIpArgs::new("primary", zone),
//!     &ctx,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod cloud;
pub mod config;
pub mod context;
pub mod domain;
pub mod edge;
pub mod errors;
pub mod naming;
pub mod observability;
pub mod provider;

// Re-export commonly used types and traits
pub use config::{AppConfig, Environment};
pub use context::ProvisioningContext;
pub use errors::{Error, Result};
pub use naming::ResourceNamer;
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
