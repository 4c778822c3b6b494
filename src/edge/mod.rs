//! Edge endpoint provisioning
//!
//! The public entry points for standing up HTTP(S) edge infrastructure:
//! certificate provisioning per hostname ([`certificates`]) and the full
//! endpoint assembly wiring route table, certificate map, proxies, and
//! forwarding rules together ([`endpoint`]).
//!
//! The pipeline is a single asynchronous flow. Per-hostname certificate and
//! DNS work is issued and awaited sequentially, in input order — hostname
//! counts are tens, not thousands, and the infrastructure provider owns the
//! actual network parallelism. Any step failure aborts the assembly; the
//! caller re-runs to retry, which is safe because every step is idempotent.

pub mod certificates;
pub mod endpoint;

pub use certificates::{ensure_certificate, CertificateBinding, CertificateMapHandle};
pub use endpoint::{provision_edge_endpoint, EdgeEndpoint, EdgeEndpointArgs};

/// Default endpoint id; additional independent endpoints pick their own
pub const DEFAULT_ENDPOINT_ID: &str = "primary";

/// Resource location for all edge objects; the external managed load
/// balancer is a global product.
pub(crate) const GLOBAL_LOCATION: &str = "global";
