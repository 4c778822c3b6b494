//! # Observability Infrastructure
//!
//! Structured logging setup for provisioning runs. Built on the tracing
//! ecosystem; the declaration and DNS paths emit spans and events that the
//! subscriber configured here renders as text or JSON.

pub mod logging;

pub use logging::{init_tracing, LoggingConfig};
