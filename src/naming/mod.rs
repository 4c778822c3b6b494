//! # Resource Identity Service
//!
//! Derives deterministic, environment-qualified identities for every object
//! this crate declares. Two flavors exist:
//!
//! - the *hierarchical* form (`net/gcp/cert/api.example.com:stage`) used for
//!   internal bookkeeping, where segments join with `/` and the environment
//!   is appended after `:`;
//! - the *flat* form (`urlmap-primary-stage`) used where target naming rules
//!   forbid `/` and `:`, joining with `-` throughout.
//!
//! Production is the unsuffixed baseline: no environment qualifier is ever
//! appended. Separators are explicit constructor parameters rather than
//! module-level constants, so embedders with different naming rules can
//! supply their own.
//!
//! Identity derivation is pure: the same input always yields a byte-identical
//! string.

use crate::config::Environment;
use crate::errors::{Error, Result};

/// Separators used by the hierarchical identity form
const HIERARCHICAL_SEGMENT_SEPARATOR: &str = "/";
const HIERARCHICAL_ENVIRONMENT_SEPARATOR: &str = ":";

/// Separators used by the flat identity form
const FLAT_SEPARATOR: &str = "-";

/// Pure identity derivation for declared objects.
#[derive(Debug, Clone)]
pub struct ResourceNamer {
    environment: Environment,
    segment_separator: String,
    environment_separator: String,
}

impl ResourceNamer {
    /// The hierarchical form: segments joined by `/`, environment after `:`.
    pub fn hierarchical(environment: Environment) -> Self {
        Self::with_separators(
            environment,
            HIERARCHICAL_SEGMENT_SEPARATOR,
            HIERARCHICAL_ENVIRONMENT_SEPARATOR,
        )
    }

    /// The flat form: everything joined by `-`, safe for target naming rules
    /// that forbid `/` and `:`.
    pub fn flat(environment: Environment) -> Self {
        Self::with_separators(environment, FLAT_SEPARATOR, FLAT_SEPARATOR)
    }

    /// Custom separators for embedders with their own naming rules
    pub fn with_separators(
        environment: Environment,
        segment_separator: &str,
        environment_separator: &str,
    ) -> Self {
        Self {
            environment,
            segment_separator: segment_separator.to_string(),
            environment_separator: environment_separator.to_string(),
        }
    }

    /// The environment this namer qualifies identities with
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Derive the identity for an ordered list of name segments.
    ///
    /// ```
    /// use edgekit::config::Environment;
    /// use edgekit::naming::ResourceNamer;
    ///
    /// let rn = ResourceNamer::hierarchical(Environment::Stage);
    /// assert_eq!(rn.name(&["net", "gcp", "ip", "primary"]), "net/gcp/ip/primary:stage");
    ///
    /// let srn = ResourceNamer::flat(Environment::Prod);
    /// assert_eq!(srn.name(&["urlmap", "primary"]), "urlmap-primary");
    /// ```
    pub fn name(&self, segments: &[&str]) -> String {
        let mut computed = segments.join(&self.segment_separator);
        computed.push_str(&self.environment.suffix(&self.environment_separator));
        computed
    }

    /// Derive an identity scoped under an existing parent identity.
    ///
    /// Returns a typed `Config` error when the parent is missing, so callers
    /// can distinguish the fatal misconfiguration from recoverable
    /// conditions instead of unwinding.
    pub fn child(&self, parent: &str, segment: &str) -> Result<String> {
        if parent.is_empty() {
            return Err(Error::config(format!(
                "Cannot derive identity for '{}': no parent specified",
                segment
            )));
        }
        Ok(format!("{}{}{}", parent, self.segment_separator, segment))
    }
}

/// Rewrite a dotted hostname into a form accepted by resource-ID naming
/// rules (`api.example.com` → `api-example-com`).
pub fn sanitize_hostname(hostname: &str) -> String {
    hostname.replace('.', "-")
}

/// Convert a camelCase or whitespace-separated name to dash-case
pub fn dash_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_lower = false;
    for ch in input.chars() {
        if ch.is_whitespace() {
            out.push('-');
            previous_lower = false;
        } else if ch.is_uppercase() {
            if previous_lower {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            previous_lower = false;
        } else {
            out.push(ch);
            previous_lower = ch.is_lowercase();
        }
    }
    out
}

/// Expand a dash-case name into capitalized words (`web-app` → `Web App`),
/// used for human-facing display names.
pub fn dash_to_title(input: &str) -> String {
    input
        .to_lowercase()
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
