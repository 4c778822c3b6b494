//! DNS zone domain types
//!
//! A [`Zone`] identifies a DNS-managed domain together with its
//! hosting-account linkage. Zones are caller-supplied inputs; the actual
//! record upsertion happens behind the [`DnsProvider`](crate::provider::DnsProvider)
//! seam.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hosting-account linkage for a zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneAccount {
    /// The hosting provider's zone identifier
    pub zone_id: String,

    /// The hosting provider's account identifier
    pub account_id: String,
}

/// Supported DNS record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Cname,
    Txt,
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DnsRecordType::A => write!(f, "A"),
            DnsRecordType::Cname => write!(f, "CNAME"),
            DnsRecordType::Txt => write!(f, "TXT"),
        }
    }
}

/// A static record declared on the zone itself (MX, SPF, verification
/// records and the like), applied alongside the derived edge records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRecord {
    /// Record name relative to the zone; `"@"` denotes the apex
    pub name: String,
    pub record_type: DnsRecordType,
    pub value: String,
}

/// A DNS-managed domain plus its hosting-account linkage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    /// The zone's domain name, e.g. `example.com`
    pub name: String,

    /// Hosting-account linkage
    pub account: ZoneAccount,

    /// Static records carried by the zone
    #[serde(default)]
    pub records: Vec<ZoneRecord>,
}

impl Zone {
    /// Create a zone with no static records
    pub fn new(name: impl Into<String>, account: ZoneAccount) -> Self {
        Self { name: name.into(), account, records: Vec::new() }
    }

    /// Attach a static record to the zone
    pub fn with_record(mut self, record: ZoneRecord) -> Self {
        self.records.push(record);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> ZoneAccount {
        ZoneAccount { zone_id: "zone-1".into(), account_id: "acct-1".into() }
    }

    #[test]
    fn record_type_display_matches_wire_names() {
        assert_eq!(DnsRecordType::A.to_string(), "A");
        assert_eq!(DnsRecordType::Cname.to_string(), "CNAME");
        assert_eq!(DnsRecordType::Txt.to_string(), "TXT");
    }

    #[test]
    fn record_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&DnsRecordType::Cname).unwrap(), "\"CNAME\"");
    }

    #[test]
    fn zone_builder_collects_records() {
        let zone = Zone::new("example.com", account()).with_record(ZoneRecord {
            name: "@".into(),
            record_type: DnsRecordType::Txt,
            value: "v=spf1 -all".into(),
        });
        assert_eq!(zone.records.len(), 1);
        assert_eq!(zone.records[0].name, "@");
    }
}
