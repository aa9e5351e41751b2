// IP Info Bar - Network Facts
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Network facts reported by the data provider.
//!
//! The provider prints one JSON object per invocation. Every field is
//! optional; a missing field means the fact is unknown, not that the
//! provider failed. Empty strings and `null` are treated as absent.

use serde::{Deserialize, Deserializer};

/// An address bound to a LAN interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InterfaceAddress {
    /// Interface name (e.g., "eth0", "wlp2s0").
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interface: String,

    /// IPv4 or IPv6 address.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,

    /// Hardware MAC address of the interface.
    #[serde(default, deserialize_with = "non_empty")]
    pub mac: Option<String>,
}

impl InterfaceAddress {
    pub fn new(interface: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            address: address.into(),
            mac: None,
        }
    }

    pub fn with_mac(mut self, mac: impl Into<String>) -> Self {
        self.mac = Some(mac.into());
        self
    }

    /// Whether an address was actually reported.
    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

/// Address of a VPN tunnel interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TunnelAddress {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interface: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub address: String,
}

impl TunnelAddress {
    pub fn new(interface: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            address: address.into(),
        }
    }

    pub fn has_address(&self) -> bool {
        !self.address.is_empty()
    }
}

/// Direction of the SSH sessions currently established on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SshDirection {
    /// This host is connected to a remote SSH server.
    Outgoing,
    /// A remote client is connected to this host.
    Incoming,
    /// Both outgoing and incoming sessions exist.
    Multiple,
}

impl SshDirection {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Outgoing => "Outgoing",
            Self::Incoming => "Incoming",
            Self::Multiple => "Multiple",
        }
    }
}

/// Snapshot of the host's network identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NetworkFacts {
    #[serde(default)]
    pub lan_ip4: Option<InterfaceAddress>,

    #[serde(default)]
    pub lan_ip6: Option<InterfaceAddress>,

    /// Public IPv4 address as seen from the internet.
    #[serde(default, deserialize_with = "non_empty")]
    pub wan_ip4: Option<String>,

    #[serde(default, rename = "tun0_vpn", alias = "tun_vpn")]
    pub tun_vpn: Option<TunnelAddress>,

    #[serde(default, deserialize_with = "null_as_false")]
    pub has_remote_ssh: bool,

    #[serde(default, deserialize_with = "null_as_false")]
    pub has_incoming_ssh: bool,
}

impl NetworkFacts {
    /// Collapse the two SSH flags into a single direction.
    pub fn ssh_direction(&self) -> Option<SshDirection> {
        match (self.has_remote_ssh, self.has_incoming_ssh) {
            (true, true) => Some(SshDirection::Multiple),
            (true, false) => Some(SshDirection::Outgoing),
            (false, true) => Some(SshDirection::Incoming),
            (false, false) => None,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()))
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record() {
        let json = r#"{
            "tun0_vpn": {"address": "10.8.0.2", "interface": "tun0", "mac": ""},
            "lan_ip4": {"address": "192.168.1.5", "interface": "eth0", "mac": "aa:bb:cc:dd:ee:ff"},
            "lan_ip6": {"address": "2001:db8::5", "interface": "eth0", "mac": ""},
            "wan_ip4": "203.0.113.7",
            "detect_vpn": true,
            "has_remote_ssh": true,
            "has_incoming_ssh": false
        }"#;
        let facts: NetworkFacts = serde_json::from_str(json).unwrap();

        assert_eq!(
            facts.lan_ip4,
            Some(InterfaceAddress::new("eth0", "192.168.1.5").with_mac("aa:bb:cc:dd:ee:ff"))
        );
        assert_eq!(facts.lan_ip6, Some(InterfaceAddress::new("eth0", "2001:db8::5")));
        assert_eq!(facts.tun_vpn, Some(TunnelAddress::new("tun0", "10.8.0.2")));
        assert_eq!(facts.wan_ip4.as_deref(), Some("203.0.113.7"));
        assert_eq!(facts.ssh_direction(), Some(SshDirection::Outgoing));
    }

    #[test]
    fn test_missing_and_null_fields_are_absent() {
        let json = r#"{"lan_ip4": null, "wan_ip4": "", "has_remote_ssh": null}"#;
        let facts: NetworkFacts = serde_json::from_str(json).unwrap();
        assert_eq!(facts, NetworkFacts::default());
        assert_eq!(facts.ssh_direction(), None);
    }

    #[test]
    fn test_tun_vpn_alias() {
        let facts: NetworkFacts =
            serde_json::from_str(r#"{"tun_vpn": {"interface": "wg0", "address": "10.0.0.1"}}"#)
                .unwrap();
        assert_eq!(facts.tun_vpn, Some(TunnelAddress::new("wg0", "10.0.0.1")));
    }

    #[test]
    fn test_ssh_direction() {
        let mut facts = NetworkFacts {
            has_incoming_ssh: true,
            ..Default::default()
        };
        assert_eq!(facts.ssh_direction(), Some(SshDirection::Incoming));
        facts.has_remote_ssh = true;
        assert_eq!(facts.ssh_direction(), Some(SshDirection::Multiple));
        assert_eq!(SshDirection::Multiple.display_name(), "Multiple");
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        assert!(serde_json::from_str::<NetworkFacts>(r#"{"lan_ip4": 42}"#).is_err());
        assert!(serde_json::from_str::<NetworkFacts>(r#"[1, 2]"#).is_err());
    }
}
