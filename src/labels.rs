// IP Info Bar - Label Builder
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Turns network facts into the ordered list of panel labels.
//!
//! Categories always appear in the same order (LAN IPv4, WAN, LAN IPv6,
//! VPN, SSH); the view mode only changes how each one is formatted. The
//! order is also the cycle order.

use crate::models::{InterfaceAddress, NetworkFacts, ViewMode};

/// Builds display labels from network facts.
pub struct LabelBuilder;

impl LabelBuilder {
    /// Build the label list for the given facts and view mode.
    pub fn build(facts: &NetworkFacts, mode: ViewMode) -> Vec<String> {
        let mut labels = Vec::new();

        if let Some(lan) = facts.lan_ip4.as_ref().filter(|l| l.has_address()) {
            Self::push_lan(&mut labels, lan, mode, "IPv4", "MAC_IP4");
        }

        if let Some(wan) = &facts.wan_ip4 {
            labels.push(format!("WAN: {}", wan));
        }

        if let Some(lan) = facts.lan_ip6.as_ref().filter(|l| l.has_address()) {
            Self::push_lan(&mut labels, lan, mode, "IPv6", "MAC_IP6");
        }

        if let Some(vpn) = facts.tun_vpn.as_ref().filter(|v| v.has_address()) {
            labels.push(match mode {
                ViewMode::Detailed => format!("{}: {}", vpn.interface, vpn.address),
                ViewMode::Simple => format!("VPN: {}", vpn.address),
            });
        }

        if let Some(direction) = facts.ssh_direction() {
            labels.push(format!("SSH: {}", direction.display_name()));
        }

        labels
    }

    fn push_lan(
        labels: &mut Vec<String>,
        lan: &InterfaceAddress,
        mode: ViewMode,
        family: &str,
        mac_prefix: &str,
    ) {
        match mode {
            ViewMode::Detailed => {
                labels.push(format!("{}: {}", lan.interface, lan.address));
                if let Some(mac) = &lan.mac {
                    labels.push(format!("{}: {}", mac_prefix, mac));
                }
            }
            ViewMode::Simple => {
                labels.push(format!("{}: {}", family, lan.address));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TunnelAddress;

    fn everything() -> NetworkFacts {
        NetworkFacts {
            lan_ip4: Some(InterfaceAddress::new("eth0", "192.168.1.5").with_mac("aa:bb:cc:dd:ee:ff")),
            lan_ip6: Some(InterfaceAddress::new("wlan0", "2001:db8::5").with_mac("11:22:33:44:55:66")),
            wan_ip4: Some("203.0.113.7".to_string()),
            tun_vpn: Some(TunnelAddress::new("tun0", "10.8.0.2")),
            has_remote_ssh: true,
            has_incoming_ssh: true,
        }
    }

    fn eth0_with_outgoing_ssh() -> NetworkFacts {
        NetworkFacts {
            lan_ip4: Some(InterfaceAddress::new("eth0", "192.168.1.5")),
            has_remote_ssh: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_facts_give_no_labels() {
        assert!(LabelBuilder::build(&NetworkFacts::default(), ViewMode::Simple).is_empty());
        assert!(LabelBuilder::build(&NetworkFacts::default(), ViewMode::Detailed).is_empty());
    }

    #[test]
    fn test_simple_view() {
        assert_eq!(
            LabelBuilder::build(&eth0_with_outgoing_ssh(), ViewMode::Simple),
            vec!["IPv4: 192.168.1.5", "SSH: Outgoing"]
        );
    }

    #[test]
    fn test_detailed_view() {
        assert_eq!(
            LabelBuilder::build(&eth0_with_outgoing_ssh(), ViewMode::Detailed),
            vec!["eth0: 192.168.1.5", "SSH: Outgoing"]
        );
    }

    #[test]
    fn test_ssh_only_multiple() {
        let facts = NetworkFacts {
            has_remote_ssh: true,
            has_incoming_ssh: true,
            ..Default::default()
        };
        assert_eq!(LabelBuilder::build(&facts, ViewMode::Simple), vec!["SSH: Multiple"]);
    }

    #[test]
    fn test_ssh_only_incoming() {
        let facts = NetworkFacts {
            has_incoming_ssh: true,
            ..Default::default()
        };
        assert_eq!(LabelBuilder::build(&facts, ViewMode::Detailed), vec!["SSH: Incoming"]);
    }

    #[test]
    fn test_full_simple_order() {
        assert_eq!(
            LabelBuilder::build(&everything(), ViewMode::Simple),
            vec![
                "IPv4: 192.168.1.5",
                "WAN: 203.0.113.7",
                "IPv6: 2001:db8::5",
                "VPN: 10.8.0.2",
                "SSH: Multiple",
            ]
        );
    }

    #[test]
    fn test_full_detailed_order() {
        assert_eq!(
            LabelBuilder::build(&everything(), ViewMode::Detailed),
            vec![
                "eth0: 192.168.1.5",
                "MAC_IP4: aa:bb:cc:dd:ee:ff",
                "WAN: 203.0.113.7",
                "wlan0: 2001:db8::5",
                "MAC_IP6: 11:22:33:44:55:66",
                "tun0: 10.8.0.2",
                "SSH: Multiple",
            ]
        );
    }

    #[test]
    fn test_entries_without_address_are_skipped() {
        let facts = NetworkFacts {
            lan_ip4: Some(InterfaceAddress::new("eth0", "").with_mac("aa:bb:cc:dd:ee:ff")),
            tun_vpn: Some(TunnelAddress::new("tun0", "")),
            wan_ip4: Some("203.0.113.7".to_string()),
            ..Default::default()
        };
        assert_eq!(LabelBuilder::build(&facts, ViewMode::Detailed), vec!["WAN: 203.0.113.7"]);
    }

    #[test]
    fn test_category_order_is_mode_independent() {
        fn category(label: &str, mode: ViewMode) -> usize {
            match (mode, label.split(':').next().unwrap_or_default()) {
                (ViewMode::Simple, "IPv4") | (ViewMode::Detailed, "eth0" | "MAC_IP4") => 0,
                (_, "WAN") => 1,
                (ViewMode::Simple, "IPv6") | (ViewMode::Detailed, "wlan0" | "MAC_IP6") => 2,
                (ViewMode::Simple, "VPN") | (ViewMode::Detailed, "tun0") => 3,
                (_, "SSH") => 4,
                (_, other) => panic!("unexpected label prefix {}", other),
            }
        }

        let facts = everything();
        for mode in [ViewMode::Simple, ViewMode::Detailed] {
            let categories: Vec<usize> = LabelBuilder::build(&facts, mode)
                .iter()
                .map(|l| category(l, mode))
                .collect();
            let mut sorted = categories.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
            assert!(categories.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
