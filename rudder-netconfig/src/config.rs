//! On-disk configuration inputs.
//!
//! All three files are produced by external collaborators (the planner and
//! the DHCP clients) and read exactly once per apply invocation.

use crate::error::{ParseError, Result};
use serde::Deserialize;
use std::fs;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::path::Path;

/// One entry of `interfaces.json`. The hardware address is the join key
/// against the live interface set; index and name may change across boots.
#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceDetails {
    pub hardware_addr: String, // e.g. dc:9b:9c:ee:72:fd
    pub name: String,          // e.g. uplink0, or lan0
    #[serde(default)]
    pub addr: Option<String>, // e.g. 192.168.42.1/24
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceConfig {
    pub interfaces: Vec<InterfaceDetails>,
}

impl InterfaceConfig {
    pub fn load(dir: &Path) -> Result<Self> {
        let b = fs::read(dir.join("interfaces.json"))?;
        Ok(serde_json::from_slice(&b)?)
    }
}

/// DHCPv4 lease as written by the DHCPv4 client.
#[derive(Debug, Clone, Deserialize)]
pub struct Dhcp4Lease {
    pub client_ip: Ipv4Addr,
    pub subnet_mask: String,
    pub router: Ipv4Addr,
}

impl Dhcp4Lease {
    pub fn load(dir: &Path) -> Result<Self> {
        let b = fs::read(dir.join("dhcp4/wire/lease.json"))?;
        Ok(serde_json::from_slice(&b)?)
    }
}

/// IPv6 prefix delegated by the DHCPv6 server.
#[derive(Debug, Clone, Deserialize)]
pub struct DelegatedPrefix {
    pub ip: Ipv6Addr,
    pub mask: u8,
}

/// DHCPv6 lease as written by the DHCPv6 client.
#[derive(Debug, Clone, Deserialize)]
pub struct Dhcp6Lease {
    pub prefixes: Vec<DelegatedPrefix>,
}

impl Dhcp6Lease {
    pub fn load(dir: &Path) -> Result<Self> {
        let b = fs::read(dir.join("dhcp6/wire/lease.json"))?;
        Ok(serde_json::from_slice(&b)?)
    }
}

/// Decode a dotted-decimal subnet mask (e.g. `255.255.255.0`) into a prefix
/// length.
///
/// The prefix length is the count of leading one-bits. A non-contiguous mask
/// is not rejected; it yields the leading ones only (`255.0.255.0` -> 8).
pub fn subnet_mask_size(mask: &str) -> std::result::Result<u8, ParseError> {
    let parts: Vec<&str> = mask.split('.').collect();
    if parts.len() != 4 {
        return Err(ParseError::SubnetMask {
            mask: mask.to_string(),
            reason: format!("unexpected number of parts: got {}, want 4", parts.len()),
        });
    }
    let mut octets = [0u8; 4];
    for (idx, part) in parts.iter().enumerate() {
        octets[idx] = part.parse().map_err(|_| ParseError::SubnetMask {
            mask: mask.to_string(),
            reason: format!("octet {part:?} does not fit in 8 bits"),
        })?;
    }
    Ok(u32::from_be_bytes(octets).leading_ones() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_mask_size() {
        assert_eq!(subnet_mask_size("255.255.255.0").unwrap(), 24);
        assert_eq!(subnet_mask_size("255.255.0.0").unwrap(), 16);
        assert_eq!(subnet_mask_size("255.255.255.255").unwrap(), 32);
        assert_eq!(subnet_mask_size("0.0.0.0").unwrap(), 0);
    }

    #[test]
    fn test_subnet_mask_size_wrong_part_count() {
        assert!(subnet_mask_size("255.255.255").is_err());
        assert!(subnet_mask_size("255.255.255.0.0").is_err());
    }

    #[test]
    fn test_subnet_mask_size_octet_overflow() {
        assert!(subnet_mask_size("256.0.0.0").is_err());
        assert!(subnet_mask_size("255.-1.0.0").is_err());
    }

    #[test]
    fn test_subnet_mask_size_non_contiguous() {
        // Leading ones only; the hole is not an error.
        assert_eq!(subnet_mask_size("255.0.255.0").unwrap(), 8);
        assert_eq!(subnet_mask_size("255.255.0.255").unwrap(), 16);
    }

    #[test]
    fn test_interface_config_parse() {
        let cfg: InterfaceConfig = serde_json::from_str(
            r#"{"interfaces": [
                {"hardware_addr": "dc:9b:9c:ee:72:fd", "name": "uplink0"},
                {"hardware_addr": "02:73:53:00:ca:fe", "name": "lan0", "addr": "192.168.42.1/24"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(cfg.interfaces.len(), 2);
        assert_eq!(cfg.interfaces[0].name, "uplink0");
        assert_eq!(cfg.interfaces[0].addr, None);
        assert_eq!(cfg.interfaces[1].addr.as_deref(), Some("192.168.42.1/24"));
    }

    #[test]
    fn test_dhcp4_lease_parse() {
        let lease: Dhcp4Lease = serde_json::from_str(
            r#"{"client_ip": "85.195.207.62", "subnet_mask": "255.255.255.0", "router": "85.195.207.1"}"#,
        )
        .unwrap();

        assert_eq!(lease.client_ip, "85.195.207.62".parse::<Ipv4Addr>().unwrap());
        assert_eq!(lease.subnet_mask, "255.255.255.0");
        assert_eq!(lease.router, "85.195.207.1".parse::<Ipv4Addr>().unwrap());
    }

    #[test]
    fn test_dhcp6_lease_parse() {
        let lease: Dhcp6Lease =
            serde_json::from_str(r#"{"prefixes": [{"ip": "2001:db8::", "mask": 48}]}"#).unwrap();

        assert_eq!(lease.prefixes.len(), 1);
        assert_eq!(lease.prefixes[0].ip, "2001:db8::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(lease.prefixes[0].mask, 48);
    }
}
