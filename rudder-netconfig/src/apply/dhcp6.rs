//! DHCPv6 delegated-prefix application.

use crate::config::{DelegatedPrefix, Dhcp6Lease};
use crate::error::Result;
use crate::kernel::Kernel;
use log::info;
use std::net::{IpAddr, Ipv6Addr};
use std::path::Path;

/// Install one router address per delegated prefix on the uplink.
///
/// Addresses are added, not replaced; re-applying the same prefix fails.
/// The first failed prefix aborts the remaining ones.
pub async fn apply<K: Kernel>(kernel: &K, iface: &str, dir: &Path) -> Result<()> {
    let lease = Dhcp6Lease::load(dir)?;

    let link = kernel.link_by_name(iface).await?;

    for prefix in &lease.prefixes {
        let (addr, prefix_len) = router_address(prefix);
        kernel
            .add_address(link.index, IpAddr::V6(addr), prefix_len)
            .await?;
        info!("dhcp6: {addr}/{prefix_len} on {iface}");
    }

    Ok(())
}

/// The router's own address within a delegation: host id 1, e.g.
/// `2001:db8::1` for prefix `2001:db8::/48`. Prefixes wider than /64 use
/// their first /64 sub-block.
fn router_address(prefix: &DelegatedPrefix) -> (Ipv6Addr, u8) {
    let mut octets = prefix.ip.octets();
    octets[15] = 1;
    let prefix_len = if prefix.mask < 64 { 64 } else { prefix.mask };
    (Ipv6Addr::from(octets), prefix_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefix(ip: &str, mask: u8) -> DelegatedPrefix {
        DelegatedPrefix {
            ip: ip.parse().unwrap(),
            mask,
        }
    }

    #[test]
    fn test_router_address_widens_short_prefix() {
        let (addr, prefix_len) = router_address(&prefix("2001:db8::", 48));
        assert_eq!(addr, "2001:db8::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(prefix_len, 64);
    }

    #[test]
    fn test_router_address_keeps_64() {
        let (addr, prefix_len) = router_address(&prefix("2001:db8:1::", 64));
        assert_eq!(addr, "2001:db8:1::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(prefix_len, 64);
    }

    #[test]
    fn test_router_address_keeps_longer_prefix() {
        let (addr, prefix_len) = router_address(&prefix("2001:db8:2::", 72));
        assert_eq!(addr, "2001:db8:2::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(prefix_len, 72);
    }

    #[test]
    fn test_router_address_overwrites_last_byte() {
        // Host id is forced to 1 even if the base address carries one.
        let (addr, _) = router_address(&prefix("2001:db8::ff", 56));
        assert_eq!(addr, "2001:db8::1".parse::<Ipv6Addr>().unwrap());
    }
}
