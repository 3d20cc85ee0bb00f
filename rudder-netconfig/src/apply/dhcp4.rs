//! DHCPv4 lease application.

use crate::config::{Dhcp4Lease, subnet_mask_size};
use crate::error::Result;
use crate::kernel::Kernel;
use log::info;
use std::net::IpAddr;
use std::path::Path;

/// Install the leased address and routes on the uplink.
///
/// Already-applied effects are not rolled back on failure.
pub async fn apply<K: Kernel>(kernel: &K, iface: &str, dir: &Path) -> Result<()> {
    let lease = Dhcp4Lease::load(dir)?;
    let prefix_len = subnet_mask_size(&lease.subnet_mask)?;

    let link = kernel.link_by_name(iface).await?;

    kernel
        .add_address(link.index, IpAddr::V4(lease.client_ip), prefix_len)
        .await?;

    // The gateway may live outside the leased subnet; a link-scoped host
    // route makes it reachable before the default route points at it.
    kernel
        .add_link_route_v4(link.index, lease.router, lease.client_ip)
        .await?;

    kernel
        .add_default_route_v4(link.index, lease.router, lease.client_ip)
        .await?;

    info!(
        "dhcp4: {}/{} via {} on {}",
        lease.client_ip, prefix_len, lease.router, iface
    );

    Ok(())
}
