//! Forwarding and router-advertisement sysctls.

use crate::error::Result;
use crate::kernel::Kernel;

// TODO: derive the accept_ra interface from the uplink name passed to
// apply() instead of this literal.
const UPLINK: &str = "uplink0";

/// Enable IPv4/IPv6 forwarding and keep accepting router advertisements on
/// the uplink despite forwarding (mode 2). Stops at the first failed write.
pub fn apply<K: Kernel>(kernel: &K) -> Result<()> {
    kernel.write_sysctl("/proc/sys/net/ipv4/ip_forward", "1")?;

    kernel.write_sysctl("/proc/sys/net/ipv6/conf/all/forwarding", "1")?;

    kernel.write_sysctl(&format!("/proc/sys/net/ipv6/conf/{UPLINK}/accept_ra"), "2")?;

    Ok(())
}
