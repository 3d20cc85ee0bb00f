//! rudder-netconfig - applies computed router network configuration.
//!
//! The planner and the DHCP clients leave their results as JSON files under
//! a configuration directory; this crate is the apply phase that pushes
//! them into the kernel:
//!
//! - **Interfaces**: rename, bring up and address physical links, joined to
//!   their configuration by hardware address.
//! - **DHCPv4**: install the leased address, a host route to the gateway
//!   and the default route.
//! - **DHCPv6**: install one router address per delegated prefix.
//! - **Sysctls**: enable IPv4/IPv6 forwarding, keep accepting router
//!   advertisements on the uplink.
//! - **Firewall**: install the NAT masquerade ruleset for outbound traffic.
//!
//! Every operation is attempted exactly once. Interface setup and firewall
//! installation must succeed; the lease and sysctl steps degrade
//! gracefully.

pub mod apply;
pub mod config;
pub mod error;
pub mod kernel;
pub mod test_util;

pub use apply::apply;
pub use error::{Error, Result};
