//! The apply pipeline: sequencing and failure policy.

pub mod dhcp4;
pub mod dhcp6;
pub mod firewall;
pub mod interfaces;
pub mod sysctl;

use crate::error::{Error, Result};
use crate::kernel::{Kernel, NetlinkBackend};
use firewall::NatRuleset;
use log::warn;
use std::path::Path;

/// Apply the computed configuration under `dir` to the live network stack.
///
/// `iface` names the uplink interface the lease appliers target.
pub async fn apply(iface: &str, dir: &Path) -> Result<()> {
    let kernel = NetlinkBackend::new().await?;
    run(&kernel, iface, dir, NatRuleset::masquerade()).await
}

/// The pipeline against an explicit backend and ruleset.
///
/// Interface setup and firewall installation must succeed; lease
/// application and sysctl tuning degrade gracefully, with the first
/// degradation surfaced to the caller unless a firewall failure masks it.
pub async fn run<K: Kernel>(
    kernel: &K,
    iface: &str,
    dir: &Path,
    rules: &NatRuleset,
) -> Result<()> {
    interfaces::apply(kernel, dir).await.map_err(|e| Error::Fatal {
        step: "interfaces",
        source: Box::new(e),
    })?;

    let mut first_err: Option<Error> = None;

    if let Err(e) = dhcp4::apply(kernel, iface, dir).await {
        warn!("cannot apply dhcp4 lease: {e}");
        first_err.get_or_insert(e);
    }

    if let Err(e) = dhcp6::apply(kernel, iface, dir).await {
        warn!("cannot apply dhcp6 lease: {e}");
        first_err.get_or_insert(e);
    }

    if let Err(e) = sysctl::apply(kernel) {
        warn!("cannot apply sysctl config: {e}");
        first_err.get_or_insert(e);
    }

    firewall::apply(kernel, rules).map_err(|e| Error::Fatal {
        step: "firewall",
        source: Box::new(e),
    })?;

    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
