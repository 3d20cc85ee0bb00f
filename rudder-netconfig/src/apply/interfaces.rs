//! Interface naming and addressing.

use crate::config::InterfaceConfig;
use crate::error::{ParseError, Result};
use crate::kernel::{Kernel, mac_to_string};
use ipnet::IpNet;
use log::info;
use std::collections::HashMap;
use std::path::Path;

/// Apply `interfaces.json` to the live links.
///
/// Entries are joined against live links by hardware address; a link with
/// no entry is left untouched. The first failed operation aborts the
/// remaining links.
pub async fn apply<K: Kernel>(kernel: &K, dir: &Path) -> Result<()> {
    let cfg = InterfaceConfig::load(dir)?;

    let by_hardware_addr: HashMap<String, _> = cfg
        .interfaces
        .iter()
        .map(|details| (details.hardware_addr.to_ascii_lowercase(), details))
        .collect();

    for link in kernel.links().await? {
        let Some(mac) = link.mac else {
            continue;
        };
        let Some(details) = by_hardware_addr.get(&mac_to_string(mac)) else {
            continue;
        };

        info!("applying interface details {details:?}");
        kernel.console(&format!("apply {details:?}\n"));

        if link.name != details.name {
            kernel.set_link_name(link.index, &details.name).await?;
        }

        if !link.oper_up {
            // Addressing a down interface is not guaranteed to stick; the
            // link must come up after renaming and before any address work.
            kernel.set_link_up(link.index).await?;
        }

        if let Some(addr) = &details.addr {
            let net: IpNet = addr.parse().map_err(|e| ParseError::Addr {
                addr: addr.clone(),
                reason: format!("{e}"),
            })?;
            kernel
                .replace_address(link.index, net.addr(), net.prefix_len())
                .await?;
        }
    }

    Ok(())
}
