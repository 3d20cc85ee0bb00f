//! In-memory kernel backend for deterministic tests.
//!
//! [`FakeKernel`] records every mutation as an [`Op`], keeps link and
//! address state so renames and duplicate adds behave like the kernel, and
//! can inject a failure for any single named operation.

use crate::apply::firewall::NatRuleset;
use crate::error::NetworkError;
use crate::kernel::{Kernel, LinkInfo};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Mutex;

/// A recorded kernel mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    LinkSetName { index: u32, name: String },
    LinkSetUp { index: u32 },
    AddrReplace { index: u32, addr: IpAddr, prefix_len: u8 },
    AddrAdd { index: u32, addr: IpAddr, prefix_len: u8 },
    RouteAddLink { index: u32, dst: Ipv4Addr, src: Ipv4Addr },
    RouteAddDefault { index: u32, gateway: Ipv4Addr, src: Ipv4Addr },
    Sysctl { path: String, value: String },
    InstallNat,
}

#[derive(Default)]
struct State {
    links: Vec<LinkInfo>,
    addrs: HashSet<(u32, IpAddr, u8)>,
    ops: Vec<Op>,
    fail: HashSet<&'static str>,
    console: Vec<String>,
}

/// Fake implementation of [`Kernel`].
#[derive(Default)]
pub struct FakeKernel {
    state: Mutex<State>,
}

impl FakeKernel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a live link.
    pub fn add_link(&self, index: u32, name: &str, mac: [u8; 6], oper_up: bool) {
        self.state.lock().unwrap().links.push(LinkInfo {
            index,
            name: name.to_string(),
            mac: Some(mac),
            oper_up,
        });
    }

    /// Make the named operation fail. Names match the [`Op`] variants plus
    /// `LinkList` and `LinkByName`.
    pub fn fail_on(&self, op: &'static str) {
        self.state.lock().unwrap().fail.insert(op);
    }

    pub fn ops(&self) -> Vec<Op> {
        self.state.lock().unwrap().ops.clone()
    }

    pub fn console_lines(&self) -> Vec<String> {
        self.state.lock().unwrap().console.clone()
    }

    /// Current view of a link, if present.
    pub fn link(&self, name: &str) -> Option<LinkInfo> {
        self.state
            .lock()
            .unwrap()
            .links
            .iter()
            .find(|l| l.name == name)
            .cloned()
    }

    /// Addresses currently present on a link.
    pub fn addresses(&self, index: u32) -> Vec<(IpAddr, u8)> {
        let mut addrs: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .addrs
            .iter()
            .filter(|(i, _, _)| *i == index)
            .map(|(_, addr, prefix_len)| (*addr, *prefix_len))
            .collect();
        addrs.sort();
        addrs
    }

    fn check(&self, op: &'static str) -> Result<(), NetworkError> {
        if self.state.lock().unwrap().fail.contains(op) {
            return Err(NetworkError::Netlink {
                op: op.to_string(),
                msg: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn record(&self, op: Op) {
        self.state.lock().unwrap().ops.push(op);
    }
}

impl Kernel for FakeKernel {
    async fn links(&self) -> Result<Vec<LinkInfo>, NetworkError> {
        self.check("LinkList")?;
        Ok(self.state.lock().unwrap().links.clone())
    }

    async fn link_by_name(&self, name: &str) -> Result<LinkInfo, NetworkError> {
        self.check("LinkByName")?;
        self.link(name)
            .ok_or_else(|| NetworkError::LinkNotFound(name.to_string()))
    }

    async fn set_link_name(&self, index: u32, name: &str) -> Result<(), NetworkError> {
        self.check("LinkSetName")?;
        {
            let mut state = self.state.lock().unwrap();
            if let Some(link) = state.links.iter_mut().find(|l| l.index == index) {
                link.name = name.to_string();
            }
        }
        self.record(Op::LinkSetName {
            index,
            name: name.to_string(),
        });
        Ok(())
    }

    async fn set_link_up(&self, index: u32) -> Result<(), NetworkError> {
        self.check("LinkSetUp")?;
        {
            let mut state = self.state.lock().unwrap();
            if let Some(link) = state.links.iter_mut().find(|l| l.index == index) {
                link.oper_up = true;
            }
        }
        self.record(Op::LinkSetUp { index });
        Ok(())
    }

    async fn replace_address(
        &self,
        index: u32,
        addr: IpAddr,
        prefix_len: u8,
    ) -> Result<(), NetworkError> {
        self.check("AddrReplace")?;
        self.state
            .lock()
            .unwrap()
            .addrs
            .insert((index, addr, prefix_len));
        self.record(Op::AddrReplace {
            index,
            addr,
            prefix_len,
        });
        Ok(())
    }

    async fn add_address(
        &self,
        index: u32,
        addr: IpAddr,
        prefix_len: u8,
    ) -> Result<(), NetworkError> {
        self.check("AddrAdd")?;
        let inserted = self
            .state
            .lock()
            .unwrap()
            .addrs
            .insert((index, addr, prefix_len));
        if !inserted {
            return Err(NetworkError::Netlink {
                op: format!("AddrAdd({addr}/{prefix_len})"),
                msg: "file exists".to_string(),
            });
        }
        self.record(Op::AddrAdd {
            index,
            addr,
            prefix_len,
        });
        Ok(())
    }

    async fn add_link_route_v4(
        &self,
        index: u32,
        dst: Ipv4Addr,
        src: Ipv4Addr,
    ) -> Result<(), NetworkError> {
        self.check("RouteAddLink")?;
        self.record(Op::RouteAddLink { index, dst, src });
        Ok(())
    }

    async fn add_default_route_v4(
        &self,
        index: u32,
        gateway: Ipv4Addr,
        src: Ipv4Addr,
    ) -> Result<(), NetworkError> {
        self.check("RouteAddDefault")?;
        self.record(Op::RouteAddDefault {
            index,
            gateway,
            src,
        });
        Ok(())
    }

    fn write_sysctl(&self, path: &str, value: &str) -> Result<(), NetworkError> {
        self.check("Sysctl").map_err(|_| NetworkError::Sysctl {
            path: path.to_string(),
            source: std::io::Error::other("injected failure"),
        })?;
        self.record(Op::Sysctl {
            path: path.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn install_nat(&self, _rules: &NatRuleset) -> Result<(), NetworkError> {
        self.check("InstallNat")?;
        self.record(Op::InstallNat);
        Ok(())
    }

    fn console(&self, line: &str) {
        self.state.lock().unwrap().console.push(line.to_string());
    }
}
