//! Real kernel backend: rtnetlink for links, addresses and routes, /proc
//! writes for sysctls, a raw socket for the NAT ruleset.

use crate::apply::firewall::NatRuleset;
use crate::error::NetworkError;
use crate::kernel::{Kernel, LinkInfo};
use futures::TryStreamExt;
use netlink_packet_route::link::{LinkAttribute, State};
use netlink_packet_route::route::{RouteProtocol, RouteScope};
use rtnetlink::Handle;
use socket2::{Domain, Protocol, Socket, Type};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::os::unix::io::AsRawFd;

// from include/uapi/linux/netfilter_ipv4/ip_tables.h
const IPT_SO_SET_REPLACE: libc::c_int = 0x40;
const IPT_SO_SET_ADD_COUNTERS: libc::c_int = 0x41;

/// Backend issuing genuine kernel calls.
pub struct NetlinkBackend {
    handle: Handle,
}

impl NetlinkBackend {
    /// Create a new backend. Spawns the netlink connection driver on the
    /// current tokio runtime.
    pub async fn new() -> Result<Self, NetworkError> {
        let (connection, handle, _) = rtnetlink::new_connection().map_err(NetworkError::Socket)?;

        tokio::spawn(connection);

        Ok(Self { handle })
    }
}

fn nl_err(op: String, e: rtnetlink::Error) -> NetworkError {
    NetworkError::Netlink {
        op,
        msg: e.to_string(),
    }
}

fn link_info(msg: netlink_packet_route::link::LinkMessage) -> LinkInfo {
    let mut name = String::new();
    let mut mac = None;
    let mut oper_up = false;
    for attr in msg.attributes {
        match attr {
            LinkAttribute::IfName(n) => name = n,
            LinkAttribute::Address(bytes) => {
                if let Ok(array) = <[u8; 6]>::try_from(bytes.as_slice()) {
                    mac = Some(array);
                }
            }
            LinkAttribute::OperState(state) => oper_up = state == State::Up,
            _ => {}
        }
    }
    LinkInfo {
        index: msg.header.index,
        name,
        mac,
        oper_up,
    }
}

impl Kernel for NetlinkBackend {
    async fn links(&self) -> Result<Vec<LinkInfo>, NetworkError> {
        let mut links = self.handle.link().get().execute();
        let mut out = Vec::new();
        while let Some(msg) = links
            .try_next()
            .await
            .map_err(|e| nl_err("LinkList".into(), e))?
        {
            out.push(link_info(msg));
        }
        Ok(out)
    }

    async fn link_by_name(&self, name: &str) -> Result<LinkInfo, NetworkError> {
        let mut links = self
            .handle
            .link()
            .get()
            .match_name(name.to_string())
            .execute();
        match links
            .try_next()
            .await
            .map_err(|e| nl_err(format!("LinkByName({name})"), e))?
        {
            Some(msg) => Ok(link_info(msg)),
            None => Err(NetworkError::LinkNotFound(name.to_string())),
        }
    }

    async fn set_link_name(&self, index: u32, name: &str) -> Result<(), NetworkError> {
        self.handle
            .link()
            .set(index)
            .name(name.to_string())
            .execute()
            .await
            .map_err(|e| nl_err(format!("LinkSetName({name})"), e))
    }

    async fn set_link_up(&self, index: u32) -> Result<(), NetworkError> {
        self.handle
            .link()
            .set(index)
            .up()
            .execute()
            .await
            .map_err(|e| nl_err(format!("LinkSetUp({index})"), e))
    }

    async fn replace_address(
        &self,
        index: u32,
        addr: IpAddr,
        prefix_len: u8,
    ) -> Result<(), NetworkError> {
        self.handle
            .address()
            .add(index, addr, prefix_len)
            .replace()
            .execute()
            .await
            .map_err(|e| nl_err(format!("AddrReplace({addr}/{prefix_len})"), e))
    }

    async fn add_address(
        &self,
        index: u32,
        addr: IpAddr,
        prefix_len: u8,
    ) -> Result<(), NetworkError> {
        self.handle
            .address()
            .add(index, addr, prefix_len)
            .execute()
            .await
            .map_err(|e| nl_err(format!("AddrAdd({addr}/{prefix_len})"), e))
    }

    async fn add_link_route_v4(
        &self,
        index: u32,
        dst: Ipv4Addr,
        src: Ipv4Addr,
    ) -> Result<(), NetworkError> {
        self.handle
            .route()
            .add()
            .v4()
            .destination_prefix(dst, 32)
            .output_interface(index)
            .pref_source(src)
            .scope(RouteScope::Link)
            .protocol(RouteProtocol::Dhcp)
            .execute()
            .await
            .map_err(|e| nl_err(format!("RouteAdd({dst}/32)"), e))
    }

    async fn add_default_route_v4(
        &self,
        index: u32,
        gateway: Ipv4Addr,
        src: Ipv4Addr,
    ) -> Result<(), NetworkError> {
        self.handle
            .route()
            .add()
            .v4()
            .destination_prefix(Ipv4Addr::UNSPECIFIED, 0)
            .gateway(gateway)
            .output_interface(index)
            .pref_source(src)
            .protocol(RouteProtocol::Dhcp)
            .execute()
            .await
            .map_err(|e| nl_err(format!("RouteAdd(default via {gateway})"), e))
    }

    fn write_sysctl(&self, path: &str, value: &str) -> Result<(), NetworkError> {
        fs::write(path, value).map_err(|e| NetworkError::Sysctl {
            path: path.to_string(),
            source: e,
        })
    }

    fn install_nat(&self, rules: &NatRuleset) -> Result<(), NetworkError> {
        let socket = Socket::new(
            Domain::IPV4,
            Type::RAW,
            Some(Protocol::from(libc::IPPROTO_RAW)),
        )
        .map_err(NetworkError::Socket)?;

        setsockopt_blob(&socket, IPT_SO_SET_REPLACE, "IPT_SO_SET_REPLACE", rules.replace)?;
        setsockopt_blob(
            &socket,
            IPT_SO_SET_ADD_COUNTERS,
            "IPT_SO_SET_ADD_COUNTERS",
            rules.counters,
        )?;

        // The installed ruleset is kernel state; it survives the socket,
        // which closes when `socket` drops here.
        Ok(())
    }

    fn console(&self, line: &str) {
        let _ = fs::write("/dev/console", line);
    }
}

fn setsockopt_blob(
    socket: &Socket,
    opt: libc::c_int,
    opt_name: &'static str,
    blob: &[u8],
) -> Result<(), NetworkError> {
    let ret = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            libc::SOL_IP,
            opt,
            blob.as_ptr() as *const libc::c_void,
            blob.len() as libc::socklen_t,
        )
    };
    if ret < 0 {
        return Err(NetworkError::Sockopt {
            opt: opt_name,
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}
