use get_if_addrs::{IfAddr, get_if_addrs};
use std::net::IpAddr;

/// Checks if an IP address can be advertised to other nodes (IPv4 private or IPv6 ULA).
fn is_advertisable(addr: &IpAddr) -> bool {
    match addr {
        IpAddr::V4(ipv4) => ipv4.is_private(),
        IpAddr::V6(ipv6) => ipv6.is_unique_local(),
    }
}

/// Gets the first private network address (prioritizing IPv4 private over IPv6 ULA,
/// since node addresses are written as `host:port`).
///
/// Returns `None` if no private addresses are found or if retrieving interfaces fails.
pub fn get_first_network_address() -> Option<IpAddr> {
    let mut if_addrs = get_if_addrs().ok()?;

    if_addrs.sort_by_key(|interface| match interface.addr {
        IfAddr::V4(_) => 0,
        IfAddr::V6(_) => 1,
    });

    if_addrs
        .into_iter()
        .map(|interface| match interface.addr {
            IfAddr::V4(addr) => IpAddr::V4(addr.ip),
            IfAddr::V6(addr) => IpAddr::V6(addr.ip),
        })
        .find(is_advertisable)
}
