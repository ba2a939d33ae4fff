//! Address and mask helpers shared by the classifier and the ACL parser.

use std::net::{IpAddr, Ipv4Addr};

/// Count the set bits of a dotted-decimal IPv4 mask.
///
/// Returns `None` when `mask` is not a dotted-quad. Non-contiguous masks are
/// not rejected; their prefix is still the number of set bits.
pub fn mask_to_prefix(mask: &str) -> Option<u32> {
    let mask: Ipv4Addr = mask.parse().ok()?;
    Some(u32::from(mask).count_ones())
}

/// Render an address/mask pair in prefix form (`10.0.0.0/24`).
///
/// Dotted masks are converted by counting set bits. A mask that is already a
/// bare prefix length (`24` or `/24`) is kept as is. Anything else is joined
/// verbatim so that no information is lost.
pub fn subnet_value(address: &str, mask: &str) -> String {
    if let Some(prefix) = mask_to_prefix(mask) {
        return format!("{address}/{prefix}");
    }
    let bare = mask.trim_start_matches('/');
    if bare.parse::<u8>().is_ok() {
        return format!("{address}/{bare}");
    }
    format!("{address} {mask}")
}

/// Render an inclusive address range.
pub fn range_value(start: &str, end: &str) -> String {
    format!("{start}-{end}")
}

/// True when `token` parses as an IPv4 or IPv6 address.
pub fn is_address(token: &str) -> bool {
    token.parse::<IpAddr>().is_ok()
}

/// Split a single-token prefix such as `2001:db8::/32` into address and length.
pub fn split_prefix(token: &str) -> Option<(&str, &str)> {
    let (address, len) = token.split_once('/')?;
    if is_address(address) && len.parse::<u8>().is_ok() {
        Some((address, len))
    } else {
        None
    }
}
