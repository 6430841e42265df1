// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::resolver::{Error, ResolverResult};

pub use forward::HostnameResolver;
pub use reverse::ReverseResolver;

pub mod forward;
pub mod reverse;

/// Address marking a name that has been blocked before, e.g., by a DNS sinkhole. It is never looked up in reverse.
pub const SENTINEL_BLOCKED_ADDR: Ipv4Addr = Ipv4Addr::UNSPECIFIED;

/// Checks for the sentinel address, including its IPv4-mapped IPv6 form `::ffff:0.0.0.0`.
pub fn is_sentinel(ip_addr: &IpAddr) -> bool {
    match ip_addr {
        IpAddr::V4(ip) => *ip == SENTINEL_BLOCKED_ADDR,
        IpAddr::V6(ip) => ip.to_ipv4_mapped() == Some(SENTINEL_BLOCKED_ADDR),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReverseResult {
    Names(Vec<String>),
    Skipped,
    Failed(Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseOutcome {
    pub ip_addr: IpAddr,
    pub result: ReverseResult,
}

/// Everything that happened while resolving one hostname.
#[derive(Debug, Clone)]
pub struct HostnameOutcome {
    pub hostname: String,
    pub ip_addrs: ResolverResult<Vec<IpAddr>>,
    pub reverse: Vec<ReverseOutcome>,
    pub elapsed: Duration,
}

impl HostnameOutcome {
    pub fn failed(hostname: String, error: Error, elapsed: Duration) -> HostnameOutcome {
        HostnameOutcome {
            hostname,
            ip_addrs: Err(error),
            reverse: Vec::new(),
            elapsed,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.ip_addrs.is_ok()
    }

    pub fn error(&self) -> Option<&Error> {
        self.ip_addrs.as_ref().err()
    }
}
