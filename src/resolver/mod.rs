// Copyright 2017-2021 Lukas Pustina <lukas@pustina.de>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{LookupIpStrategy, NameServerConfig, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::TokioResolver;
use tracing::{debug, warn};

pub use deadline::Deadline;
pub use error::Error;

pub mod deadline;
pub mod error;

pub type ResolverResult<T> = std::result::Result<T, Error>;

/// Port custom DNS servers are queried on.
pub const DNS_PORT: u16 = 53;

/// Selects the address family of forward lookups; fixed for a whole batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamilyMode {
    Any,
    #[default]
    IPv4Only,
    IPv6Only,
}

impl FromStr for AddressFamilyMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ip" => Ok(AddressFamilyMode::Any),
            "ip4" => Ok(AddressFamilyMode::IPv4Only),
            "ip6" => Ok(AddressFamilyMode::IPv6Only),
            _ => Err(Error::UnsupportedMode { mode: s.to_string() }),
        }
    }
}

impl fmt::Display for AddressFamilyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str = match self {
            AddressFamilyMode::Any => "ip",
            AddressFamilyMode::IPv4Only => "ip4",
            AddressFamilyMode::IPv6Only => "ip6",
        };
        f.write_str(str)
    }
}

/// Resolution mechanism shared read-only by all lookups of a batch.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolves `hostname` to its addresses of the requested family, in the order the nameserver returned them.
    async fn forward_lookup(&self, mode: AddressFamilyMode, hostname: &str) -> ResolverResult<Vec<IpAddr>>;

    /// Resolves `ip_addr` to the names of its PTR records.
    async fn reverse_lookup(&self, ip_addr: IpAddr) -> ResolverResult<Vec<String>>;

    fn name(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct ResolverOpts {
    /// Timeout of a single query to a custom DNS server; the batch deadline still applies on top.
    pub dial_timeout: Duration,
    pub attempts: usize,
}

impl Default for ResolverOpts {
    fn default() -> Self {
        ResolverOpts {
            dial_timeout: Duration::from_secs(1),
            attempts: 1,
        }
    }
}

/// Builds the [`Backend`] for a batch.
#[derive(Debug, Default, Clone)]
pub struct ResolverFactory {
    opts: ResolverOpts,
}

impl ResolverFactory {
    pub fn new(opts: ResolverOpts) -> Self {
        ResolverFactory { opts }
    }

    /// Creates a backend bound to `dns_server` or, if absent or empty, to the system's default resolver.
    ///
    /// Fails with `Error::InvalidAddress` if `dns_server` is not an IP literal.
    pub fn build(&self, dns_server: Option<&str>) -> ResolverResult<HickoryBackend> {
        match dns_server {
            None | Some("") => Ok(HickoryBackend::system()),
            Some(str) => {
                let ip_addr = IpAddr::from_str(str).map_err(|_| Error::InvalidAddress {
                    address: str.to_string(),
                })?;
                Ok(HickoryBackend::with_server(ip_addr, &self.opts))
            }
        }
    }
}

/// [`Backend`] based on hickory's `TokioResolver`.
#[derive(Clone)]
pub struct HickoryBackend {
    inner: Arc<TokioResolver>,
    name_server: Option<SocketAddr>,
}

impl fmt::Debug for HickoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HickoryBackend")
            .field("name_server", &self.name_server)
            .finish_non_exhaustive()
    }
}

impl HickoryBackend {
    /// Uses the system configuration, i.e., `/etc/resolv.conf` on Unix; falls back to hickory's defaults if the system
    /// configuration cannot be read.
    pub fn system() -> HickoryBackend {
        let mut builder = match TokioResolver::builder_tokio() {
            Ok(builder) => {
                debug!("Using system resolver configuration.");
                builder
            }
            Err(e) => {
                warn!(error = %e, "Failed to read system resolver configuration, using defaults.");
                TokioResolver::builder_with_config(ResolverConfig::default(), TokioConnectionProvider::default())
            }
        };
        builder.options_mut().ip_strategy = LookupIpStrategy::Ipv4AndIpv6;

        HickoryBackend {
            inner: Arc::new(builder.build()),
            name_server: None,
        }
    }

    /// Sends all queries via UDP to `ip_addr` on port 53.
    ///
    /// Negative answers of this server are final; there is no fallback to any other nameserver.
    pub fn with_server(ip_addr: IpAddr, opts: &ResolverOpts) -> HickoryBackend {
        let socket_addr = SocketAddr::new(ip_addr, DNS_PORT);
        let mut name_server = NameServerConfig::new(socket_addr, Protocol::Udp);
        name_server.trust_negative_responses = true;

        let mut config = ResolverConfig::new();
        config.add_name_server(name_server);

        let mut builder = TokioResolver::builder_with_config(config, TokioConnectionProvider::default());
        let resolver_opts = builder.options_mut();
        resolver_opts.ip_strategy = LookupIpStrategy::Ipv4AndIpv6;
        resolver_opts.timeout = opts.dial_timeout;
        resolver_opts.attempts = opts.attempts;
        debug!("Using nameserver udp:{} with timeout {:?}.", socket_addr, opts.dial_timeout);

        HickoryBackend {
            inner: Arc::new(builder.build()),
            name_server: Some(socket_addr),
        }
    }

    pub fn is_system(&self) -> bool {
        self.name_server.is_none()
    }

    pub fn name_server(&self) -> Option<SocketAddr> {
        self.name_server
    }
}

#[async_trait]
impl Backend for HickoryBackend {
    async fn forward_lookup(&self, mode: AddressFamilyMode, hostname: &str) -> ResolverResult<Vec<IpAddr>> {
        if let Ok(ip_addr) = IpAddr::from_str(hostname) {
            return literal_lookup(mode, hostname, ip_addr);
        }

        let ip_addrs = match mode {
            AddressFamilyMode::Any => self.inner.lookup_ip(hostname).await?.iter().collect(),
            AddressFamilyMode::IPv4Only => self
                .inner
                .ipv4_lookup(hostname)
                .await?
                .iter()
                .map(|x| IpAddr::V4(x.0))
                .collect(),
            AddressFamilyMode::IPv6Only => self
                .inner
                .ipv6_lookup(hostname)
                .await?
                .iter()
                .map(|x| IpAddr::V6(x.0))
                .collect(),
        };

        Ok(ip_addrs)
    }

    async fn reverse_lookup(&self, ip_addr: IpAddr) -> ResolverResult<Vec<String>> {
        let names = self.inner.reverse_lookup(ip_addr).await?.iter().map(ToString::to_string).collect();

        Ok(names)
    }

    fn name(&self) -> String {
        match self.name_server {
            Some(socket_addr) => format!("udp:{}", socket_addr),
            None => "system".to_string(),
        }
    }
}

/// IP literals are answered without asking any nameserver, as long as their family matches `mode`.
fn literal_lookup(mode: AddressFamilyMode, hostname: &str, ip_addr: IpAddr) -> ResolverResult<Vec<IpAddr>> {
    let ip_addr = match (mode, ip_addr) {
        (AddressFamilyMode::Any, ip_addr) => Some(ip_addr),
        (AddressFamilyMode::IPv4Only, IpAddr::V4(ip)) => Some(IpAddr::V4(ip)),
        (AddressFamilyMode::IPv4Only, IpAddr::V6(ip)) => ip.to_ipv4_mapped().map(IpAddr::V4),
        (AddressFamilyMode::IPv6Only, IpAddr::V6(ip)) if ip.to_ipv4_mapped().is_none() => Some(IpAddr::V6(ip)),
        (AddressFamilyMode::IPv6Only, _) => None,
    };

    ip_addr
        .map(|x| vec![x])
        .ok_or_else(|| Error::dns(format!("no suitable address found for {}", hostname), false))
}
