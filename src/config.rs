//! Process configuration.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use crate::codec::WireFormat;

/// Default HTTP listen address.
pub const DEFAULT_LISTEN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 3000));

/// Default message channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration for the `msgchain` process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP API binds to.
    pub listen_addr: SocketAddr,
    /// Events the channel buffers before producers see `ChannelFull`.
    pub channel_capacity: usize,
    /// Encoding of channel payloads.
    pub wire_format: WireFormat,
    /// `tracing` filter directives.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            wire_format: WireFormat::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
