use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};

use clap::Parser;

use crate::error::{AdapterError, Result};

pub const DEFAULT_LISTEN_ADDRESS: &str = ":9461";

#[derive(clap::Parser, Clone, Debug)]
#[clap(author, version, about = "Prometheus remote read adapter for AWS Lambda backed time series")]
pub struct Config {
    /// Address to listen on for web endpoints.
    #[clap(
        long = "web.listen-address",
        env = "LISTEN_ADDRESS",
        default_value = DEFAULT_LISTEN_ADDRESS
    )]
    pub listen_address: String,

    /// Region to invoke backend functions in. Discovered when unset.
    #[clap(long = "aws.region", env = "LAMBDA_READ_ADAPTER_REGION")]
    pub region: Option<String>,

    /// Log level used when RUST_LOG is not set.
    #[clap(long = "log.level", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Resolves the listen address into candidate socket addresses.
    ///
    /// An empty host (`:9461`) means every interface: the dual-stack `[::]`
    /// first, then `0.0.0.0` for hosts without IPv6.
    pub fn listen_addrs(&self) -> Result<Vec<SocketAddr>> {
        let address = self.listen_address.trim();
        if let Some(port) = address.strip_prefix(':') {
            let port: u16 = port.parse().map_err(|e| {
                AdapterError::Config(format!(
                    "invalid listen address '{}': {}",
                    self.listen_address, e
                ))
            })?;
            return Ok(vec![
                SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)),
                SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ]);
        }

        let addrs: Vec<SocketAddr> = address
            .to_socket_addrs()
            .map_err(|e| {
                AdapterError::Config(format!(
                    "invalid listen address '{}': {}",
                    self.listen_address, e
                ))
            })?
            .collect();
        if addrs.is_empty() {
            return Err(AdapterError::Config(format!(
                "listen address '{}' did not resolve",
                self.listen_address
            )));
        }
        Ok(addrs)
    }
}
