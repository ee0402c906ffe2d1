// # Static IP Provider Trait
//
// Defines the narrow capability interface the orchestrator needs from a
// cloud provider's control plane.
//
// ## Implementations
//
// - AWS Lightsail: `ipshuffle-provider-lightsail` crate
//
// ## Usage
//
// ```rust,ignore
// use ipshuffle_core::{ProviderFactory, SessionConfig};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let factory = /* ProviderFactory implementation */;
//     let provider = factory.connect(&SessionConfig::new("default", "us-east-1")).await?;
//
//     for ip in provider.list_static_ips().await? {
//         println!("{} -> {:?}", ip.name, ip.attached_to);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::SessionConfig;

/// A static IP allocation as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticIp {
    /// Allocation name
    pub name: String,
    /// The reserved address, if the provider reported one
    pub ip_address: Option<IpAddr>,
    /// Name of the resource the allocation is attached to
    pub attached_to: Option<String>,
}

impl StaticIp {
    /// Create an allocation record
    pub fn new(name: impl Into<String>, attached_to: Option<&str>) -> Self {
        Self {
            name: name.into(),
            ip_address: None,
            attached_to: attached_to.map(str::to_string),
        }
    }

    /// Set the reserved address
    pub fn with_ip_address(mut self, ip: IpAddr) -> Self {
        self.ip_address = Some(ip);
        self
    }
}

/// Instance details relevant to a shuffle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDetails {
    /// Instance name
    pub name: String,
    /// Current public address
    pub public_ip: Option<IpAddr>,
}

/// Trait for static IP provider implementations
///
/// Each method maps to exactly one control-plane request. Implementations
/// must not retry and must not cache between calls. A rejected credential
/// is returned as [`crate::Error::Session`]; every other failure as an
/// [`crate::Error::Provider`], to which the orchestrator adds step context.
///
/// A provider value is bound to one `(profile, region)` pair for its whole
/// lifetime.
#[async_trait]
pub trait StaticIpProvider: Send + Sync {
    /// List every static IP allocation in the region
    async fn list_static_ips(&self) -> Result<Vec<StaticIp>, crate::Error>;

    /// Fetch the details of one instance
    async fn get_instance(&self, instance_name: &str) -> Result<InstanceDetails, crate::Error>;

    /// Detach a static IP from whatever it is attached to
    async fn detach_static_ip(&self, static_ip_name: &str) -> Result<(), crate::Error>;

    /// Release (delete) a static IP allocation
    async fn release_static_ip(&self, static_ip_name: &str) -> Result<(), crate::Error>;

    /// Reserve a new static IP under the given name
    async fn allocate_static_ip(&self, static_ip_name: &str) -> Result<(), crate::Error>;

    /// Attach a static IP to an instance
    async fn attach_static_ip(
        &self,
        static_ip_name: &str,
        instance_name: &str,
    ) -> Result<(), crate::Error>;

    /// Region this provider is bound to
    fn region(&self) -> &str;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Session factory: builds a region-scoped provider from a credential profile
///
/// Construction must not issue control-plane requests; credential problems
/// surface on first use.
#[async_trait]
pub trait ProviderFactory: Send + Sync {
    /// Create a provider bound to `session`
    async fn connect(
        &self,
        session: &SessionConfig,
    ) -> Result<Box<dyn StaticIpProvider>, crate::Error>;
}
