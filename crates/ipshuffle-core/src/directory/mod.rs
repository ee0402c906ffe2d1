//! Reverse lookup from instance name to static IP allocation
//!
//! Built fresh from a single listing at the start of each instance's
//! shuffle and never shared between sessions.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::net::IpAddr;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::traits::{StaticIp, StaticIpProvider};

/// Mapping of attached resource name → static IP allocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticIpDirectory {
    by_instance: HashMap<String, StaticIp>,
}

impl StaticIpDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// List every static IP through `provider` and index the attached ones
    ///
    /// # Returns
    ///
    /// - `Ok(StaticIpDirectory)`: Possibly empty directory
    /// - `Err(Error::Session)`: The provider rejected the session's credentials
    /// - `Err(Error::Directory)`: The listing call failed for any other reason
    pub async fn build(provider: &dyn StaticIpProvider) -> Result<Self> {
        let allocations = provider.list_static_ips().await.map_err(|e| match e {
            Error::Session { .. } => e,
            other => Error::directory(
                provider.region(),
                format!("{}: {}", provider.provider_name(), other),
            ),
        })?;

        debug!(
            "Listed {} static IP(s) in {} via {}",
            allocations.len(),
            provider.region(),
            provider.provider_name()
        );

        Ok(Self::from_allocations(allocations))
    }

    /// Index a set of allocations, skipping the unattached ones
    pub fn from_allocations(allocations: impl IntoIterator<Item = StaticIp>) -> Self {
        let mut by_instance = HashMap::new();

        for allocation in allocations {
            let Some(attached_to) = allocation.attached_to.clone() else {
                debug!("Static IP {} is not attached", allocation.name);
                continue;
            };

            match by_instance.entry(attached_to) {
                Entry::Vacant(slot) => {
                    slot.insert(allocation);
                }
                Entry::Occupied(slot) => {
                    warn!(
                        "Static IPs {:?} and {:?} both claim {}; keeping the first",
                        slot.get().name,
                        allocation.name,
                        slot.key()
                    );
                }
            }
        }

        Self { by_instance }
    }

    /// Static IP name attached to `instance_name`, if any
    pub fn lookup(&self, instance_name: &str) -> Option<&str> {
        self.by_instance
            .get(instance_name)
            .map(|allocation| allocation.name.as_str())
    }

    /// Reserved address of the static IP attached to `instance_name`
    ///
    /// `None` when nothing is attached or the listing carried no address.
    pub fn address_of(&self, instance_name: &str) -> Option<IpAddr> {
        self.by_instance
            .get(instance_name)
            .and_then(|allocation| allocation.ip_address)
    }

    /// Number of attached allocations
    pub fn len(&self) -> usize {
        self.by_instance.len()
    }

    /// Check if no allocation is attached
    pub fn is_empty(&self) -> bool {
        self.by_instance.is_empty()
    }
}
