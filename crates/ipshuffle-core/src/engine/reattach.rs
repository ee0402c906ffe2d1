//! Re-attachment of one instance's static IP
//!
//! ```text
//! verify ─► lookup ─► detach ─► release ─► allocate ─► attach ─► confirm
//!              │
//!              └─ no static IP: done
//! ```
//!
//! Steps run strictly in order. A failing step stops the sequence and
//! nothing already done is reversed:
//!
//! | Failed step | Provider state left behind              |
//! |-------------|-----------------------------------------|
//! | detach      | IP still attached                       |
//! | release     | IP detached, reservation still held     |
//! | allocate    | name unbound, no reservation            |
//! | attach      | new reservation exists, unattached      |

use std::net::IpAddr;
use tracing::info;

use crate::directory::StaticIpDirectory;
use crate::error::{Error, Result};
use crate::traits::StaticIpProvider;

/// Result of a successful shuffle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShuffleOutcome {
    /// The instance has no static IP attached; nothing was changed
    NoStaticIp,

    /// The static IP was cycled and reattached
    Reattached {
        /// Allocation name (unchanged across the cycle)
        static_ip_name: String,
        /// Public address before the shuffle
        previous_ip: Option<IpAddr>,
        /// Reserved address given back at the release step, as listed
        released_ip: Option<IpAddr>,
        /// Public address reported after reattaching
        new_ip: Option<IpAddr>,
    },
}

/// Cycle the static IP attached to `instance_name`
///
/// # Parameters
///
/// - `provider`: Region-scoped provider the instance lives in
/// - `directory`: Static IP directory built from the same provider
/// - `instance_name`: Instance to shuffle
///
/// # Returns
///
/// - `Ok(ShuffleOutcome::NoStaticIp)`: Instance exists but has no static IP
/// - `Ok(ShuffleOutcome::Reattached { .. })`: All steps completed
/// - `Err(Error)`: The step that failed, with instance and static IP name
pub async fn reattach_static_ip(
    provider: &dyn StaticIpProvider,
    directory: &StaticIpDirectory,
    instance_name: &str,
) -> Result<ShuffleOutcome> {
    info!("Shuffle IP for {}", instance_name);

    let before = provider
        .get_instance(instance_name)
        .await
        .map_err(|e| Error::instance_lookup(instance_name, e.to_string()))?;

    let Some(ip_name) = directory.lookup(instance_name) else {
        info!("No static IP found for instance {}", instance_name);
        return Ok(ShuffleOutcome::NoStaticIp);
    };
    let released_ip = directory.address_of(instance_name);

    let step_error = |make: fn(String, String, String) -> Error, e: Error| {
        make(instance_name.to_string(), ip_name.to_string(), e.to_string())
    };

    info!("Detach static IP {:?} for {}", ip_name, instance_name);
    provider
        .detach_static_ip(ip_name)
        .await
        .map_err(|e| step_error(detach, e))?;

    match released_ip {
        Some(ip) => info!("Release static IP {:?} ({}) for {}", ip_name, ip, instance_name),
        None => info!("Release static IP {:?} for {}", ip_name, instance_name),
    }
    provider
        .release_static_ip(ip_name)
        .await
        .map_err(|e| step_error(release, e))?;

    info!("Allocate static IP {:?} for {}", ip_name, instance_name);
    provider
        .allocate_static_ip(ip_name)
        .await
        .map_err(|e| step_error(allocate, e))?;

    info!("Attach static IP {:?} for {}", ip_name, instance_name);
    provider
        .attach_static_ip(ip_name, instance_name)
        .await
        .map_err(|e| step_error(attach, e))?;

    let after = provider
        .get_instance(instance_name)
        .await
        .map_err(|e| Error::instance_lookup(instance_name, e.to_string()))?;

    match after.public_ip {
        Some(ip) => info!("New IP for {} is {:?}", instance_name, ip.to_string()),
        None => info!("New IP for {} is not reported yet", instance_name),
    }

    Ok(ShuffleOutcome::Reattached {
        static_ip_name: ip_name.to_string(),
        previous_ip: before.public_ip,
        released_ip,
        new_ip: after.public_ip,
    })
}

fn detach(instance: String, static_ip: String, message: String) -> Error {
    Error::Detach {
        instance,
        static_ip,
        message,
    }
}

fn release(instance: String, static_ip: String, message: String) -> Error {
    Error::Release {
        instance,
        static_ip,
        message,
    }
}

fn allocate(instance: String, static_ip: String, message: String) -> Error {
    Error::Allocate {
        instance,
        static_ip,
        message,
    }
}

fn attach(instance: String, static_ip: String, message: String) -> Error {
    Error::Attach {
        instance,
        static_ip,
        message,
    }
}
