//! Core traits for the IP shuffle system
//!
//! - [`StaticIpProvider`]: Control-plane calls against one region
//! - [`ProviderFactory`]: Build a provider for a `(profile, region)` pair

pub mod static_ip_provider;

pub use static_ip_provider::{InstanceDetails, ProviderFactory, StaticIp, StaticIpProvider};
