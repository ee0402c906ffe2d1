// # ipshuffle-core
//
// Core library for cycling the static public IPs of cloud instances.
//
// ## Architecture Overview
//
// For every configured instance the engine detaches, releases, reallocates
// and reattaches its static IP, so the instance comes back with a fresh
// address under the same allocation name:
// - **StaticIpProvider**: Trait for the control-plane calls of one region
// - **ProviderFactory**: Trait for building a provider from (profile, region)
// - **StaticIpDirectory**: Reverse lookup from instance to static IP name
// - **ShuffleEngine**: Walks the instance list and runs each shuffle
//
// ## Design Principles
//
// 1. **Sequential**: One instance at a time, one call at a time
// 2. **No retries, no rollback**: A failing step stops that instance only
// 3. **Library-First**: The binary only parses flags and wires the provider in

pub mod config;
pub mod directory;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use config::{
    DirectoryFailurePolicy, InstanceRef, SessionConfig, ShuffleConfig, load_instances,
    parse_instances,
};
pub use directory::StaticIpDirectory;
pub use engine::{
    InstanceReport, RunReport, ShuffleEngine, ShuffleOutcome, reattach_static_ip,
    shuffle_instance_list,
};
pub use error::{Error, Result};
pub use traits::{InstanceDetails, ProviderFactory, StaticIp, StaticIpProvider};
