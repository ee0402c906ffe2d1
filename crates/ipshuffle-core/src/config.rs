//! Configuration types for the IP shuffle system
//!
//! This module defines the instance list read from disk and the run
//! configuration that is passed explicitly into each stage.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Credential profile used when none is given on the command line
pub const DEFAULT_PROFILE: &str = "yifan";

/// One entry of the instance list
///
/// ```yaml
/// - region: us-east-1
///   name: vm-a
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceRef {
    /// Region the instance lives in (e.g., "us-east-1")
    pub region: String,

    /// Instance name as known to the provider
    pub name: String,
}

impl InstanceRef {
    /// Create a new instance reference
    pub fn new(region: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            name: name.into(),
        }
    }

    fn validate(&self, index: usize) -> Result<(), crate::Error> {
        if self.region.trim().is_empty() {
            return Err(crate::Error::config(format!(
                "Instance #{} ({:?}) has an empty region",
                index + 1,
                self.name
            )));
        }
        if self.name.trim().is_empty() {
            return Err(crate::Error::config(format!(
                "Instance #{} in region {} has an empty name",
                index + 1,
                self.region
            )));
        }
        Ok(())
    }
}

/// Decode and validate an instance list from YAML text
pub fn parse_instances(yaml: &str) -> Result<Vec<InstanceRef>, crate::Error> {
    let instances: Vec<InstanceRef> = serde_yaml::from_str(yaml)
        .map_err(|e| crate::Error::config(format!("Failed to decode instance list: {}", e)))?;

    for (index, instance) in instances.iter().enumerate() {
        instance.validate(index)?;
    }

    Ok(instances)
}

/// Read and decode the instance list at `path`
///
/// Any failure here is fatal to the run: nothing can be shuffled without
/// the list.
pub fn load_instances(path: impl AsRef<Path>) -> Result<Vec<InstanceRef>, crate::Error> {
    let path = path.as_ref();

    let data = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::config(format!("Failed to read file {}: {}", path.display(), e))
    })?;

    let instances = parse_instances(&data).map_err(|e| match e {
        crate::Error::Config(msg) => crate::Error::config(format!("{}: {}", path.display(), msg)),
        other => other,
    })?;

    if instances.is_empty() {
        warn!("Instance list {} is empty", path.display());
    } else {
        debug!("Loaded {} instance(s) from {}", instances.len(), path.display());
    }

    Ok(instances)
}

/// What to do when listing static IPs fails for an instance's region
///
/// Only covers listing failures. Credentials are first exercised by the
/// listing call, and a rejection there is a session failure for that
/// instance under either policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryFailurePolicy {
    /// Record the failure against the current instance and continue
    #[default]
    SkipInstance,

    /// Stop the whole run
    AbortRun,
}

/// Scope of one provider session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Named local credential profile
    pub profile: String,

    /// Region the client is bound to
    pub region: String,
}

impl SessionConfig {
    /// Create a new session scope
    pub fn new(profile: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
            region: region.into(),
        }
    }
}

/// Run configuration
#[derive(Debug, Clone)]
pub struct ShuffleConfig {
    /// Path to the YAML instance list
    pub instances_path: PathBuf,

    /// Credential profile used for every session
    pub profile: String,

    /// Perform read calls only; log mutating calls instead of issuing them
    pub dry_run: bool,

    /// Policy for static IP listing failures
    pub directory_failure: DirectoryFailurePolicy,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl ShuffleConfig {
    /// Create a configuration with defaults for everything but the list path
    pub fn new(instances_path: impl Into<PathBuf>) -> Self {
        Self {
            instances_path: instances_path.into(),
            profile: DEFAULT_PROFILE.to_string(),
            dry_run: false,
            directory_failure: DirectoryFailurePolicy::default(),
            log_level: "info".to_string(),
        }
    }

    /// Session scope for one region
    pub fn session(&self, region: &str) -> SessionConfig {
        SessionConfig::new(&self.profile, region)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.instances_path.as_os_str().is_empty() {
            return Err(crate::Error::config("--instances is required"));
        }

        if self.profile.trim().is_empty() {
            return Err(crate::Error::config("AWS profile name cannot be empty"));
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(crate::Error::config(format!(
                    "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
                    self.log_level
                )));
            }
        }

        Ok(())
    }
}
