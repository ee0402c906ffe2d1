//! Error types for the IP shuffle system
//!
//! Every failure carries enough context (step, instance, static IP name) to
//! recover the provider state by hand. Nothing here is retried.

use thiserror::Error;

/// Result type alias for shuffle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the IP shuffle system
#[derive(Error, Debug)]
pub enum Error {
    /// Instance list or flag errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential or region setup errors
    #[error("Session error in region {region}: {message}")]
    Session {
        /// Region the session was scoped to
        region: String,
        /// Error message
        message: String,
    },

    /// Listing static IPs failed
    #[error("Failed to list static IPs in region {region}: {message}")]
    Directory {
        /// Region that was listed
        region: String,
        /// Error message
        message: String,
    },

    /// Instance details could not be fetched
    #[error("Failed to get instance {instance}: {message}")]
    InstanceLookup {
        /// Instance name
        instance: String,
        /// Error message
        message: String,
    },

    /// Detach step failed; the IP is still attached
    #[error("Failed to detach static IP {static_ip:?} from {instance}: {message}")]
    Detach {
        /// Instance name
        instance: String,
        /// Static IP allocation name
        static_ip: String,
        /// Error message
        message: String,
    },

    /// Release step failed; the IP is detached but still reserved
    #[error("Failed to release static IP {static_ip:?} for {instance}: {message}")]
    Release {
        /// Instance name
        instance: String,
        /// Static IP allocation name
        static_ip: String,
        /// Error message
        message: String,
    },

    /// Allocate step failed; the static IP name is now unbound
    #[error("Failed to allocate static IP {static_ip:?} for {instance}: {message}")]
    Allocate {
        /// Instance name
        instance: String,
        /// Static IP allocation name
        static_ip: String,
        /// Error message
        message: String,
    },

    /// Attach step failed; the new IP is allocated but unattached
    #[error("Failed to attach static IP {static_ip:?} to {instance}: {message}")]
    Attach {
        /// Instance name
        instance: String,
        /// Static IP allocation name
        static_ip: String,
        /// Error message
        message: String,
    },

    /// Raw failure from a provider call, before step context is added
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a session error
    pub fn session(region: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Session {
            region: region.into(),
            message: message.into(),
        }
    }

    /// Create a directory listing error
    pub fn directory(region: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Directory {
            region: region.into(),
            message: message.into(),
        }
    }

    /// Create an instance lookup error
    pub fn instance_lookup(instance: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InstanceLookup {
            instance: instance.into(),
            message: message.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Name of the step this error belongs to
    pub fn step(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Session { .. } => "session",
            Error::Directory { .. } => "directory",
            Error::InstanceLookup { .. } => "lookup",
            Error::Detach { .. } => "detach",
            Error::Release { .. } => "release",
            Error::Allocate { .. } => "allocate",
            Error::Attach { .. } => "attach",
            Error::Provider { .. } => "provider",
            Error::Other(_) => "other",
        }
    }

    /// Static IP name attached to this error, if the step knew it
    pub fn static_ip(&self) -> Option<&str> {
        match self {
            Error::Detach { static_ip, .. }
            | Error::Release { static_ip, .. }
            | Error::Allocate { static_ip, .. }
            | Error::Attach { static_ip, .. } => Some(static_ip),
            _ => None,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
