//! Core shuffle engine
//!
//! The ShuffleEngine walks the configured instance list and, for each entry:
//! - Connects a fresh provider session for the instance's region
//! - Builds a fresh static IP directory from that session
//! - Runs the re-attachment sequence (see [`reattach`])
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  InstanceRef  ┌───────────────┐
//! │ instance list │──────────────►│ ShuffleEngine │
//! └───────────────┘               └───────────────┘
//!                                         │
//!          ┌──────────────────────────────┼──────────────────────────┐
//!          ▼                              ▼                          ▼
//! ┌─────────────────┐          ┌───────────────────┐        ┌─────────────────┐
//! │ ProviderFactory │          │ StaticIpDirectory │        │ reattach steps  │
//! │ (connect)       │          │ (build)           │        │ (detach→attach) │
//! └─────────────────┘          └───────────────────┘        └─────────────────┘
//! ```
//!
//! ## Failure isolation
//!
//! A failing instance is logged, recorded in the [`RunReport`] and skipped.
//! The only run-level failure is a static IP listing error under
//! [`DirectoryFailurePolicy::AbortRun`].

pub mod reattach;

pub use reattach::{ShuffleOutcome, reattach_static_ip};

use crate::config::{
    DirectoryFailurePolicy, InstanceRef, SessionConfig, ShuffleConfig, load_instances,
};
use crate::directory::StaticIpDirectory;
use crate::error::{Error, Result};
use crate::traits::ProviderFactory;
use tracing::{debug, error, info, warn};

/// Result of shuffling one instance
#[derive(Debug)]
pub struct InstanceReport {
    /// The instance that was processed
    pub instance: InstanceRef,
    /// Outcome, or the error that stopped it
    pub result: Result<ShuffleOutcome>,
}

/// Ordered results of a complete run
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per attempted instance, in list order
    pub instances: Vec<InstanceReport>,
}

impl RunReport {
    /// Number of instances that completed without error
    pub fn succeeded(&self) -> usize {
        self.instances.iter().filter(|r| r.result.is_ok()).count()
    }

    /// Number of instances that failed
    pub fn failed(&self) -> usize {
        self.instances.iter().filter(|r| r.result.is_err()).count()
    }

    /// Number of instances that were actually reattached
    pub fn reattached(&self) -> usize {
        self.instances
            .iter()
            .filter(|r| matches!(r.result, Ok(ShuffleOutcome::Reattached { .. })))
            .count()
    }
}

/// Core shuffle engine
///
/// Processes instances strictly one at a time. No session, directory or
/// other state is carried from one instance to the next.
pub struct ShuffleEngine {
    /// Session factory
    factory: Box<dyn ProviderFactory>,

    /// Credential profile for every session
    profile: String,

    /// What to do when the static IP listing fails
    directory_failure: DirectoryFailurePolicy,
}

impl ShuffleEngine {
    /// Create a new shuffle engine
    ///
    /// # Parameters
    ///
    /// - `factory`: Session factory for the target provider
    /// - `config`: Run configuration
    pub fn new(factory: Box<dyn ProviderFactory>, config: &ShuffleConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            factory,
            profile: config.profile.clone(),
            directory_failure: config.directory_failure,
        })
    }

    /// Shuffle every instance in `instances`, in order
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: Every instance was attempted
    /// - `Err(Error::Directory)`: Listing failed under `AbortRun`
    pub async fn run(&self, instances: &[InstanceRef]) -> Result<RunReport> {
        info!("Shuffling {} instance(s)", instances.len());

        let mut report = RunReport::default();

        for instance in instances {
            let result = match self.shuffle_instance(instance).await {
                Err(e @ Error::Directory { .. })
                    if self.directory_failure == DirectoryFailurePolicy::AbortRun =>
                {
                    error!("Aborting run at {}: {}", instance.name, e);
                    return Err(e);
                }
                result => result,
            };

            if let Err(e) = &result {
                error!("Failed to shuffle IP for {}: {}", instance.name, e);
            }

            report.instances.push(InstanceReport {
                instance: instance.clone(),
                result,
            });
        }

        info!(
            "Shuffle completed: {} succeeded ({} reattached), {} failed",
            report.succeeded(),
            report.reattached(),
            report.failed()
        );

        Ok(report)
    }

    /// Run one instance through session, directory and re-attachment
    async fn shuffle_instance(&self, instance: &InstanceRef) -> Result<ShuffleOutcome> {
        let session = SessionConfig::new(&self.profile, &instance.region);
        debug!(
            "Connecting to {} with profile {}",
            session.region, session.profile
        );

        let provider = self.factory.connect(&session).await.map_err(|e| match e {
            Error::Session { .. } => e,
            other => Error::session(&instance.region, other.to_string()),
        })?;

        let directory = StaticIpDirectory::build(provider.as_ref()).await?;
        if directory.is_empty() {
            warn!("No attached static IPs in {}", instance.region);
        }

        reattach_static_ip(provider.as_ref(), &directory, &instance.name).await
    }
}

/// Load the instance list named by `config`, then shuffle every entry
///
/// The list is read, decoded and validated before `factory` is used, so a
/// bad file ends the run with `Error::Config` and no provider call.
///
/// # Returns
///
/// - `Ok(RunReport)`: Every instance was attempted
/// - `Err(Error::Config)`: The list could not be loaded, or `config` is invalid
/// - `Err(Error::Directory)`: Listing failed under `AbortRun`
pub async fn shuffle_instance_list(
    factory: Box<dyn ProviderFactory>,
    config: &ShuffleConfig,
) -> Result<RunReport> {
    let instances = load_instances(&config.instances_path)?;
    let engine = ShuffleEngine::new(factory, config)?;

    engine.run(&instances).await
}
