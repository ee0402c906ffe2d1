//! Test doubles and common utilities for contract tests
//!
//! The fake provider records every call in order and can be told to fail
//! individual operations, so tests can assert on exact call sequences
//! without a network.

#![allow(dead_code)]

use ipshuffle_core::error::{Error, Result};
use ipshuffle_core::traits::{InstanceDetails, ProviderFactory, StaticIp, StaticIpProvider};
use ipshuffle_core::{SessionConfig, ShuffleConfig};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// Address reported for an instance after its static IP was reattached
pub const FRESH_IP: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(203, 0, 113, 99));

/// A provider call, as recorded by [`RecordingProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect { region: String, profile: String },
    ListStaticIps { region: String },
    GetInstance(String),
    Detach(String),
    Release(String),
    Allocate(String),
    Attach { static_ip: String, instance: String },
}

impl Call {
    /// Whether this call changes provider state
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::Detach(_) | Call::Release(_) | Call::Allocate(_) | Call::Attach { .. }
        )
    }
}

/// Operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    GetInstance,
    Detach,
    Release,
    Allocate,
    Attach,
}

/// Provider-side state of one region
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    static_ips: Vec<StaticIp>,
    instances: HashMap<String, IpAddr>,
    fail_on: HashSet<Op>,
    credentials_rejected: bool,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing instance with its current public address
    pub fn with_instance(mut self, name: &str, ip: [u8; 4]) -> Self {
        self.instances.insert(name.to_string(), IpAddr::from(ip));
        self
    }

    /// Add a static IP allocation
    pub fn with_static_ip(mut self, name: &str, attached_to: Option<&str>) -> Self {
        self.static_ips.push(StaticIp::new(name, attached_to));
        self
    }

    /// Add a static IP allocation that reports its reserved address
    pub fn with_static_ip_address(
        mut self,
        name: &str,
        attached_to: Option<&str>,
        ip: [u8; 4],
    ) -> Self {
        self.static_ips
            .push(StaticIp::new(name, attached_to).with_ip_address(IpAddr::from(ip)));
        self
    }

    /// Reject the session's credentials on the first control-plane call
    pub fn with_rejected_credentials(mut self) -> Self {
        self.credentials_rejected = true;
        self
    }

    /// Make every call of `op` fail
    pub fn failing(mut self, op: Op) -> Self {
        self.fail_on.insert(op);
        self
    }
}

/// A fake StaticIpProvider that records calls
pub struct RecordingProvider {
    region: String,
    scenario: Scenario,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl RecordingProvider {
    pub fn new(region: &str, scenario: Scenario) -> Self {
        Self::with_log(region, scenario, Arc::new(Mutex::new(Vec::new())))
    }

    fn with_log(region: &str, scenario: Scenario, calls: Arc<Mutex<Vec<Call>>>) -> Self {
        Self {
            region: region.to_string(),
            scenario,
            calls,
        }
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the calls that change provider state
    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    fn record(&self, call: Call, op: Op) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.scenario.fail_on.contains(&op) {
            return Err(Error::provider("fake", format!("injected {:?} failure", op)));
        }
        Ok(())
    }

    fn was_reattached(&self, instance_name: &str) -> bool {
        self.calls.lock().unwrap().iter().any(
            |call| matches!(call, Call::Attach { instance, .. } if instance == instance_name),
        )
    }
}

#[async_trait::async_trait]
impl StaticIpProvider for RecordingProvider {
    async fn list_static_ips(&self) -> Result<Vec<StaticIp>> {
        self.record(
            Call::ListStaticIps {
                region: self.region.clone(),
            },
            Op::List,
        )?;
        if self.scenario.credentials_rejected {
            return Err(Error::session(
                &self.region,
                "UnrecognizedClientException: The security token included in the request is invalid",
            ));
        }
        Ok(self.scenario.static_ips.clone())
    }

    async fn get_instance(&self, instance_name: &str) -> Result<InstanceDetails> {
        self.record(Call::GetInstance(instance_name.to_string()), Op::GetInstance)?;

        let ip = self.scenario.instances.get(instance_name).ok_or_else(|| {
            Error::provider("fake", format!("NotFoundException: {}", instance_name))
        })?;

        let public_ip = if self.was_reattached(instance_name) {
            FRESH_IP
        } else {
            *ip
        };

        Ok(InstanceDetails {
            name: instance_name.to_string(),
            public_ip: Some(public_ip),
        })
    }

    async fn detach_static_ip(&self, static_ip_name: &str) -> Result<()> {
        self.record(Call::Detach(static_ip_name.to_string()), Op::Detach)
    }

    async fn release_static_ip(&self, static_ip_name: &str) -> Result<()> {
        self.record(Call::Release(static_ip_name.to_string()), Op::Release)
    }

    async fn allocate_static_ip(&self, static_ip_name: &str) -> Result<()> {
        self.record(Call::Allocate(static_ip_name.to_string()), Op::Allocate)
    }

    async fn attach_static_ip(&self, static_ip_name: &str, instance_name: &str) -> Result<()> {
        self.record(
            Call::Attach {
                static_ip: static_ip_name.to_string(),
                instance: instance_name.to_string(),
            },
            Op::Attach,
        )
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}

/// A fake ProviderFactory; regions without a scenario fail to connect
#[derive(Clone, Default)]
pub struct FakeFactory {
    regions: HashMap<String, Scenario>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: &str, scenario: Scenario) -> Self {
        self.regions.insert(region.to_string(), scenario);
        self
    }

    /// Calls made through every provider this factory handed out
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Connect { .. }))
            .count()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }
}

#[async_trait::async_trait]
impl ProviderFactory for FakeFactory {
    async fn connect(&self, session: &SessionConfig) -> Result<Box<dyn StaticIpProvider>> {
        self.calls.lock().unwrap().push(Call::Connect {
            region: session.region.clone(),
            profile: session.profile.clone(),
        });

        let scenario = self.regions.get(&session.region).cloned().ok_or_else(|| {
            Error::session(&session.region, "no credentials for region")
        })?;

        Ok(Box::new(RecordingProvider::with_log(
            &session.region,
            scenario,
            Arc::clone(&self.calls),
        )))
    }
}

/// Helper to create a minimal ShuffleConfig for testing
pub fn minimal_config() -> ShuffleConfig {
    ShuffleConfig::new("instances.yaml")
}
