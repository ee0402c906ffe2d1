// # Lightsail Static IP Provider
//
// This crate implements the ipshuffle provider traits on top of the AWS
// Lightsail control plane.
//
// - One SDK request per trait call
// - Errors returned as-is to the engine (no retry, no backoff, no rollback);
//   rejected credentials come back as a session error for the region
// - Credentials resolved from a named shared-credentials profile; nothing
//   secret is ever passed inline or logged
// - Dry-run mode: list/get calls go out, mutating calls are only logged
//
// ## API Reference
//
// - GetStaticIps, GetInstance
// - DetachStaticIp, ReleaseStaticIp, AllocateStaticIp, AttachStaticIp

use async_trait::async_trait;
use aws_sdk_lightsail::Client;
use aws_sdk_lightsail::config::Region;
use aws_sdk_lightsail::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_lightsail::types;
use ipshuffle_core::traits::{InstanceDetails, ProviderFactory, StaticIp, StaticIpProvider};
use ipshuffle_core::{Error, Result, SessionConfig};
use std::net::IpAddr;

const PROVIDER_NAME: &str = "lightsail";

/// Lightsail provider bound to one region
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform GetStaticIps and GetInstance requests
/// - Log the detach/release/allocate/attach it would have issued
/// - **NOT** change any static IP
pub struct LightsailProvider {
    /// SDK client scoped to `region`
    client: Client,

    /// Region the client is bound to
    region: String,

    /// Dry-run mode: if true, skip mutating requests
    dry_run: bool,
}

impl std::fmt::Debug for LightsailProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightsailProvider")
            .field("region", &self.region)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl LightsailProvider {
    /// Wrap an SDK client
    ///
    /// # Parameters
    ///
    /// - `client`: Lightsail client already configured for `region`
    /// - `region`: Region name, used for logging and errors
    /// - `dry_run`: If true, perform reads but skip mutating requests
    pub fn new(client: Client, region: impl Into<String>, dry_run: bool) -> Self {
        Self {
            client,
            region: region.into(),
            dry_run,
        }
    }

    /// Whether mutating requests are suppressed
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// In dry-run mode, log the request and report that it must be skipped
    fn skip_mutation(&self, action: &str, static_ip_name: &str) -> bool {
        if self.dry_run {
            tracing::info!(
                "[dry-run] Would {} static IP {:?} in {}",
                action,
                static_ip_name,
                self.region
            );
        }
        self.dry_run
    }
}

#[async_trait]
impl StaticIpProvider for LightsailProvider {
    /// List every static IP in the region, following page tokens
    async fn list_static_ips(&self) -> Result<Vec<StaticIp>> {
        let mut static_ips = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let output = self
                .client
                .get_static_ips()
                .set_page_token(page_token.take())
                .send()
                .await
                .map_err(|e| sdk_error(&self.region, "GetStaticIps", e))?;

            static_ips.extend(output.static_ips().iter().filter_map(static_ip_from_sdk));

            match output.next_page_token() {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(
            "GetStaticIps returned {} allocation(s) in {}",
            static_ips.len(),
            self.region
        );
        Ok(static_ips)
    }

    async fn get_instance(&self, instance_name: &str) -> Result<InstanceDetails> {
        let output = self
            .client
            .get_instance()
            .instance_name(instance_name)
            .send()
            .await
            .map_err(|e| sdk_error(&self.region, "GetInstance", e))?;

        let instance = output.instance().ok_or_else(|| {
            Error::provider(
                PROVIDER_NAME,
                format!("GetInstance returned no instance for {}", instance_name),
            )
        })?;

        Ok(instance_from_sdk(instance_name, instance))
    }

    async fn detach_static_ip(&self, static_ip_name: &str) -> Result<()> {
        if self.skip_mutation("detach", static_ip_name) {
            return Ok(());
        }

        self.client
            .detach_static_ip()
            .static_ip_name(static_ip_name)
            .send()
            .await
            .map_err(|e| sdk_error(&self.region, "DetachStaticIp", e))?;
        Ok(())
    }

    async fn release_static_ip(&self, static_ip_name: &str) -> Result<()> {
        if self.skip_mutation("release", static_ip_name) {
            return Ok(());
        }

        self.client
            .release_static_ip()
            .static_ip_name(static_ip_name)
            .send()
            .await
            .map_err(|e| sdk_error(&self.region, "ReleaseStaticIp", e))?;
        Ok(())
    }

    async fn allocate_static_ip(&self, static_ip_name: &str) -> Result<()> {
        if self.skip_mutation("allocate", static_ip_name) {
            return Ok(());
        }

        self.client
            .allocate_static_ip()
            .static_ip_name(static_ip_name)
            .send()
            .await
            .map_err(|e| sdk_error(&self.region, "AllocateStaticIp", e))?;
        Ok(())
    }

    async fn attach_static_ip(&self, static_ip_name: &str, instance_name: &str) -> Result<()> {
        if self.skip_mutation(&format!("attach to {}", instance_name), static_ip_name) {
            return Ok(());
        }

        self.client
            .attach_static_ip()
            .static_ip_name(static_ip_name)
            .instance_name(instance_name)
            .send()
            .await
            .map_err(|e| sdk_error(&self.region, "AttachStaticIp", e))?;
        Ok(())
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Convert a listed allocation; entries without a name are dropped
fn static_ip_from_sdk(ip: &types::StaticIp) -> Option<StaticIp> {
    let name = ip.name()?;

    Some(StaticIp {
        name: name.to_string(),
        ip_address: ip.ip_address().and_then(parse_ip),
        attached_to: ip
            .attached_to()
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    })
}

fn instance_from_sdk(requested_name: &str, instance: &types::Instance) -> InstanceDetails {
    InstanceDetails {
        name: instance.name().unwrap_or(requested_name).to_string(),
        public_ip: instance.public_ip_address().and_then(parse_ip),
    }
}

fn parse_ip(raw: &str) -> Option<IpAddr> {
    match raw.parse() {
        Ok(ip) => Some(ip),
        Err(_) => {
            tracing::warn!("Ignoring unparseable IP address {:?}", raw);
            None
        }
    }
}

/// Service error codes meaning the profile's credentials were not accepted
const CREDENTIAL_ERROR_CODES: &[&str] = &[
    "UnrecognizedClientException",
    "UnauthenticatedException",
    "InvalidClientTokenId",
    "InvalidSignatureException",
    "SignatureDoesNotMatch",
    "IncompleteSignature",
    "ExpiredTokenException",
    "ExpiredToken",
];

fn is_credential_error(code: Option<&str>) -> bool {
    code.is_some_and(|code| CREDENTIAL_ERROR_CODES.contains(&code))
}

/// Map an SDK failure to a core error
///
/// Rejected credentials become a session error for `region`; everything
/// else is a provider error. Service error codes that point at a local fix
/// get a hint in front of the full error chain.
fn sdk_error<E, R>(region: &str, operation: &str, err: SdkError<E, R>) -> Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if is_credential_error(err.code()) {
        return Error::session(
            region,
            format!(
                "{} rejected the credentials: check the AWS profile. {}",
                operation,
                DisplayErrorContext(&err)
            ),
        );
    }

    let hint = match err.code() {
        Some("AccessDeniedException") => {
            "Access denied: check the AWS profile's permissions. "
        }
        Some("NotFoundException") => "Resource not found. ",
        Some("OperationFailureException") => "Operation failed on the Lightsail side. ",
        _ => "",
    };

    Error::provider(
        PROVIDER_NAME,
        format!("{} failed: {}{}", operation, hint, DisplayErrorContext(&err)),
    )
}

/// Session factory for Lightsail providers
///
/// Resolves credentials from the named profile and binds each client to
/// the requested region. No request is sent until the first trait call.
#[derive(Debug, Clone, Default)]
pub struct LightsailFactory {
    dry_run: bool,
}

impl LightsailFactory {
    /// Create a factory for live providers
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a factory whose providers skip mutating requests
    pub fn new_dry_run() -> Self {
        tracing::warn!("Lightsail provider running in DRY-RUN mode - no static IP will change");
        Self { dry_run: true }
    }
}

#[async_trait]
impl ProviderFactory for LightsailFactory {
    async fn connect(&self, session: &SessionConfig) -> Result<Box<dyn StaticIpProvider>> {
        if session.region.trim().is_empty() {
            return Err(Error::session(&session.region, "region cannot be empty"));
        }
        if session.profile.trim().is_empty() {
            return Err(Error::session(&session.region, "AWS profile cannot be empty"));
        }

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .profile_name(&session.profile)
            .region(Region::new(session.region.clone()))
            .load()
            .await;

        tracing::debug!(
            "Lightsail client for {} using profile {}",
            session.region,
            session.profile
        );

        Ok(Box::new(LightsailProvider::new(
            Client::new(&sdk_config),
            session.region.clone(),
            self.dry_run,
        )))
    }
}
