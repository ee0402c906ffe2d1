// # ipshuffle - static IP shuffler
//
// This binary is a THIN integration layer: it parses flags, sets up logging
// and the runtime, then hands the instance list path to
// `ipshuffle_core::shuffle_instance_list` with the Lightsail provider.
//
// ## Flags
//
// - `--instances <path>`: YAML instance list (required)
// - `--aws-profile <name>`: Shared-credentials profile (default: yifan)
// - `--dry-run`: Read from the provider but do not change any static IP
//   (also `IPSHUFFLE_DRY_RUN=true`)
// - `--abort-on-directory-error`: Stop the whole run if listing static IPs
//   fails, instead of skipping that instance
// - `--log-level <level>`: trace, debug, info, warn, error
//   (also `IPSHUFFLE_LOG_LEVEL`)
//
// ## Example
//
// ```bash
// cat > instances.yaml <<EOF
// - region: us-east-1
//   name: vm-a
// - region: us-west-2
//   name: vm-b
// EOF
//
// ipshuffle --instances=instances.yaml --aws-profile=ops
// ```

use anyhow::Result;
use clap::Parser;
use ipshuffle_core::config::DEFAULT_PROFILE;
use ipshuffle_core::{DirectoryFailurePolicy, ShuffleConfig, shuffle_instance_list};
use ipshuffle_provider_lightsail::LightsailFactory;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// - 0: Every instance was attempted (individual failures are only logged)
/// - 1: Configuration error (flags, instance list)
/// - 2: Runtime error (runtime setup, aborted run)
#[derive(Debug, Clone, Copy)]
enum ShuffleExitCode {
    /// Run completed
    Completed = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<ShuffleExitCode> for ExitCode {
    fn from(code: ShuffleExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Cycle the static public IPs of a list of Lightsail instances
#[derive(Parser, Debug)]
#[command(name = "ipshuffle", version, about)]
struct Cli {
    /// File of the instance list
    #[arg(long, value_name = "PATH")]
    instances: PathBuf,

    /// The AWS profile
    #[arg(long = "aws-profile", value_name = "NAME", default_value = DEFAULT_PROFILE)]
    aws_profile: String,

    /// Only log the detach/release/allocate/attach calls
    #[arg(long, env = "IPSHUFFLE_DRY_RUN")]
    dry_run: bool,

    /// Stop the whole run when listing static IPs fails
    #[arg(long)]
    abort_on_directory_error: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", env = "IPSHUFFLE_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn into_config(self) -> ShuffleConfig {
        let mut config = ShuffleConfig::new(self.instances);
        config.profile = self.aws_profile;
        config.dry_run = self.dry_run;
        config.log_level = self.log_level;
        config.directory_failure = if self.abort_on_directory_error {
            DirectoryFailurePolicy::AbortRun
        } else {
            DirectoryFailurePolicy::SkipInstance
        };
        config
    }
}

/// Exit code for a flag parsing outcome
///
/// `--help` and `--version` surface as clap errors that go to stdout and
/// are not failures.
fn parse_error_exit_code(e: &clap::Error) -> ShuffleExitCode {
    if e.use_stderr() {
        ShuffleExitCode::ConfigError
    } else {
        ShuffleExitCode::Completed
    }
}

/// Exit code for a failed run
fn run_error_exit_code(e: &anyhow::Error) -> ShuffleExitCode {
    match e.downcast_ref::<ipshuffle_core::Error>() {
        Some(ipshuffle_core::Error::Config(_)) => ShuffleExitCode::ConfigError,
        _ => ShuffleExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = parse_error_exit_code(&e);
            if e.use_stderr() {
                eprint!("{}", e.render().ansi());
            } else {
                print!("{}", e.render().ansi());
            }
            return code.into();
        }
    };

    let config = cli.into_config();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ShuffleExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ShuffleExitCode::ConfigError.into();
    }

    // Instances are processed one at a time; a single thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ShuffleExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_shuffle(config).await {
            error!("Shuffle aborted: {}", e);
            run_error_exit_code(&e)
        } else {
            ShuffleExitCode::Completed
        }
    });

    result.into()
}

/// Run the shuffle over every instance in the configured list
async fn run_shuffle(config: ShuffleConfig) -> Result<()> {
    info!(
        "Starting ipshuffle: list {}, profile {}",
        config.instances_path.display(),
        config.profile
    );

    let factory = if config.dry_run {
        LightsailFactory::new_dry_run()
    } else {
        LightsailFactory::new()
    };

    let report = shuffle_instance_list(Box::new(factory), &config).await?;

    if report.failed() > 0 {
        info!(
            "{} instance(s) need manual attention, see errors above",
            report.failed()
        );
    }

    Ok(())
}
