//! Mail provisioner CLI entry point
//!
//! Logs go to stderr; command results are printed to stdout as JSON (or a
//! zone file for `preview --zone`) so they can be piped into other tools.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mail_provisioner_app::{AppConfig, AppState};
use mail_provisioner_core::types::{DnsFields, PlanOptions, ProviderCredentialState};
use mail_provisioner_provider::get_all_provider_metadata;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, env = "MAIL_PROVISIONER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a DNS provider is configured and its credentials work
    Check,
    /// Plan the mail authentication records without touching the provider
    Preview {
        domain: String,
        /// DKIM selector
        #[arg(long)]
        selector: Option<String>,
        /// Print a BIND-style zone fragment instead of JSON
        #[arg(long)]
        zone: bool,
    },
    /// Plan and push the records through the configured provider
    Provision {
        domain: String,
        /// DKIM selector
        #[arg(long)]
        selector: Option<String>,
        /// Persisted DNS fields as JSON (reused instead of regenerating)
        #[arg(long)]
        existing: Option<String>,
        /// Generate a new DKIM key even if one is persisted
        #[arg(long)]
        rotate_dkim: bool,
    },
    /// List supported DNS providers and their credential fields
    Providers,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(filter)
        .init();
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_state(path: Option<&Path>) -> anyhow::Result<AppState> {
    let config = AppConfig::load(path).context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");
    AppState::from_config(&config).context("failed to initialise services")
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Providers => {
            print_json(&get_all_provider_metadata())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            let state = load_state(cli.config.as_deref())?;
            let status = state.provisioning_service.check_provider_configured().await?;
            print_json(&status)?;
            Ok(if status.state == ProviderCredentialState::Invalid {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Commands::Preview {
            domain,
            selector,
            zone,
        } => {
            let state = load_state(cli.config.as_deref())?;
            let plan = state
                .provisioning_service
                .generate_auth_material(&domain, Some(state.selector(selector.as_deref())))
                .await?;
            if zone {
                print!("{}", plan.to_zone_file());
            } else {
                print_json(&plan)?;
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Provision {
            domain,
            selector,
            existing,
            rotate_dkim,
        } => {
            let state = load_state(cli.config.as_deref())?;
            let mut fields: DnsFields = match existing {
                Some(json) => {
                    serde_json::from_str(&json).context("--existing is not valid DNS fields JSON")?
                }
                None => DnsFields::default(),
            };
            if selector.is_some() || fields.selector().is_none() {
                fields.dkim_selector = Some(state.selector(selector.as_deref()).to_string());
            }

            let result = state
                .provisioning_service
                .provision_domain(&domain, &fields, PlanOptions { rotate_dkim })
                .await?;
            if result.success {
                tracing::info!("{}", result.message);
            } else {
                tracing::warn!("{}", result.message);
            }
            print_json(&result)?;
            Ok(if result.success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
