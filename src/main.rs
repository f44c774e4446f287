//! Instance Gateway
//!
//! Mock cloud-instance provisioning API. One router serves any number of
//! provisioning domains (the built-in `gaming` and `web` profiles or ones
//! defined in a config file).
//!
//! # Architecture Overview
//!
//! ```text
//!   HTTP request ──▶ http::server ──▶ http::request ──┐
//!                                                    ▼
//!   event JSON ──────────────── invoke ──────▶ ApiEvent
//!                                                    │
//!                                                    ▼
//!                                     api::RequestRouter ──▶ routing (first match)
//!                                                    │
//!                              ┌─────────────────────┼──────────────────────┐
//!                              ▼                     ▼                      ▼
//!                        health check     provisioning::InstanceRepository  provisioning::InstanceProvisioner
//!                                                    │
//!                                                    ▼
//!                                               ApiResponse ──▶ HTTP response / printed envelope
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::io::Read;
use std::path::PathBuf;

use instance_gateway::config::{self, GatewayConfig, Variant};
use instance_gateway::lifecycle::startup;
use instance_gateway::observability::logging::{init_logging, LogOutput};
use instance_gateway::observability::Telemetry;
use instance_gateway::RequestRouter;

#[derive(Parser)]
#[command(name = "instance-gateway", version)]
#[command(about = "Mock cloud-instance provisioning API", long_about = None)]
struct Cli {
    /// TOML configuration file (enables hot reload when serving)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Built-in profile used when no configuration file is given
    #[arg(long, value_enum, default_value_t = VariantArg::Web, global = true)]
    variant: VariantArg,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the API over HTTP (default)
    Serve,
    /// Handle one gateway event and print the response envelope
    Invoke {
        /// Event JSON file, or `-` for stdin
        event: PathBuf,

        /// Pretty-print the envelope
        #[arg(long)]
        pretty: bool,
    },
    /// Validate the configuration and exit
    CheckConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Gaming,
    Web,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Gaming => Variant::Gaming,
            VariantArg::Web => Variant::Web,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::for_variant(cli.variant.into()),
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            init_logging(&config.observability, LogOutput::Stdout)?;
            tracing::info!(
                version = env!("CARGO_PKG_VERSION"),
                bind_address = %config.listener.bind_address,
                request_timeout_secs = config.timeouts.request_secs,
                "instance-gateway starting"
            );
            startup::serve(config, cli.config.as_deref()).await
        }
        Commands::Invoke { event, pretty } => {
            init_logging(&config.observability, LogOutput::Stderr)?;

            let raw = if event.as_os_str() == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                std::fs::read_to_string(&event)?
            };
            let event: serde_json::Value = serde_json::from_str(&raw)
                .map_err(|e| format!("event is not valid JSON: {e}"))?;

            let router = RequestRouter::builder(&config)
                .telemetry(Telemetry::logs_only(env!("CARGO_PKG_NAME")))
                .build();
            let response = router.handle_value(&event);

            let out = if pretty {
                serde_json::to_string_pretty(&response)?
            } else {
                serde_json::to_string(&response)?
            };
            println!("{out}");
            Ok(())
        }
        Commands::CheckConfig => {
            let names: Vec<&str> = config.domains.iter().map(|d| d.name.as_str()).collect();
            println!(
                "configuration OK: {} domain(s) [{}], listening on {}",
                names.len(),
                names.join(", "),
                config.listener.bind_address
            );
            Ok(())
        }
    }
}
