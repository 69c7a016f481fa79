use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sms_client::client::base_url;
use sms_client::config::{default_config_path, ResolvedConfig};
use sms_client::SmsResponse;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sms-client")]
#[command(about = "Secret Management Service client")]
struct Cli {
    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the service host
    #[arg(long)]
    host: Option<String>,

    /// Override the service port
    #[arg(long)]
    port: Option<u16>,

    /// Override the API version segment (e.g. v1)
    #[arg(long)]
    api_version: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current configuration
    Config,
    /// Show the backend seal status
    Status,
    /// Create a secret domain
    CreateDomain { domain: String },
    /// Delete a secret domain
    DeleteDomain { domain: String },
    /// Store a secret; VALUES is a JSON object
    Store {
        domain: String,
        secret: String,
        values: String,
    },
    /// List secret names in a domain
    List { domain: String },
    /// Print the values of a secret
    Get { domain: String, secret: String },
    /// Delete a secret
    Delete { domain: String, secret: String },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .json(),
        )
        .init();

    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = ResolvedConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load config: {}", config_path.display()))?;

    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(version) = cli.api_version {
        config.version = version;
    }

    let response = match cli.command {
        Command::Config => {
            print_config(&config_path, &config);
            return Ok(ExitCode::SUCCESS);
        }
        Command::Status => config.connect()?.status(),
        Command::CreateDomain { domain } => config.connect()?.create_domain(&domain),
        Command::DeleteDomain { domain } => config.connect()?.delete_domain(&domain),
        Command::Store {
            domain,
            secret,
            values,
        } => {
            let values: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&values).context("VALUES must be a JSON object")?;
            config.connect()?.store_secret(&domain, &secret, &values)
        }
        Command::List { domain } => config.connect()?.list_secret_names(&domain),
        Command::Get { domain, secret } => config.connect()?.get_secret(&domain, &secret),
        Command::Delete { domain, secret } => config.connect()?.delete_secret(&domain, &secret),
    };

    print_response(&response)?;

    Ok(if response.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_config(config_path: &Path, config: &ResolvedConfig) {
    println!("Config file: {}", config_path.display());
    println!(
        "Base URL: {}",
        base_url(&config.host, config.port, Some(&config.version))
    );
    if let Some(ca_cert) = &config.tls.ca_cert {
        println!("CA certificate: {}", ca_cert.display());
    }
    if let Some(client_cert) = &config.tls.client_cert {
        println!("Client certificate: {}", client_cert.display());
    }
}

fn print_response(response: &SmsResponse) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
