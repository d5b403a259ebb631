//! Realmkey CLI - inspect scoped credential configuration
//!
//! Run `realmkey --help` for usage information.

use clap::{Parser, Subcommand};
use realmkey::config::{Config, LogFormat, LoggingConfig, ScopedAuthenticators};
use realmkey::{CredentialEntry, SchemeCredential, ScopedAuthenticator, Target};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "realmkey",
    about = "Scoped credentials for HTTP authentication - see which credential each target gets",
    version
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and build the authenticators
    Check,

    /// List targets with scoped credentials
    List {
        /// Output format (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show the credential a target would be given
    Resolve {
        /// Target URI, matched exactly
        target: String,
    },
}

/// A stored target, without its secret
#[derive(Serialize)]
struct TargetListing {
    target: String,
    scheme: &'static str,
    username: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path).await?
    } else {
        let default_path = Config::default_path();
        if default_path.exists() {
            Config::load(&default_path).await?
        } else {
            Config::default()
        }
    };

    init_logging(&config.logging, cli.verbose);
    debug!(credentials = config.credentials.len(), "Configuration ready");

    let authenticators = config.scoped_authenticators()?;

    match cli.command {
        Commands::Check => {
            println!(
                "Configuration OK: {} basic and {} ntlm targets",
                authenticators.basic.store().len(),
                authenticators.ntlm.store().len()
            );
        }
        Commands::List { format } => list_targets(&authenticators, &format)?,
        Commands::Resolve { target } => {
            let target = Target::parse(&target)?;
            match authenticators.resolve(&target) {
                Some(credential) => print_credential(&credential),
                None => println!("No credentials for {}", target),
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&logging.level)),
        1 => EnvFilter::from_default_env().add_directive(Level::DEBUG.into()),
        _ => EnvFilter::from_default_env().add_directive(Level::TRACE.into()),
    };

    // Logs go to stderr so command output stays clean
    match logging.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init(),
    }
}

fn list_targets(
    authenticators: &ScopedAuthenticators,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut listings = Vec::new();
    collect_listings(
        &authenticators.basic,
        authenticators.basic.store().targets(),
        &mut listings,
    );
    collect_listings(
        &authenticators.ntlm,
        authenticators.ntlm.store().targets(),
        &mut listings,
    );

    if listings.is_empty() {
        println!("No scoped credentials configured");
        return Ok(());
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&listings)?;
            println!("{}", json);
        }
        _ => {
            println!("{:<50} {:<8} {}", "TARGET", "SCHEME", "USERNAME");
            println!("{}", "-".repeat(72));
            for listing in &listings {
                println!(
                    "{:<50} {:<8} {}",
                    listing.target,
                    listing.scheme,
                    listing.username.as_deref().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}

fn collect_listings<A>(
    authenticator: &A,
    targets: Vec<Target>,
    listings: &mut Vec<TargetListing>,
) where
    A: ScopedAuthenticator<Entry = CredentialEntry>,
{
    for target in targets {
        let entry = authenticator.get_credentials(&target);
        listings.push(TargetListing {
            target: target.to_string(),
            scheme: authenticator.scheme(),
            username: authenticator
                .username_from(entry.as_deref())
                .map(str::to_string),
        });
    }
}

fn print_credential(credential: &SchemeCredential) {
    println!("Scheme:      {}", credential.scheme());
    println!("Username:    {}", credential.username());
    println!("Password:    ********");
    if let Some(nt) = credential.as_nt() {
        println!("Workstation: {}", nt.workstation().unwrap_or("-"));
        println!("Domain:      {}", nt.domain().unwrap_or("-"));
        println!("Principal:   {}", nt.principal());
    }
}
