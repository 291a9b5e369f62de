//! hqsl: sign, verify and convert HQSL cards.
//!
//! ## Usage
//!
//! ```bash
//! # Verify a card (text or hqsl.net URL) against the configured roots
//! hqsl --config hqsl.toml verify 'https://hqsl.net/h#AC1PZ,FN42gv,...'
//!
//! # Sign a card with a private key
//! hqsl sign 'AC1PZ,FN42gv,EA2ESK,202309241038,-06,28.075,FT8,,,UNSIGNED' --key me.asc
//!
//! # Export to ADIF
//! hqsl adif export 'AC1PZ,FN42gv,...' > contact.adi
//! ```
//!
//! Logging goes to stderr; `RUST_LOG` overrides `--verbose`.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hqsl_openpgp::{HqslConfig, HqslOpenPgp};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// HQSL card tool
#[derive(Parser, Debug)]
#[command(name = "hqsl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Key server URL, replaces the configured list (repeatable)
    #[arg(long = "key-server", global = true)]
    key_servers: Vec<String>,

    /// Trusted root key file, added to the configured ones (repeatable)
    #[arg(long = "trusted-key", global = true)]
    trusted_keys: Vec<PathBuf>,

    /// Key server timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify a card; exits non-zero unless it is valid
    Verify {
        /// Card text or URL, `-` for stdin
        card: String,
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
    /// Sign a card and print the signed card text
    Sign {
        /// Card text or URL, `-` for stdin
        card: String,
        /// Private key file
        #[arg(short, long)]
        key: PathBuf,
        /// Passphrase of the private key
        #[arg(short, long)]
        passphrase: Option<String>,
        /// Signature time as yyyyMMddHHmm UTC (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Show what trusted roots certify a key for
    Certifications {
        /// Public key file
        key: PathBuf,
    },
    /// Fetch keys from the key servers
    Lookup {
        /// 0x-prefixed key ID, fingerprint or e-mail
        query: String,
    },
    /// Upload keys to the key servers
    Publish {
        /// Public key file
        key: PathBuf,
        /// Upload to this server only
        #[arg(long)]
        server: Option<String>,
    },
    /// Convert between cards and ADIF
    #[command(subcommand)]
    Adif(AdifCommand),
}

#[derive(Subcommand, Debug)]
enum AdifCommand {
    /// Print a card as an ADI document
    Export {
        /// Card text or URL, `-` for stdin
        card: String,
    },
    /// Print one unsigned card per contact in an ADI file
    Import {
        /// ADI file
        file: PathBuf,
        /// Logging station callsign, if records do not name it
        #[arg(long)]
        call: String,
        /// Logging station grid, if records do not name it
        #[arg(long)]
        grid: String,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> Result<HqslConfig> {
    let mut config = match &args.config {
        Some(path) => HqslConfig::load(path)?,
        None => HqslConfig::default(),
    };
    if !args.key_servers.is_empty() {
        config.key_servers = args.key_servers.clone();
    }
    config.trusted_keys.extend(args.trusted_keys.iter().cloned());
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    config.validate()?;
    debug!(?config, "[hqsl] configuration loaded");
    Ok(config)
}

async fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(&args)?;

    let output = match &args.command {
        Command::Verify { card, json } => {
            let hqsl = HqslOpenPgp::from_config(&config)?;
            let card = commands::read_card(card)?;
            let report = commands::verify(&hqsl, &card).await;
            println!("{}", report.render(*json)?);
            return Ok(if report.verdict.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            });
        }
        Command::Sign {
            card,
            key,
            passphrase,
            at,
        } => commands::sign_card(
            commands::read_card(card)?,
            key,
            passphrase.as_deref(),
            at.as_deref(),
        )?,
        Command::Certifications { key } => {
            commands::certifications(key, &config.load_trusted_keys()?)?
        }
        Command::Lookup { query } => {
            let hqsl = HqslOpenPgp::from_config(&config)?;
            commands::lookup(&hqsl, query).await?
        }
        Command::Publish { key, server } => {
            let hqsl = HqslOpenPgp::from_config(&config)?;
            commands::publish(&hqsl, key, server.as_deref()).await?
        }
        Command::Adif(AdifCommand::Export { card }) => {
            commands::adif_export(&commands::read_card(card)?)?
        }
        Command::Adif(AdifCommand::Import { file, call, grid }) => {
            commands::adif_import(file, call, grid)?
        }
    };

    println!("{output}");
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
