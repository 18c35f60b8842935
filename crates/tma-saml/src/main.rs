#![forbid(unsafe_code)]

//! tma-saml CLI: verify a TMA SAML token, check a BSN.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tma_saml::{Claim, EnvCertificateSource, Settings, TmaSaml};

#[derive(Parser)]
#[command(name = "tma-saml", about = "Verify TMA SAML tokens", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a token and print the identity it carries
    Verify {
        /// File holding the token XML
        file: PathBuf,

        /// Primary certificate PEM (default: $TMA_CERTIFICATE)
        #[arg(long)]
        cert: Option<PathBuf>,

        /// Secondary certificate PEM (default: $TMA_CERTIFICATE_SECONDARY)
        #[arg(long = "secondary-cert")]
        secondary_cert: Option<PathBuf>,

        /// Evaluate the validity window at this RFC 3339 time instead of now
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Check a BSN with the 11-test
    CheckBsn {
        /// The number to check
        bsn: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Verify {
            file,
            cert,
            secondary_cert,
            at,
        } => cmd_verify(&file, cert.as_deref(), secondary_cert.as_deref(), at),
        Commands::CheckBsn { bsn } => cmd_check_bsn(&bsn),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn cmd_verify(
    file: &Path,
    cert: Option<&Path>,
    secondary_cert: Option<&Path>,
    at: Option<DateTime<Utc>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let token = read_file(file)?;
    let primary = match cert {
        Some(path) => read_file(path)?,
        None => Settings::from_env()?.primary_pem()?,
    };
    let tma = match secondary_cert {
        Some(path) => TmaSaml::with_certificates(primary, Some(read_file(path)?)),
        None => TmaSaml::with_source(primary, EnvCertificateSource::default()),
    };

    let identity = tma.authenticate_at(&token, at.unwrap_or_else(Utc::now))?;
    println!("user type: {}", identity.user_type);
    match &identity.claim {
        Claim::Citizen(citizen) => println!("bsn: {}", citizen.national_id),
        Claim::Business(business) => {
            println!("kvk: {}", business.registration_number);
            if let Some(branch) = &business.branch_number {
                println!("branch: {branch}");
            }
        }
    }
    println!("valid until: {}", identity.session_valid_until.to_rfc3339());
    Ok(())
}

fn cmd_check_bsn(bsn: &str) -> Result<(), Box<dyn std::error::Error>> {
    tma_saml::validate_bsn(bsn)?;
    println!("OK");
    Ok(())
}

fn read_file(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()).into())
}
