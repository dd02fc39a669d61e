//! CyberGuard CLI - Sign in and run scans from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Create an account
//! cyberguard sign-up -e analyst@example.com -n "Ada Analyst"
//!
//! # Show the signed-in identity and role
//! cyberguard whoami -e analyst@example.com
//!
//! # Check whether the admin pages would render
//! cyberguard check-access -e analyst@example.com --admin
//!
//! # Scan a URL, or a file
//! cyberguard scan -e analyst@example.com url http://example.com
//! cyberguard scan -e analyst@example.com file invoice.pdf --file ./invoice.pdf
//! ```
//!
//! # Environment Variables
//!
//! - `CYBERGUARD_SUPABASE_URL` - Backend project URL
//! - `CYBERGUARD_SUPABASE_ANON_KEY` - Backend anon key
//! - `CYBERGUARD_PASSWORD` - Account password (instead of `--password`)
//! - `RUST_LOG` - Log filter (default: `info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cyberguard_client::{ClientConfig, ClientState};
use cyberguard_core::ScanType;

mod commands;

#[derive(Parser)]
#[command(name = "cyberguard")]
#[command(author, version, about = "CyberGuard scanning client")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    SignUp {
        #[command(flatten)]
        account: Account,

        /// Full name stored in the profile
        #[arg(short, long)]
        name: String,
    },
    /// Show the signed-in user and role
    Whoami {
        #[command(flatten)]
        account: Account,
    },
    /// Check page access for an account (or anonymously without --email)
    CheckAccess {
        /// Account email; omit to check as an anonymous visitor
        #[arg(short, long)]
        email: Option<String>,

        /// Account password
        #[arg(long, env = "CYBERGUARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Allow anonymous visitors
        #[arg(long)]
        public: bool,

        /// Require admin membership
        #[arg(long)]
        admin: bool,
    },
    /// Submit a scan and print the result
    Scan {
        #[command(flatten)]
        account: Account,

        /// Scan type (url, email, message, file, website, qr)
        scan_type: ScanType,

        /// Value to scan (URL, address, message text, file name, ...)
        input: String,

        /// File to attach, sent base64-encoded
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Credentials of the account to act as.
#[derive(Args)]
struct Account {
    /// Account email
    #[arg(short, long)]
    email: String,

    /// Account password
    #[arg(long, env = "CYBERGUARD_PASSWORD", hide_env_values = true)]
    password: String,
}

impl Account {
    fn into_credentials(self) -> commands::Credentials {
        commands::Credentials {
            email: self.email,
            password: SecretString::from(self.password),
        }
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // Logs go to stderr so stdout carries only command output
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let config = ClientConfig::from_env()?;
    let state = ClientState::from_config(&config);

    match cli.command {
        Commands::SignUp { account, name } => {
            commands::account::sign_up(&state, &account.into_credentials(), &name).await?;
        }
        Commands::Whoami { account } => {
            commands::account::whoami(&state, &account.into_credentials()).await?;
        }
        Commands::CheckAccess {
            email,
            password,
            public,
            admin,
        } => {
            let credentials = email.map(|email| commands::Credentials {
                email,
                password: SecretString::from(password.unwrap_or_default()),
            });
            commands::account::check_access(&state, credentials.as_ref(), !public, admin).await?;
        }
        Commands::Scan {
            account,
            scan_type,
            input,
            file,
        } => {
            commands::scan::run(
                &state,
                &account.into_credentials(),
                scan_type,
                input,
                file.as_deref(),
            )
            .await?;
        }
    }
    Ok(())
}
