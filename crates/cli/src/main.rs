//! docrouter - reroute office documents to Google Docs
//!
//! Command-line entry point. Wires the environment-provided configuration,
//! the keychain-backed authenticator, and the routing services together,
//! and exposes them as subcommands. The GUI surfaces consume the same
//! services through the library crates.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use docrouter_core::ports::ReplacementProtocol;
use docrouter_core::RouterService;
use docrouter_domain::{error_label, RouterEvent};
use docrouter_infra::{
    AccountStore, AppConfig, DriveUploader, FileReplacer, GoogleAuthenticator, KeychainProvider,
    OAuthHttpClient, OriginalFileStore, OsTrash, SystemOpener, XattrMarkerStore,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod selector;

use selector::PromptAccountSelector;

#[derive(Parser)]
#[command(name = "docrouter", version, about = "Reroutes local office documents to Google Docs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in a Google account through the browser
    SignIn,
    /// Sign out an account, discarding its tokens
    SignOut {
        /// Account id as printed by `accounts`
        account_id: String,
    },
    /// List signed-in accounts
    Accounts,
    /// Route files: upload, convert, and replace with shortcuts
    Route {
        /// Files to route
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Restore originals from shortcut files
    Restore {
        /// Shortcut files to restore
        #[arg(required = true)]
        shortcuts: Vec<PathBuf>,
    },
    /// Set (or clear) an account's preferred upload folder
    SetFolder {
        /// Account id as printed by `accounts`
        account_id: String,
        /// Drive folder name; omit to clear the preference
        folder_name: Option<String>,
    },
}

struct AppContext {
    authenticator: Arc<GoogleAuthenticator>,
    router: Arc<RouterService>,
    replacer: Arc<FileReplacer>,
}

fn build_context() -> anyhow::Result<AppContext> {
    let config = AppConfig::from_env();

    let keychain = Arc::new(KeychainProvider::new(docrouter_domain::constants::KEYCHAIN_SERVICE));
    let opener = Arc::new(SystemOpener);
    let markers = Arc::new(XattrMarkerStore);

    let authenticator = Arc::new(GoogleAuthenticator::new(
        config.clone(),
        OAuthHttpClient::new(config.client_id.clone(), config.client_secret.clone()),
        AccountStore::new(keychain),
        opener.clone(),
    ));

    let replacer = Arc::new(FileReplacer::new(
        OriginalFileStore::default_location()?,
        Arc::new(OsTrash),
        markers.clone(),
    ));

    let uploader =
        Arc::new(DriveUploader::new(authenticator.clone(), config.default_folder_id.clone()));
    let selector = Arc::new(PromptAccountSelector::new(authenticator.clone()));

    let router = Arc::new(RouterService::new(
        selector,
        uploader,
        replacer.clone(),
        markers,
        opener,
    ));

    Ok(AppContext { authenticator, router, replacer })
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let ctx = build_context()?;

    match cli.command {
        Command::SignIn => {
            let account = ctx.authenticator.sign_in().await?;
            println!("Signed in as {} ({})", account.email, account.id);
            Ok(ExitCode::SUCCESS)
        }

        Command::SignOut { account_id } => {
            ctx.authenticator.sign_out(&account_id).await?;
            println!("Signed out {account_id}");
            Ok(ExitCode::SUCCESS)
        }

        Command::Accounts => {
            let accounts = ctx.authenticator.accounts().await;
            if accounts.is_empty() {
                println!("No accounts signed in.");
            }
            for account in accounts {
                let folder = account
                    .preferred_folder_name
                    .as_deref()
                    .map(|name| format!(" (folder: {name})"))
                    .unwrap_or_default();
                println!("{}  {}{}", account.id, account.email, folder);
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Route { files } => {
            let mut events = ctx.router.subscribe();
            let mut failures = false;

            for file in files {
                if !ctx.router.route(&file).await {
                    eprintln!("{}: unsupported file type, skipping", file.display());
                    continue;
                }

                while let Ok(event) = events.try_recv() {
                    match event {
                        RouterEvent::Started(message) => info!("{message}"),
                        RouterEvent::Finished(message) => println!("{message}"),
                        RouterEvent::Failed(err) => {
                            failures = true;
                            eprintln!("{}: {} ({})", file.display(), err, error_label(&err));
                        }
                    }
                }
            }

            Ok(if failures { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }

        Command::Restore { shortcuts } => {
            let mut failures = false;

            for shortcut in shortcuts {
                match ctx.replacer.restore(&shortcut).await {
                    Ok(restored) => println!("Restored {}", restored.display()),
                    Err(err) => {
                        failures = true;
                        eprintln!("Failed to restore {}: {err}", shortcut.display());
                    }
                }
            }

            Ok(if failures { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }

        Command::SetFolder { account_id, folder_name } => {
            ctx.authenticator.set_preferred_folder_name(&account_id, folder_name.clone()).await?;
            match folder_name {
                Some(name) => println!("Uploads for {account_id} will land in \"{name}\""),
                None => println!("Cleared folder preference for {account_id}"),
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Ok(path) = dotenvy::dotenv() {
        eprintln!("Loaded environment from {}", path.display());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docrouter=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
