use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use monitor_client::api::MonitorId;
use monitor_client::api::http::HttpMonitorApi;
use monitor_client::client::{DeleteOutcome, MonitorClient, MonitorFields, SubmitOutcome};
use monitor_client::config::{ClientConfig, ConfigError};
use monitor_client::identity::get_or_create_user_key;
use monitor_client::storage::{FileStore, StorageError};
use monitor_client::terminal::{TerminalPrompt, TerminalView};
use monitor_client::view::ListView;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Api(#[from] monitor_client::api::ApiError),
    #[error("no storage location; pass --storage or set MONITOR_STORAGE_PATH")]
    MissingStoragePath,
}

#[derive(Parser, Debug)]
#[command(name = "monitor", about = "List, add and delete page monitors")]
struct Cli {
    /// API base URL (overrides MONITOR_API_URL).
    #[arg(long)]
    api_url: Option<String>,

    /// Identity store file (overrides MONITOR_STORAGE_PATH).
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print this machine's user key.
    Key,
    /// Show all monitors.
    List,
    /// Start monitoring a page element.
    Add {
        #[arg(long)]
        url: String,
        #[arg(long)]
        selector: String,
        #[arg(long)]
        email: String,
    },
    /// Delete a monitor by id.
    Delete {
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url.as_deref() {
        config = config.with_api_url(api_url)?;
    }

    let storage_path = cli
        .storage
        .or_else(|| config.storage_path.clone())
        .or_else(FileStore::default_path)
        .ok_or(CliError::MissingStoragePath)?;
    let mut store = FileStore::new(storage_path);
    let user_key = get_or_create_user_key(&mut store)?;

    if matches!(cli.command, Command::Key) {
        println!("{user_key}");
        return Ok(ExitCode::SUCCESS);
    }

    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let api = HttpMonitorApi::new(&config)?;
    tracing::debug!(api_url = api.base_url(), "using monitor API");
    let mut client = MonitorClient::new(api, user_key, TerminalView::default(), TerminalPrompt::stdio(assume_yes));
    client.startup().await;

    let succeeded = match cli.command {
        Command::Key => true,
        Command::List => !matches!(client.rendered(), ListView::Error(_)),
        Command::Add { url, selector, email } => {
            let fields = MonitorFields { url, css_selector: selector, user_email: email };
            match client.handle_form_submit(fields).await {
                SubmitOutcome::Created(id) => {
                    eprintln!("created monitor {id}");
                    true
                }
                SubmitOutcome::Failed | SubmitOutcome::Busy => false,
            }
        }
        Command::Delete { id, .. } => match client.handle_delete(&MonitorId::from(id)).await {
            DeleteOutcome::Deleted | DeleteOutcome::Declined => true,
            DeleteOutcome::Failed => false,
        },
    };

    print!("{}", client.view().render_text());
    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
