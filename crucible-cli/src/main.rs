mod completion;
mod config;
mod config_cmd;
mod dataset;
mod get_client;
mod logging;
mod open;
mod request;
mod upload;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use color_eyre::eyre::Result;

use crate::config::CrucibleConfig;
use crate::config_cmd::ConfigCommand;
use crate::dataset::DatasetCommand;
use crate::get_client::Credentials;
use crate::open::OpenArgs;
use crate::request::RequestCommand;
use crate::upload::UploadArgs;

#[derive(Parser)]
#[clap(
    version,
    about = "Crucible scientific data client",
    propagate_version = false,
    disable_help_subcommand = true
)]
struct Cli {
    /// Show more log messages. Repeat for even more.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Crucible API URL [env: CRUCIBLE_API_URL]
    #[clap(long, global = true)]
    api_url: Option<String>,

    /// Crucible API key [env: CRUCIBLE_API_KEY]
    #[clap(long, global = true)]
    api_key: Option<String>,

    /// Number of times to retry failed requests
    #[clap(long, global = true)]
    retries: Option<u32>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage settings
    #[clap(subcommand)]
    Config(ConfigCommand),

    /// Get, list, or download datasets
    #[clap(subcommand)]
    Dataset(DatasetCommand),

    /// Check on ingestion, SciCat update, and Google Drive transfer requests
    #[clap(subcommand)]
    Request(RequestCommand),

    /// Create a dataset from files and ingest it
    Upload(UploadArgs),

    /// Open a project, sample, or dataset in the Graph Explorer
    Open(OpenArgs),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for. Detected from $SHELL if not given.
        #[clap(value_enum)]
        shell: Option<Shell>,

        /// Print the completion script instead of installing it
        #[clap(long)]
        print: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args: Cli = Cli::parse();
    logging::init_logging(args.verbose)?;

    let credentials = Credentials {
        api_url: args.api_url,
        api_key: args.api_key,
        retries: args.retries,
    };

    match args.command {
        Commands::Config(command) => config_cmd::config_cmd(command),
        Commands::Completion { shell, print } => completion::completion::<Cli>(shell, print),
        Commands::Open(open_args) => open::open(&CrucibleConfig::load_with_env()?, open_args),
        Commands::Dataset(command) => {
            let config = CrucibleConfig::load_with_env()?;
            let client = credentials.get_client(&config)?;
            dataset::dataset_cmd(&client, &config, command).await
        }
        Commands::Request(command) => {
            let config = CrucibleConfig::load_with_env()?;
            let client = credentials.get_client(&config)?;
            request::request_cmd(&client, command).await
        }
        Commands::Upload(upload_args) => {
            let config = CrucibleConfig::load_with_env()?;
            upload::upload(|| credentials.get_client(&config), &config, upload_args).await
        }
    }
}
