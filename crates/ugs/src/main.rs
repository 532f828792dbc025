mod commands;
mod context;
mod error;
mod progress;
mod utils;

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use commands::fetch::{FetchArgs, ServiceKind};
use context::GlobalOptions;
use error::{CliError, EXIT_SUCCESS};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use ugs_cloud_save::CreateIndexInput;
use ugs_core::CancellationToken;
use ugs_gsh::FilesListInput;
use utils::Output;

#[derive(Parser)]
#[command(name = "ugs")]
#[command(about = "Command-line client for Unity Gaming Services", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Project the command runs against (UGS_CLI_PROJECT_ID)
    #[arg(short = 'p', long, global = true)]
    project_id: Option<String>,

    /// Environment the command runs against (UGS_CLI_ENVIRONMENT_NAME)
    #[arg(short = 'e', long, global = true)]
    environment_name: Option<String>,

    /// Only print results and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Print results as JSON
    #[arg(short, long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile local resource files against the remote services
    Fetch {
        /// Directory or file holding the resource files
        path: PathBuf,
        /// Show what would change without modifying anything
        #[arg(long)]
        dry_run: bool,
        /// Delete remote resources that have no local file
        #[arg(long)]
        reconcile: bool,
        /// Services to fetch (default: cloud-save, remote-config, and ccd with --ccd-bucket)
        #[arg(short = 's', long = "services", value_enum, value_delimiter = ',')]
        services: Vec<ServiceKind>,
        /// CCD bucket the content directory is fetched against.
        /// Every file is uploaded except .rc and .csi definitions
        #[arg(long)]
        ccd_bucket: Option<String>,
    },
    /// Cloud Save commands
    #[command(subcommand)]
    CloudSave(CloudSaveCommands),
    /// Remote Config commands
    #[command(subcommand)]
    RemoteConfig(RemoteConfigCommands),
    /// Cloud Content Delivery commands
    #[command(subcommand)]
    Ccd(CcdCommands),
    /// Game Server Hosting commands
    #[command(subcommand)]
    Gsh(GshCommands),
    /// Manage the CLI configuration
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Print version information
    Version,
}

#[derive(Subcommand)]
enum CloudSaveCommands {
    /// Cloud Save data
    #[command(subcommand)]
    Data(CloudSaveDataCommands),
}

#[derive(Subcommand)]
enum CloudSaveDataCommands {
    /// Query indexes
    #[command(subcommand)]
    Index(IndexCommands),
}

#[derive(Subcommand)]
enum IndexCommands {
    /// List the indexes of the environment
    List,
    /// Indexes over player data
    #[command(subcommand)]
    Player(PlayerIndexCommands),
    /// Indexes over custom entity data
    #[command(subcommand)]
    Custom(CustomIndexCommands),
}

#[derive(Args)]
struct IndexDefinition {
    /// Index fields as a JSON array, e.g. '[{"key":"level","asc":true}]'
    #[arg(long)]
    fields: Option<String>,
    /// Request body as JSON, or a path to a file containing it
    #[arg(long)]
    body: Option<String>,
}

#[derive(Subcommand)]
enum PlayerIndexCommands {
    /// Create a player index
    Create {
        #[command(flatten)]
        definition: IndexDefinition,
        /// default, public or protected
        #[arg(long)]
        visibility: Option<String>,
    },
}

#[derive(Subcommand)]
enum CustomIndexCommands {
    /// Create a custom entity index
    Create {
        #[command(flatten)]
        definition: IndexDefinition,
    },
}

#[derive(Subcommand)]
enum RemoteConfigCommands {
    /// List the settings of the environment
    List,
}

#[derive(Subcommand)]
enum CcdCommands {
    /// Buckets of the environment
    #[command(subcommand)]
    Buckets(CcdBucketCommands),
    /// Entries of a bucket
    #[command(subcommand)]
    Entries(CcdEntryCommands),
}

#[derive(Subcommand)]
enum CcdBucketCommands {
    /// List buckets
    List,
}

#[derive(Subcommand)]
enum CcdEntryCommands {
    /// List the entries of a bucket
    List {
        #[arg(long)]
        bucket_name: String,
    },
    /// Download the content of an entry
    Download {
        #[arg(long)]
        bucket_name: String,
        /// Path of the entry within the bucket
        #[arg(long)]
        entry_path: String,
        /// Entry version (default: current)
        #[arg(long)]
        version_id: Option<String>,
        /// Destination file (default: entry file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum GshCommands {
    /// Game servers
    #[command(subcommand)]
    Server(GshServerCommands),
}

#[derive(Subcommand)]
enum GshServerCommands {
    /// Files stored on game servers
    #[command(subcommand)]
    Files(GshFileCommands),
}

#[derive(Subcommand)]
enum GshFileCommands {
    /// List server files
    List {
        /// Server ids to list files for
        #[arg(long = "server-id", required = true, num_args = 1.., value_delimiter = ',')]
        server_ids: Vec<String>,
        /// Only list files whose path matches
        #[arg(long)]
        path_filter: Option<String>,
        /// Maximum number of files
        #[arg(long)]
        limit: Option<u32>,
        /// Only files modified after this date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        modified_from: Option<String>,
        /// Only files modified before this date (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        modified_to: Option<String>,
    },
    /// Download a server file
    Download {
        #[arg(long)]
        server_id: String,
        /// Path of the file on the server
        #[arg(long)]
        path: String,
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
    /// Remove a configuration value
    Delete { key: String },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let code = match run(cli, &cancel).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let error = CliError::classify(e);
            if let CliError::Unhandled(inner) = &error {
                tracing::error!(error = ?inner, "Unhandled error");
            }
            eprintln!("{}", error.display_message().red());
            error.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli, cancel: &CancellationToken) -> anyhow::Result<()> {
    let options = GlobalOptions {
        project_id: cli.global.project_id,
        environment_name: cli.global.environment_name,
    };
    let output = Output {
        json: cli.global.json,
        quiet: cli.global.quiet,
    };

    match cli.command {
        Commands::Version => {
            println!("ugs {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Fetch {
            path,
            dry_run,
            reconcile,
            services,
            ccd_bucket,
        } => {
            let args = FetchArgs {
                path,
                dry_run,
                reconcile,
                services,
                ccd_bucket,
            };
            commands::fetch::handle(&options, args, output, cancel).await
        }
        Commands::CloudSave(CloudSaveCommands::Data(CloudSaveDataCommands::Index(index))) => {
            match index {
                IndexCommands::List => {
                    commands::cloud_save::list_indexes(&options, output, cancel).await
                }
                IndexCommands::Player(PlayerIndexCommands::Create {
                    definition,
                    visibility,
                }) => {
                    let input = CreateIndexInput {
                        fields: definition.fields,
                        body: definition.body,
                        visibility,
                    };
                    commands::cloud_save::create_index(&options, input, false, output, cancel)
                        .await
                }
                IndexCommands::Custom(CustomIndexCommands::Create { definition }) => {
                    let input = CreateIndexInput {
                        fields: definition.fields,
                        body: definition.body,
                        visibility: None,
                    };
                    commands::cloud_save::create_index(&options, input, true, output, cancel)
                        .await
                }
            }
        }
        Commands::RemoteConfig(RemoteConfigCommands::List) => {
            commands::remote_config::list(&options, output, cancel).await
        }
        Commands::Ccd(CcdCommands::Buckets(CcdBucketCommands::List)) => {
            commands::ccd::list_buckets(&options, output, cancel).await
        }
        Commands::Ccd(CcdCommands::Entries(entries)) => match entries {
            CcdEntryCommands::List { bucket_name } => {
                commands::ccd::list_entries(&options, &bucket_name, output, cancel).await
            }
            CcdEntryCommands::Download {
                bucket_name,
                entry_path,
                version_id,
                output: dest,
            } => {
                commands::ccd::download_entry(
                    &options,
                    &bucket_name,
                    &entry_path,
                    version_id.as_deref(),
                    dest,
                    output,
                    cancel,
                )
                .await
            }
        },
        Commands::Gsh(GshCommands::Server(GshServerCommands::Files(files))) => match files {
            GshFileCommands::List {
                server_ids,
                path_filter,
                limit,
                modified_from,
                modified_to,
            } => {
                let input = FilesListInput {
                    server_ids,
                    path_filter,
                    limit,
                    modified_from,
                    modified_to,
                };
                commands::gsh::list_files(&options, input, output, cancel).await
            }
            GshFileCommands::Download {
                server_id,
                path,
                output: dest,
            } => commands::gsh::download_file(&options, &server_id, &path, &dest, output, cancel)
                .await,
        },
        Commands::Config(config) => match config {
            ConfigCommands::Get { key } => commands::config::get(&key),
            ConfigCommands::Set { key, value } => commands::config::set(&key, &value, output),
            ConfigCommands::Delete { key } => commands::config::delete(&key, output),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch_services() {
        let cli = Cli::try_parse_from([
            "ugs",
            "fetch",
            "resources",
            "--dry-run",
            "-s",
            "remote-config,ccd",
            "--ccd-bucket",
            "assets",
        ])
        .unwrap();
        match cli.command {
            Commands::Fetch {
                services,
                dry_run,
                ccd_bucket,
                ..
            } => {
                assert!(dry_run);
                assert_eq!(services, vec![ServiceKind::RemoteConfig, ServiceKind::Ccd]);
                assert_eq!(ccd_bucket.as_deref(), Some("assets"));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from(["ugs", "remote-config", "list", "-p", "proj", "-vv"])
            .unwrap();
        assert_eq!(cli.global.project_id.as_deref(), Some("proj"));
        assert_eq!(cli.global.verbose, 2);
    }
}
