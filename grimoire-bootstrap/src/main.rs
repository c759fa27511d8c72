use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use grimoire_bootstrap::cli::{self, ExportInput};
use grimoire_bootstrap::{init_tracing, serve, startup_tracing, AppContext};
use grimoire_infrastructure::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "grimoire")]
#[command(about = "D&D Beyond character importer", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP import service (default)
    Serve,
    /// Import a character export straight into the record store
    Import {
        #[arg(required_unless_present = "character_id", conflicts_with = "character_id")]
        file: Option<PathBuf>,
        /// Fetch the export from D&D Beyond instead of reading a file
        #[arg(long)]
        character_id: Option<String>,
        /// Owner to record when no signed-in user is available
        #[arg(long)]
        user_id: Option<String>,
        /// Scrape and commit every missing reference without review
        #[arg(long)]
        auto_approve: bool,
    },
    /// Print the transformed character without saving anything
    Preview { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(config) = args.config {
        std::env::set_var("GRIMOIRE_CONFIG", config);
    }

    let startup = startup_tracing();
    let mut config = AppConfig::load().await?;
    if let Some(Command::Import {
        user_id: Some(user_id),
        ..
    }) = &args.command
    {
        config.default_user_id = Some(user_id.clone());
    }
    drop(startup);
    let _guard = init_tracing(config.log_dir.as_deref());
    let context = AppContext::from_config(config)?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(context.state).await,
        Command::Import {
            file,
            character_id,
            auto_approve,
            ..
        } => {
            let input = match (file, character_id) {
                (Some(file), _) => ExportInput::File(file),
                (None, Some(character_id)) => ExportInput::Beyond(character_id),
                (None, None) => return Err(anyhow!("an export file or --character-id is required")),
            };
            cli::import(&context.state, &input, auto_approve).await
        }
        Command::Preview { file } => cli::preview(&context.state, &file).await,
    }
}
