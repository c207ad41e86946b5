//! Hireline admin CLI.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "hireline")]
#[command(about = "Hireline admin CLI", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, env = "HIRELINE_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a server configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "hireline.kdl")]
        path: PathBuf,
    },
    /// List a sequenced collection in display order
    List {
        /// Collection name (plans, skills, qualifications, shifts, experiences, locations)
        resource: String,
        /// Include inactive rows
        #[arg(long)]
        include_inactive: bool,
    },
    /// Reorder a collection from a JSON file of {id, sequence} pairs
    Reorder {
        /// Collection name (plans, benefits, skills, ...)
        resource: String,
        /// JSON file holding an array of {"id": .., "sequence": ..}
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => {
            commands::validate(&path)?;
        }
        Commands::List {
            resource,
            include_inactive,
        } => {
            let client = commands::ApiClient::new(&cli.api_url)?;
            commands::list(&client, &resource, include_inactive).await?;
        }
        Commands::Reorder { resource, file } => {
            let client = commands::ApiClient::new(&cli.api_url)?;
            commands::reorder(&client, &resource, &file).await?;
        }
    }

    Ok(())
}
