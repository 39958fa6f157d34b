//! EventCatalog CLI
//!
//! Import and export the EventCatalog DSL.

#![warn(missing_docs)]
#![warn(clippy::all)]

use catalog_cli::{ExportOptions, ImportOptions, export_catalog, export_resource, import_dsl};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eventcatalog")]
#[command(about = "EventCatalog Command-Line Interface", version, long_about = None)]
struct Cli {
    /// Path to the EventCatalog directory
    #[arg(short, long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export catalog resources as DSL
    Export {
        /// Export the entire catalog (all resource types)
        #[arg(short, long)]
        all: bool,
        /// Resource type (event, command, query, service, domain)
        #[arg(short, long)]
        resource: Option<String>,
        /// Resource ID (omit to export all resources of the given type)
        #[arg(long)]
        id: Option<String>,
        /// Resource version (defaults to latest)
        #[arg(short = 'v', long = "version")]
        resource_version: Option<String>,
        /// Include referenced resources (messages, channels, owners)
        #[arg(long)]
        hydrate: bool,
        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
        /// Print a playground link for the exported DSL
        #[arg(long)]
        playground: bool,
        /// Output file path (defaults to <id>.ec or catalog.ec)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import DSL (.ec) documents into catalog resources
    Import {
        /// DSL files
        files: Vec<PathBuf>,
        /// Read the document from standard input
        #[arg(long, conflicts_with = "files")]
        stdin: bool,
        /// Preview without writing files
        #[arg(long)]
        dry_run: bool,
        /// Write new resources to top-level folders instead of nesting them
        #[arg(long)]
        flat: bool,
        /// Do not scaffold a new catalog
        #[arg(long)]
        no_init: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            eprintln!("{} {err}", style("error:").red().bold());
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<String> {
    match cli.command {
        Commands::Export {
            all,
            resource,
            id,
            resource_version,
            hydrate,
            stdout,
            playground,
            output,
        } => {
            let options = ExportOptions {
                resource,
                id,
                version: resource_version,
                hydrate,
                stdout,
                playground,
                output,
                dir: cli.dir,
            };
            if all {
                export_catalog(&options).await
            } else {
                export_resource(&options).await
            }
        }
        Commands::Import {
            files,
            stdin,
            dry_run,
            flat,
            no_init,
        } => {
            let stdin = if stdin {
                let mut text = String::new();
                tokio::io::stdin().read_to_string(&mut text).await?;
                Some(text)
            } else {
                None
            };
            let options = ImportOptions {
                files,
                stdin,
                dry_run,
                flat,
                no_init,
                dir: cli.dir,
            };
            import_dsl(&options).await
        }
    }
}
