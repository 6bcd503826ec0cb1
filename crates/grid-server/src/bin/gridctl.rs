//! Grid workspace command-line tool.
//!
//! `gridctl` inspects and edits workspace stores directly on disk. Every
//! command prints its result as pretty JSON on stdout; logs go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # List workspaces under ./data
//! gridctl workspaces
//!
//! # Create a document from a JSON entry
//! gridctl -w demo create-document --file people.json
//!
//! # Read the first 20 rows
//! gridctl -w demo rows people --start 0 --count 20
//!
//! # Apply an instruction entry or feed
//! gridctl -w demo apply people --file changes.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use grid_common::constants::{data_types, DATA_TYPE_FIELD, DEFAULT_PAGE_SIZE};
use grid_server::{Backend, GridConfig};
use grid_store::definition::{from_str, from_value};
use grid_store::feed::Page;
use grid_store::{DocumentSchema, Instruction, InstructionFeed};

/// Grid workspace tool
#[derive(Parser, Debug)]
#[command(
    name = "gridctl",
    version,
    about = "Inspect and edit grid workspace stores",
    long_about = "Inspect and edit grid workspace stores.\n\n\
                  Each workspace is one .grid file under the data directory."
)]
struct Args {
    /// Data directory holding the workspace stores
    #[arg(short = 'd', long, value_name = "DIR", env = "GRID_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "GRID_CONFIG")]
    config: Option<PathBuf>,

    /// Workspace used by document, row, view and variable commands
    #[arg(short = 'w', long, env = "GRID_WORKSPACE")]
    workspace: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "GRID_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List workspaces
    Workspaces,
    /// Create an empty workspace
    CreateWorkspace {
        /// Workspace name
        name: String,
    },
    /// Describe a workspace
    Workspace {
        /// Workspace name
        name: String,
    },
    /// List document schemas
    Documents,
    /// Create a document from a JSON document entry
    CreateDocument {
        /// File holding the document entry
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// Delete a document and its rows
    DeleteDocument {
        /// Document name
        document: String,
    },
    /// Print one page of a document's rows
    Rows {
        /// Document name
        document: String,
        /// Offset of the first row
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        start: String,
        /// Maximum number of rows
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE.to_string(), allow_hyphen_values = true)]
        count: String,
    },
    /// Apply an instruction entry or feed to a document
    Apply {
        /// Document name
        document: String,
        /// File holding the instruction entry or feed
        #[arg(long, value_name = "FILE")]
        file: PathBuf,
    },
    /// List views
    Views,
    /// List variables
    Variables,
    /// Print the effective configuration and exit
    PrintConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = load_config(&args)?;
    init_logging(&args, &config);

    if let Command::PrintConfig = args.command {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let backend = Backend::open(config.store).context("Failed to open data directory")?;
    run(&backend, &args)
}

fn init_logging(args: &Args, config: &GridConfig) {
    let level = if args.verbose {
        "debug"
    } else {
        args.log_level.as_deref().unwrap_or(&config.log_level)
    };

    let filter = EnvFilter::try_new(format!(
        "grid_server={level},grid_store={level},gridctl={level}"
    ))
    .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn load_config(args: &Args) -> Result<GridConfig> {
    let mut config = if let Some(path) = &args.config {
        GridConfig::from_file(path).context("Failed to load config file")?
    } else {
        GridConfig::default()
    };

    if let Some(dir) = &args.data_dir {
        config.store.data_dir = dir.clone();
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }

    config.validate()?;
    Ok(config)
}

fn run(backend: &Backend, args: &Args) -> Result<()> {
    let workspace = || {
        args.workspace
            .as_deref()
            .context("this command needs --workspace")
    };

    match &args.command {
        Command::Workspaces => print_json(&backend.list_workspaces()?),
        Command::CreateWorkspace { name } => {
            backend.create_workspace(name)?;
            info!(workspace = %name, "workspace created");
            print_json(&backend.get_workspace(name)?)
        }
        Command::Workspace { name } => print_json(&backend.get_workspace(name)?),
        Command::Documents => print_json(&backend.get_documents(workspace()?)?),
        Command::CreateDocument { file } => {
            let schema: DocumentSchema = from_str(&read(file)?)?;
            backend.create_document(workspace()?, &schema)?;
            print_json(&schema)
        }
        Command::DeleteDocument { document } => {
            let workspace = workspace()?;
            backend.delete_document(workspace, document)?;
            print_json(&backend.get_workspace(workspace)?)
        }
        Command::Rows {
            document,
            start,
            count,
        } => {
            let page = Page::parse(start, count)?;
            print_json(&backend.get_page(workspace()?, document, page)?)
        }
        Command::Apply { document, file } => apply(backend, workspace()?, document, file),
        Command::Views => print_json(&backend.get_views(workspace()?)?),
        Command::Variables => print_json(&backend.get_variables(workspace()?)?),
        Command::PrintConfig => Ok(()),
    }
}

/// Applies an instruction payload and prints it back with its outcome,
/// also when it failed part way.
fn apply(backend: &Backend, workspace: &str, document: &str, file: &Path) -> Result<()> {
    let payload: Value = from_str(&read(file)?)?;
    let data_type = payload
        .get(DATA_TYPE_FIELD)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let result = match data_type.as_str() {
        data_types::INSTRUCTION_FEED => {
            let mut feed: InstructionFeed = from_value(payload)?;
            let result = backend.edit_rows(workspace, document, &mut feed);
            print_json(&feed)?;
            result
        }
        data_types::INSTRUCTION_ENTRY => {
            let mut instruction: Instruction = from_value(payload)?;
            let result = backend.edit_row(workspace, document, &mut instruction);
            print_json(&instruction)?;
            result
        }
        other => bail!("expected an instruction entry or feed, got data-type '{other}'"),
    };
    Ok(result?)
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
