//! # Streamline Suite CLI
//!
//! Command-line front end for quotations, invoices and their PDF output.
//!
//! ## Module Organization
//! ```text
//! suite_cli/
//! ├── lib.rs          ◄─── You are here (argument parsing & dispatch)
//! ├── session.rs      ◄─── Config, store, state and document service
//! ├── commands/
//! │   ├── mod.rs      ◄─── CommandOutput
//! │   ├── documents.rs◄─── totals, render, preview, convert
//! │   ├── quote.rs    ◄─── new quotations
//! │   ├── template.rs ◄─── custom template management
//! │   ├── inventory.rs◄─── stock list and movements
//! │   └── company.rs  ◄─── company profile
//! └── error.rs        ◄─── CliError for commands
//! ```
//!
//! ## Output
//! Results go to stdout, logs to stderr. `--json` switches stdout to JSON
//! for both results and errors.

pub mod commands;
pub mod error;
pub mod session;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::company::CompanyCommand;
use commands::documents::{self, ConvertArgs, PreviewArgs, RenderArgs};
use commands::inventory::InventoryCommand;
use commands::quote::{self, QuoteArgs};
use commands::template::TemplateCommand;
use commands::CommandOutput;
use error::{CliError, CliResult};
use session::{Session, SessionOptions};

#[derive(Debug, Parser)]
#[command(name = "suite", version, about = "Quotations, invoices and PDF export")]
pub struct Cli {
    /// Config file (default: platform config dir / suite.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON file of quotations, invoices and records merged over the samples
    #[arg(long, global = true)]
    pub records: Option<PathBuf>,

    /// Where the company profile is stored
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Where exported PDFs are written
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Never fetch remote logos or backgrounds
    #[arg(long, global = true)]
    pub offline: bool,

    /// Keep the company profile in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Print results and errors as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show line items and totals of a quotation or invoice
    Totals {
        id: String,
    },
    /// Export a document to PDF
    Render(RenderArgs),
    /// Render in memory and report what would be exported
    Preview(PreviewArgs),
    /// Turn an accepted quotation into an invoice
    Convert(ConvertArgs),
    /// Draft a quotation from cost-priced lines
    Quote(QuoteArgs),
    /// Manage custom templates
    Template {
        #[command(subcommand)]
        command: TemplateCommand,
    },
    /// Stock on hand and movements
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },
    /// Show or edit the company profile
    Company {
        #[command(subcommand)]
        command: CompanyCommand,
    },
}

impl Cli {
    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            config: self.config.clone(),
            records: self.records.clone(),
            data_dir: self.data_dir.clone(),
            output_dir: self.output_dir.clone(),
            offline: self.offline,
            ephemeral: self.ephemeral,
        }
    }
}

/// Opens a session and runs one command.
pub async fn run(cli: &Cli) -> CliResult<CommandOutput> {
    let mut session = Session::open(cli.session_options()).await?;
    debug!(command = ?cli.command, "Dispatching");
    execute(&mut session, &cli.command).await
}

/// Runs a command against an open session.
pub async fn execute(session: &mut Session, command: &Command) -> CliResult<CommandOutput> {
    match command {
        Command::Totals { id } => documents::totals(session, id).map(CommandOutput::Totals),
        Command::Render(args) => documents::render(session, args).await.map(CommandOutput::Render),
        Command::Preview(args) => documents::preview(session, args)
            .await
            .map(CommandOutput::Preview),
        Command::Convert(args) => documents::convert(session, args)
            .await
            .map(CommandOutput::Convert),
        Command::Quote(args) => quote::quote(session, args).await.map(CommandOutput::Quote),
        Command::Template { command } => commands::template::run(session, command).await,
        Command::Inventory { command } => commands::inventory::run(session, command).await,
        Command::Company { command } => commands::company::run(session, command).await,
    }
}

/// Parses arguments, runs the command and prints the outcome.
///
/// Returns the process exit code.
pub async fn main_entry() -> i32 {
    let cli = Cli::parse();
    init_tracing();
    info!("Starting Streamline Suite");

    match run(&cli).await {
        Ok(output) => match render_output(&output, cli.json) {
            Ok(text) => {
                println!("{}", text);
                0
            }
            Err(err) => report_error(&err, cli.json),
        },
        Err(err) => report_error(&err, cli.json),
    }
}

fn render_output(output: &CommandOutput, json: bool) -> CliResult<String> {
    if json {
        Ok(serde_json::to_string_pretty(output)?)
    } else {
        Ok(output.to_string())
    }
}

fn report_error(err: &CliError, json: bool) -> i32 {
    if json {
        match serde_json::to_string_pretty(err) {
            Ok(body) => println!("{}", body),
            Err(_) => eprintln!("{}", err),
        }
    } else {
        eprintln!("{}", err);
    }
    err.exit_code()
}

/// Initializes the tracing subscriber on stderr.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=suite_docs=trace` - Trace the renderer only
/// - Default: WARN, INFO for the suite crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn,suite_cli=info,suite_docs=info,suite_store=info,reqwest=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
