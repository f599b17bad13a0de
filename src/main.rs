use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use owo_colors::OwoColorize;
use research_digest::aggregator::{export_document, Aggregator, BuildError, ResearchSession};
use research_digest::config::{
    find_config_file, load_config, user_config_path, write_default_config, Config, LogFormat,
};
use research_digest::models::ResearchBundle;
use research_digest::ui::{self, Spinner, Status};
use std::borrow::Borrow;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Research Digest - Search arXiv and build an AI-assisted digest of the results
#[derive(Parser, Debug)]
#[command(name = "research-digest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Search arXiv and summarize the results with AI analyses and citation data", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides http.timeout_secs)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (colored if TTY, JSON otherwise)
    Auto,
    /// Plain text without colors
    Plain,
    /// JSON format (machine-readable)
    Json,
    /// The markdown export document
    Markdown,
}

/// How a bundle is actually printed once `auto` is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rendering {
    Pretty,
    Plain,
    Json,
    Markdown,
}

impl OutputFormat {
    fn resolve(self, is_terminal: bool) -> Rendering {
        match self {
            OutputFormat::Auto if is_terminal => Rendering::Pretty,
            OutputFormat::Auto | OutputFormat::Json => Rendering::Json,
            OutputFormat::Plain => Rendering::Plain,
            OutputFormat::Markdown => Rendering::Markdown,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search arXiv and build a research digest
    #[command(alias = "s")]
    Search {
        /// Search query (keywords)
        query: String,

        /// Maximum number of papers to analyze
        #[arg(long, short = 'n')]
        max_papers: Option<usize>,

        /// Save the markdown export into this directory
        #[arg(long, short = 's')]
        save_dir: Option<PathBuf>,
    },

    /// Interactive session: enter queries, export the latest digest
    #[command(alias = "repl")]
    Shell,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Where to write (default: user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },

    /// Show the effective configuration
    Show,
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Research Digest - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  GROQ_API_KEY                Groq API key (required for AI analyses)");
    println!("  SEMANTIC_SCHOLAR_API_KEY    Semantic Scholar API key (higher rate limits)");
    println!();
    println!("Overrides (RESEARCH_DIGEST_<SECTION>__<KEY>):");
    println!("  RESEARCH_DIGEST_SOURCES__MAX_PAPERS              Papers per search (default: 5)");
    println!("  RESEARCH_DIGEST_SOURCES__ARXIV_URL               arXiv query endpoint");
    println!("  RESEARCH_DIGEST_SOURCES__SEMANTIC_SCHOLAR_URL    Semantic Scholar API base");
    println!("  RESEARCH_DIGEST_SOURCES__ENRICHMENT_TIMEOUT_SECS Citation lookup timeout (default: 10)");
    println!("  RESEARCH_DIGEST_LLM__MODEL                       Chat model (default: llama-3.1-8b-instant)");
    println!("  RESEARCH_DIGEST_LLM__BASE_URL                    OpenAI-compatible API base");
    println!("  RESEARCH_DIGEST_LLM__TIMEOUT_SECS                Per-analysis timeout (default: 60)");
    println!("  RESEARCH_DIGEST_HTTP__TIMEOUT_SECS               HTTP request timeout (default: 30)");
    println!("  RESEARCH_DIGEST_LOGGING__LEVEL                   Log level (default: warn)");
    println!("  RESEARCH_DIGEST_LOGGING__FORMAT                  text or json");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging filter (e.g., research_digest=debug)");
    println!();
    println!("Example:");
    println!("  export GROQ_API_KEY=\"your-key-here\"");
    println!("  research-digest search \"graph neural networks\" --save-dir ./digests");
}

/// Log filter directive for the given flags and configured level
fn log_directive(verbose: u8, quiet: bool, configured: &str) -> String {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => configured,
            1 => "debug",
            _ => "trace",
        }
    };
    format!("research_digest={}", level)
}

fn init_tracing(cli: &Cli, config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(cli.verbose, cli.quiet, &config.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn apply_overrides(config: &mut Config, timeout: Option<u64>, max_papers: Option<usize>) {
    if let Some(secs) = timeout.filter(|s| *s > 0) {
        config.http.timeout_secs = secs;
    }
    if let Some(n) = max_papers.filter(|n| *n > 0) {
        config.sources.max_papers = n;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
        return Ok(());
    }

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref()).context("Failed to load configuration")?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let rendering = cli.output.resolve(ui::is_terminal());

    match cli.command {
        Some(Commands::Search {
            query,
            max_papers,
            save_dir,
        }) => {
            apply_overrides(&mut config, cli.timeout, max_papers);
            let aggregator = Aggregator::from_config(&config);
            run_search(&aggregator, &query, rendering, cli.quiet, save_dir.as_deref()).await
        }
        Some(Commands::Shell) => {
            apply_overrides(&mut config, cli.timeout, None);
            let session = ResearchSession::new(Aggregator::from_config(&config));
            run_shell(session, rendering, cli.quiet).await
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Init { path, force } => {
                let path = path
                    .or_else(user_config_path)
                    .context("Could not determine a config directory; pass --path")?;
                write_default_config(&path, force)?;
                ui::print_status(Status::Success, &format!("Wrote {}", path.display()));
                Ok(())
            }
            ConfigCommands::Show => {
                apply_overrides(&mut config, cli.timeout, None);
                show_config(&config, config_path.as_deref())
            }
        },
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

async fn run_search(
    aggregator: &Aggregator,
    query: &str,
    rendering: Rendering,
    quiet: bool,
    save_dir: Option<&Path>,
) -> Result<()> {
    let bundle = with_spinner(query, rendering, quiet, aggregator.build_bundle(query)).await?;

    output_bundle(&bundle, rendering)?;

    if let Some(dir) = save_dir {
        let path = export_document(&bundle)
            .write_to_dir(dir)
            .with_context(|| format!("Failed to write export to {}", dir.display()))?;
        if !quiet {
            ui::print_status(Status::Success, &format!("Saved {}", path.display()));
        }
    }
    Ok(())
}

/// Await a build behind a spinner (pretty output only) and report its duration
async fn with_spinner<B, Fut>(
    query: &str,
    rendering: Rendering,
    quiet: bool,
    build: Fut,
) -> Result<B, BuildError>
where
    B: Borrow<ResearchBundle>,
    Fut: Future<Output = Result<B, BuildError>>,
{
    let spinner = (rendering == Rendering::Pretty && !quiet)
        .then(|| Spinner::new(&format!("Researching \"{}\" ...", query.trim())));
    let started = Instant::now();

    let result = build.await;

    if let Some(spinner) = &spinner {
        match &result {
            Ok(bundle) => {
                let bundle: &ResearchBundle = bundle.borrow();
                spinner.finish_with_success(&format!("Analyzed {} papers", bundle.papers().len()));
                ui::print_search_header(bundle.query(), bundle.papers().len(), started.elapsed());
            }
            Err(e) => spinner.finish_with_error(&e.to_string()),
        }
    }
    result
}

fn output_bundle(bundle: &ResearchBundle, rendering: Rendering) -> Result<()> {
    match rendering {
        Rendering::Pretty => ui::print_bundle(bundle),
        Rendering::Plain => print!("{}", ui::render_plain(bundle)),
        Rendering::Json => println!("{}", serde_json::to_string_pretty(bundle)?),
        Rendering::Markdown => print!("{}", export_document(bundle).content),
    }
    Ok(())
}

/// One line of input to the interactive shell
#[derive(Debug, PartialEq, Eq)]
enum ShellCommand {
    Empty,
    Quit,
    Help,
    Show,
    Export(PathBuf),
    Search(String),
}

fn parse_shell_line(line: &str) -> ShellCommand {
    let line = line.trim();
    if line.is_empty() {
        return ShellCommand::Empty;
    }

    let Some(command) = line.strip_prefix(':') else {
        return ShellCommand::Search(line.to_string());
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "q" | "quit" | "exit" => ShellCommand::Quit,
        "show" => ShellCommand::Show,
        "export" if arg.is_empty() => ShellCommand::Export(PathBuf::from(".")),
        "export" => ShellCommand::Export(PathBuf::from(arg)),
        _ => ShellCommand::Help,
    }
}

fn print_shell_help() {
    println!("Enter a search query, or one of:");
    println!("  :show           show the current digest again");
    println!("  :export [dir]   save the current digest as markdown (default: .)");
    println!("  :quit           leave the shell");
}

async fn run_shell(mut session: ResearchSession, rendering: Rendering, quiet: bool) -> Result<()> {
    if !quiet {
        println!(
            "{} v{}: type a query, :help for commands",
            "Research Digest".bold().cyan(),
            research_digest::VERSION
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", "research>".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_shell_line(&line) {
            ShellCommand::Empty => {}
            ShellCommand::Quit => break,
            ShellCommand::Help => print_shell_help(),
            ShellCommand::Show => match session.current() {
                Some(bundle) => output_bundle(bundle, rendering)?,
                None => ui::print_status(Status::Info, "No results yet; enter a query first"),
            },
            ShellCommand::Export(dir) => match session.export() {
                Some(doc) => match doc.write_to_dir(&dir) {
                    Ok(path) => ui::print_status(Status::Success, &format!("Saved {}", path.display())),
                    Err(e) => ui::print_status(Status::Error, &format!("Export failed: {}", e)),
                },
                None => ui::print_status(Status::Info, "Nothing to export yet"),
            },
            ShellCommand::Search(query) => {
                let result = with_spinner(&query, rendering, quiet, session.search(&query)).await;
                match result {
                    Ok(bundle) => output_bundle(bundle, rendering)?,
                    Err(e) => {
                        ui::print_status(Status::Error, &e.to_string());
                        if let Some(previous) = session.current() {
                            ui::print_status(
                                Status::Info,
                                &format!("Keeping previous results for \"{}\"", previous.query()),
                            );
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

fn show_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let mut shown = config.clone();
    for key in [&mut shown.api_keys.groq, &mut shown.api_keys.semantic_scholar] {
        if key.is_some() {
            *key = Some("<set>".to_string());
        }
    }

    match path {
        Some(path) => println!("# Config file: {}", path.display()),
        None => println!("# Config file: none (defaults and environment)"),
    }
    if shown.api_keys.groq.is_none() {
        println!("# GROQ_API_KEY is not set; AI analyses will be unavailable");
    }
    println!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}
