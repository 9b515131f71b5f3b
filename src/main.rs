// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use devdocs_global::app_config::{Config, DEFAULT_CONFIG_FILE, LogLevel};
use devdocs_global::language_utils::{display_name, supported_languages};
use devdocs_global::{CancellationFlag, Controller};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(short, long)]
        force: bool,
    },

    /// Translate the documentation tree
    Translate(TranslateArgs),

    /// Detect the language of a file
    Detect {
        /// File to inspect
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show documents, cache state and credentials
    Status,

    /// Remove every change cache record
    ClearCache,

    /// List the built-in target languages
    Languages,

    /// Generate shell completions for devdocs-global
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Source language code, or 'auto'
    #[arg(short, long)]
    source: Option<String>,

    /// Target language codes, comma separated (e.g. 'es,fr,de')
    #[arg(short, long, value_delimiter = ',')]
    targets: Option<Vec<String>>,

    /// Directory containing the source documents
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Directory receiving `<lang>/` translation trees
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Skip documents unchanged since the last run
    #[arg(long, conflicts_with = "force")]
    incremental: bool,

    /// Translate every document even if unchanged
    #[arg(short, long)]
    force: bool,
}

/// devdocs-global - translate developer documentation with AI
///
/// Translates markdown documentation into several languages while keeping code
/// blocks, inline code and URLs untouched.
#[derive(Parser, Debug)]
#[command(name = "devdocs-global")]
#[command(version)]
#[command(about = "AI-powered documentation translation")]
#[command(long_about = "devdocs-global translates markdown documentation with the Lingo API.

EXAMPLES:
    devdocs-global init                          # Write devdocs.config.json
    devdocs-global translate                     # Translate using the config file
    devdocs-global translate -t es,fr --incremental
    devdocs-global detect docs/intro.md          # Detect a file's language
    devdocs-global completions bash > devdocs-global.bash

CONFIGURATION:
    Configuration is read from devdocs.config.json by default. The API key may
    be left empty in the file and supplied through LINGO_API_KEY instead.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Start at info; the config or --log-level adjusts it once known
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();
    if let Some(level) = cli.log_level {
        log::set_max_level(LogLevel::from(level).to_level_filter());
    }

    match cli.command {
        Commands::Init { force } => run_init(&cli.config, force),
        Commands::Translate(args) => run_translate(&cli.config, cli.log_level, args).await,
        Commands::Detect { file } => {
            let controller = Controller::with_config(load_config(&cli.config, cli.log_level)?)?;
            let language = controller.detect_file(&file).await?;
            println!("{} ({})", language, display_name(&language));
            Ok(())
        }
        Commands::Status => {
            let config = load_config(&cli.config, cli.log_level)?;
            let controller = Controller::with_config(config.clone())?;
            let status = controller.status()?;

            println!("Source:      {:?} ({})", config.source_dir, config.source_language);
            println!("Targets:     {}", config.target_languages.join(", "));
            println!("Output:      {:?}", config.output_dir);
            println!("Documents:   {}", status.documents);
            println!(
                "Cache:       {} record(s), {} bytes in {:?}",
                status.cache.entries, status.cache.size_bytes, config.cache_dir
            );
            println!(
                "API key:     {}",
                if status.api_key_configured { "configured" } else { "missing" }
            );
            Ok(())
        }
        Commands::ClearCache => {
            let controller = Controller::with_config(load_config(&cli.config, cli.log_level)?)?;
            let removed = controller.clear_cache()?;
            println!("Removed {} cache record(s)", removed);
            Ok(())
        }
        Commands::Languages => {
            for language in supported_languages() {
                println!("{:<4} {}", language.code, language.name);
            }
            Ok(())
        }
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "devdocs-global", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Load the config file (defaults when missing) and apply its log level
fn load_config(path: &Path, cli_level: Option<CliLogLevel>) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)?
    } else {
        warn!("Config file not found at {:?}, using defaults. Run 'devdocs-global init' to create one.", path);
        Config::default()
    };

    // The command line level wins over the config file
    if cli_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}

fn run_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(anyhow!("{:?} already exists (use --force to overwrite)", path));
    }

    Config::default()
        .save(path)
        .with_context(|| format!("Failed to write default config to {:?}", path))?;

    info!("Wrote {:?}. Set apiKey there or export LINGO_API_KEY.", path);
    Ok(())
}

async fn run_translate(config_path: &Path, cli_level: Option<CliLogLevel>, args: TranslateArgs) -> Result<()> {
    let mut config = load_config(config_path, cli_level)?;

    // Override config with CLI options if provided
    if let Some(source) = args.source {
        config.source_language = source;
    }
    if let Some(targets) = args.targets {
        config.target_languages = targets
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }
    if let Some(source_dir) = args.source_dir {
        config.source_dir = source_dir;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if args.incremental {
        config.incremental = true;
    }
    if args.force {
        config.incremental = false;
    }

    let controller = Controller::with_config(config)?;

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing documents already in progress");
            on_interrupt.cancel();
        }
    });

    let summary = controller.run(cancel).await?;
    if summary.failed_documents() > 0 {
        warn!(
            "{} document(s) had failures; see the errors above",
            summary.failed_documents()
        );
    }

    Ok(())
}
