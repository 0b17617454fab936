//! nscheck
//!
//! Checks that forward (A/AAAA) and reverse (PTR) DNS zones agree: every
//! address record needs a PTR pointing back at it, and every PTR needs an
//! address record it points to.

mod logging;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use console::style;
use nscheck_check::{CheckReport, CheckerHandle};
use nscheck_config::{Config, ReportFormat, ZoneWatcher};
use nscheck_zone::{load_directories_with, RecordStore, ZoneFileParser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

use crate::logging::{init_tracing, LogConfig};

/// Exit code when every check passed.
const EXIT_CONSISTENT: u8 = 0;
/// Exit code when something went wrong before a report was produced.
const EXIT_ERROR: u8 = 1;
/// Exit code when at least one record failed a check.
const EXIT_INCONSISTENT: u8 = 2;

/// nscheck - forward/reverse DNS zone consistency checker
#[derive(Parser, Debug)]
#[command(name = "nscheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Quiet mode (report only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Options for the default `check` command
    #[command(flatten)]
    check: CheckArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check forward and reverse zones against each other (default)
    Check(CheckArgs),

    /// List the record types found in the zone directories
    Types {
        /// Directory with zone files (repeatable)
        #[arg(short = 'd', long = "dir", value_name = "DIR")]
        dirs: Vec<PathBuf>,
    },

    /// Show version information
    Version {
        /// Show detailed version info
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct CheckArgs {
    /// Directory with zone files (repeatable)
    #[arg(short = 'd', long = "dir", value_name = "DIR")]
    dirs: Vec<PathBuf>,

    /// Separator between reported owner names
    #[arg(long, value_name = "SEP")]
    separator: Option<String>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Keep running and re-check when zone files change
    #[arg(long)]
    watch: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

/// Effective settings for one check run: command line over config file.
#[derive(Debug, Clone, PartialEq)]
struct CheckSettings {
    dirs: Vec<PathBuf>,
    max_include_depth: usize,
    separator: String,
    format: ReportFormat,
    watch: bool,
    debounce: Duration,
}

impl CheckSettings {
    fn resolve(config: &Config, args: CheckArgs) -> Result<Self> {
        let dirs = if args.dirs.is_empty() {
            config.zones.dirs.clone()
        } else {
            args.dirs
        };
        if dirs.is_empty() {
            bail!("no zone directories given (use --dir or zones.dirs in the config file)");
        }

        let separator = args
            .separator
            .unwrap_or_else(|| config.report.separator.clone());
        if separator.is_empty() {
            bail!("--separator must not be empty");
        }

        Ok(Self {
            dirs,
            max_include_depth: config.zones.max_include_depth,
            separator,
            format: args.format.map_or(config.report.format, Into::into),
            watch: args.watch || config.watch.enabled,
            debounce: config.watch.debounce(),
        })
    }
}

/// Loads the configuration file, either the one given or the first found
/// in the default locations. No file at all means defaults.
fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    let Some(path) = explicit.or_else(Config::find) else {
        return Ok(Config::default());
    };
    let config = Config::from_file(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Loads and merges every zone directory.
fn load_zones(dirs: &[PathBuf], max_include_depth: usize) -> Result<RecordStore> {
    let parser = ZoneFileParser::new().max_include_depth(max_include_depth);
    load_directories_with(&parser, dirs).context("Failed to load zones")
}

fn exit_code(report: &CheckReport) -> u8 {
    if report.is_consistent() {
        EXIT_CONSISTENT
    } else {
        EXIT_INCONSISTENT
    }
}

fn print_report(report: &CheckReport, settings: &CheckSettings, quiet: bool) -> Result<()> {
    match settings.format {
        ReportFormat::Text => print!("{}", report.to_text(&settings.separator)),
        ReportFormat::Json => println!("{}", report.to_json()?),
    }

    if !quiet {
        if report.is_consistent() {
            eprintln!("{}", style("All forward and reverse records match").green());
        } else {
            eprintln!(
                "{}",
                style(format!("{} inconsistent records", report.total_failures())).red()
            );
        }
    }
    Ok(())
}

/// Reloads the zones, swaps them into `handle` and checks again.
fn recheck(handle: &CheckerHandle, settings: &CheckSettings) -> Result<CheckReport> {
    let store = load_zones(&settings.dirs, settings.max_include_depth)?;
    handle.reload(store).context("Zone data rejected")?;
    handle.run_all().context("Consistency check failed")
}

fn cmd_check(settings: &CheckSettings, quiet: bool) -> Result<u8> {
    let store = load_zones(&settings.dirs, settings.max_include_depth)?;
    let handle = CheckerHandle::from_store(store);
    let mut report = handle.run_all().context("Consistency check failed")?;
    print_report(&report, settings, quiet)?;

    if !settings.watch {
        return Ok(exit_code(&report));
    }

    let mut watcher = ZoneWatcher::new().context("Failed to start file watcher")?;
    for dir in &settings.dirs {
        watcher
            .watch(dir)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
    }
    info!(dirs = settings.dirs.len(), "watching zone directories");

    while let Some(changed) = watcher.wait(settings.debounce) {
        info!(files = changed.len(), "zone files changed, re-checking");
        match recheck(&handle, settings) {
            Ok(next) => {
                report = next;
                print_report(&report, settings, quiet)?;
            }
            Err(err) => error!(error = %format!("{err:#}"), "re-check failed"),
        }
    }

    Ok(exit_code(&report))
}

fn cmd_types(dirs: &[PathBuf], config: &Config) -> Result<u8> {
    let dirs = if dirs.is_empty() {
        config.zones.dirs.as_slice()
    } else {
        dirs
    };
    if dirs.is_empty() {
        bail!("no zone directories given (use --dir or zones.dirs in the config file)");
    }

    let store = load_zones(dirs, config.zones.max_include_depth)?;
    let mut types = store.types_present();
    types.sort();
    for rtype in types {
        println!("{rtype}\t{}", store.count_of_type(rtype));
    }
    Ok(EXIT_CONSISTENT)
}

fn print_version(verbose: bool) {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");

    if verbose {
        println!(
            "{} {}",
            style(name).cyan().bold(),
            style(format!("v{version}")).dim()
        );
        println!();
        println!(
            "  {}: {}",
            style("Build target").dim(),
            std::env::consts::ARCH
        );
        println!("  {}: {}", style("OS").dim(), std::env::consts::OS);
        println!();
    } else {
        println!("{name} {version}");
    }
}

/// Loads the configuration and installs logging from it.
fn init(config: Option<PathBuf>, log_level: Option<&str>, quiet: bool) -> Result<Config> {
    let config = load_config(config)?;
    init_tracing(&LogConfig::resolve(&config, log_level, quiet));
    Ok(config)
}

fn run(cli: Cli) -> Result<u8> {
    let command = cli.command.unwrap_or(Commands::Check(cli.check));

    match command {
        // No configuration is needed to print the version.
        Commands::Version { verbose } => {
            print_version(verbose);
            Ok(EXIT_CONSISTENT)
        }
        Commands::Check(args) => {
            let config = init(cli.config, cli.log_level.as_deref(), cli.quiet)?;
            cmd_check(&CheckSettings::resolve(&config, args)?, cli.quiet)
        }
        Commands::Types { dirs } => {
            let config = init(cli.config, cli.log_level.as_deref(), cli.quiet)?;
            cmd_types(&dirs, &config)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err:#}", style("error:").red().bold());
            ExitCode::from(EXIT_ERROR)
        }
    }
}
