use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate as generate_completions, Shell};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use tools_manifest_core::{
    build_manifest, check, generate, CheckOutcome, Config, Order, WriteMode,
};

#[derive(Parser)]
#[command(name = "tools-manifest")]
#[command(version)]
#[command(about = "List the HTML files of a directory in a tools.json manifest")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short = 'C', long, help = "Directory to scan [default: current dir]")]
    dir: Option<PathBuf>,
    #[arg(short, long, help = "Filename glob [default: *.html]")]
    pattern: Option<String>,
    #[arg(
        short,
        long,
        help = "Manifest path, relative to the scanned dir [default: tools.json]"
    )]
    output: Option<PathBuf>,
    #[arg(short, long, help = "Match the pattern case-insensitively")]
    ignore_case: bool,
    #[arg(long, help = "Keep directory listing order instead of sorting")]
    unsorted: bool,
    #[arg(long, help = "Truncate and rewrite the manifest in place")]
    no_atomic: bool,
    #[arg(long, help = "Skip files whose name starts with a dot")]
    exclude_hidden: bool,
    #[arg(long, help = "JSON config file; flags take precedence")]
    config: Option<PathBuf>,
    #[arg(
        long,
        conflicts_with = "dry_run",
        help = "Exit with error if the manifest is missing or stale"
    )]
    check: bool,
    #[arg(long, help = "Print the manifest instead of writing it")]
    dry_run: bool,
    #[arg(short, long, help = "Enable debug logging")]
    verbose: bool,
    #[arg(
        long,
        default_value = "warn",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(help = "Shell to generate for (bash, zsh, fish, powershell)")]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(
                *shell,
                &mut Cli::command(),
                "tools-manifest",
                &mut io::stdout(),
            );
            Ok(())
        }
        None => run(&cli),
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose {
        "debug"
    } else {
        cli.log_level.as_str()
    };
    let directive: Directive = level
        .parse()
        .with_context(|| format!("invalid log level `{}`", level))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot resolve the current directory")?,
    };
    let config = resolve_config(cli)?;
    debug!(?config, dir = %dir.display(), "resolved config");

    if cli.check {
        cmd_check(&dir, &config)
    } else if cli.dry_run {
        cmd_dry_run(&dir, &config)
    } else {
        cmd_generate(&dir, &config)
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    if let Some(pattern) = &cli.pattern {
        config.pattern = pattern.clone();
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if cli.ignore_case {
        config.ignore_case = true;
    }
    if cli.unsorted {
        config.order = Order::Filesystem;
    }
    if cli.no_atomic {
        config.write_mode = WriteMode::Truncate;
    }
    if cli.exclude_hidden {
        config.include_hidden = false;
    }

    Ok(config)
}

fn cmd_generate(dir: &Path, config: &Config) -> Result<()> {
    generate(dir, config)
        .with_context(|| format!("failed to write manifest for {}", dir.display()))?;
    Ok(())
}

fn cmd_dry_run(dir: &Path, config: &Config) -> Result<()> {
    let manifest = build_manifest(dir, config)
        .with_context(|| format!("failed to scan {}", dir.display()))?;
    println!("{}", manifest.to_json()?);
    Ok(())
}

fn cmd_check(dir: &Path, config: &Config) -> Result<()> {
    let output = config.output_path(dir);

    match check(dir, config)? {
        CheckOutcome::UpToDate => {
            println!("{} is up to date", output.display());
            Ok(())
        }
        CheckOutcome::Missing => bail!("{} does not exist", output.display()),
        CheckOutcome::Stale(diff) => {
            for name in &diff.added {
                println!("+ {}", name);
            }
            for name in &diff.removed {
                println!("- {}", name);
            }
            bail!("{} is out of date", output.display())
        }
    }
}
