use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn, LevelFilter};

use gestured::{
    daemon::{
        default_config_path, CommandExecutor, CommandResolver, Daemon, DryRunExecutor,
        GestureConfig, ShellExecutor,
    },
    gesture::{EventFamily, FamilySelection},
};

#[derive(Debug, Parser)]
#[command(name = "gestured")]
#[command(about = "Runs commands for touchpad and touchscreen gestures")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Read `libinput debug-events` output from stdin and run bound commands.
    Run(RunArgs),
    /// Replay a recorded trace and print every triggered gesture.
    Replay(ReplayArgs),
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Config file; defaults to $XDG_CONFIG_HOME/gebaar/gebaard.toml.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Event family driving swipes; overrides the config file.
    #[arg(long, value_enum)]
    family: Option<FamilyArg>,
    #[arg(long)]
    debug: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Log commands instead of running them.
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct ReplayArgs {
    trace: PathBuf,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FamilyArg {
    Auto,
    Gesture,
    Touch,
}

impl From<FamilyArg> for FamilySelection {
    fn from(arg: FamilyArg) -> Self {
        match arg {
            FamilyArg::Auto => Self::Auto,
            FamilyArg::Gesture => Self::Fixed(EventFamily::Gesture),
            FamilyArg::Touch => Self::Fixed(EventFamily::Touch),
        }
    }
}

fn init_logging(debug: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if debug {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.format_timestamp_millis().init();
}

// An explicit --config must exist; a missing default file falls back to an
// empty command set so the daemon can still be tried out.
fn load_config(explicit: Option<PathBuf>) -> Result<GestureConfig> {
    if let Some(path) = explicit {
        return GestureConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }

    let path = default_config_path()?;
    if !path.exists() {
        warn!(
            "{} not found, running without bound commands",
            path.display()
        );
        return Ok(GestureConfig::default());
    }
    info!("loading {}", path.display());
    GestureConfig::load(&path).with_context(|| format!("failed to load config {}", path.display()))
}

fn build_daemon<E: CommandExecutor>(
    common: CommonArgs,
    executor: E,
) -> Result<Daemon<GestureConfig, E>> {
    let config = load_config(common.config)?;
    let selection = common
        .family
        .map(FamilySelection::from)
        .unwrap_or_else(|| config.family());
    info!(
        "swipe threshold {} one_shot={} trigger_on_release={}, pinch threshold {} one_shot={}, family {selection:?}",
        config.swipe_threshold(),
        config.swipe_one_shot(),
        config.swipe_trigger_on_release(),
        config.pinch_threshold(),
        config.pinch_one_shot(),
    );
    Ok(Daemon::new(config, executor, selection))
}

fn run_daemon<E: CommandExecutor>(common: CommonArgs, executor: E) -> Result<()> {
    let mut daemon = build_daemon(common, executor)?;
    daemon
        .run(io::stdin().lock(), |_| {})
        .context("failed to read event stream from stdin")?;
    Ok(())
}

fn run_replay(args: ReplayArgs) -> Result<()> {
    let file = File::open(&args.trace)
        .with_context(|| format!("failed to open trace {}", args.trace.display()))?;
    let mut daemon = build_daemon(args.common, DryRunExecutor::new())?;
    daemon
        .run(BufReader::new(file), |action| println!("{action}"))
        .with_context(|| format!("failed to read trace {}", args.trace.display()))?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => {
            init_logging(args.common.debug);
            if args.dry_run {
                run_daemon(args.common, DryRunExecutor::new())
            } else {
                run_daemon(args.common, ShellExecutor::new())
            }
        }
        Commands::Replay(args) => {
            init_logging(args.common.debug);
            run_replay(args)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:?}");
        std::process::exit(1);
    }
}
