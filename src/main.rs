use anyhow::{Context, Result};
use clap::Parser;
use recorg::{
    relocate_recording, DirectoryHost, EventBus, OrganizerController, RecordingHost,
    RecorgConfig, RelocationOutcome, TimestampPolicy,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "recorg")]
#[command(about = "Organizes finished recordings into dated camera/week/day folders")]
#[command(version)]
#[command(long_about = "Moves each finished recording into <base>/W<week>/D<day>/vid with a \
name encoding camera, week, day and recording number, and writes a frame-locked \
timestamp log next to it while the recording runs.")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "recorg.toml", help = "Path to TOML configuration file")]
    config: String,

    /// Enable debug logging (most verbose)
    #[arg(short, long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable verbose logging (info level)
    #[arg(short, long, help = "Enable verbose info level logging")]
    verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration file and exit")]
    validate_config: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,

    /// Override log format (json, pretty, compact)
    #[arg(long, value_name = "FORMAT", help = "Log output format: json, pretty, or compact")]
    log_format: Option<String>,

    /// Disable the r/s/c/q key bindings
    #[arg(long, help = "Run without keyboard input (signals only)")]
    no_keyboard: bool,

    /// Organize a single existing recording and exit
    #[arg(long, value_name = "FILE", help = "Move FILE into the dated layout and exit")]
    organize: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config()?;
        return Ok(());
    }

    init_logging(&args)?;

    info!("Starting recorg v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration file: {}", args.config);

    let config = RecorgConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config))?;

    match config.validate() {
        Ok(()) if args.validate_config => {
            println!("✓ Configuration is valid");
            return Ok(());
        }
        Ok(()) => info!("Configuration validated"),
        Err(e) => {
            error!("Configuration validation failed: {}", e);
            eprintln!("✗ Configuration validation failed: {}", e);
            std::process::exit(1);
        }
    }

    if let Some(source) = args.organize.as_deref() {
        let policy = TimestampPolicy::from_config(&config.timestamp);
        let outcome = relocate_recording(source, &config.recording, &policy.stamp())?;
        match outcome {
            RelocationOutcome::Moved { to, .. } => println!("{}", to.display()),
            RelocationOutcome::Collision { destination, .. } => {
                warn!("Collision: {} already exists; file not moved", destination.display());
                std::process::exit(2);
            }
        }
        return Ok(());
    }

    let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));
    let host: Arc<dyn RecordingHost> = Arc::new(DirectoryHost::new(
        config.host.clone(),
        Arc::clone(&event_bus),
    ));

    let mut controller = OrganizerController::new(config, host, event_bus)?
        .with_config_path(&args.config);
    controller.set_keyboard_enabled(!args.no_keyboard);

    let exit_code = controller.run().await.map_err(|e| {
        error!("Organizer error during execution: {}", e);
        e
    })?;

    info!("recorg exited with code: {}", exit_code);
    std::process::exit(exit_code);
}

fn init_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recorg={}", log_level)));

    let fmt_layer = match args.log_format.as_deref() {
        Some("json") => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        Some("compact") => fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        Some("pretty") | None => fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(args.debug)
            .with_file(args.debug)
            .with_line_number(args.debug)
            .boxed(),
        Some(format) => {
            eprintln!("Warning: Unknown log format '{}', using default", format);
            fmt::layer()
                .with_target(true)
                .with_thread_ids(args.debug)
                .with_file(args.debug)
                .with_line_number(args.debug)
                .boxed()
        }
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

/// Print default configuration in TOML format
fn print_default_config() -> Result<()> {
    println!("# recorg configuration file");
    println!("# Environment overrides use RECORG_<SECTION>__<KEY>, e.g. RECORG_RECORDING__CAMERA_ID=3");
    println!();
    println!("{}", RecorgConfig::default().to_toml_string()?);
    Ok(())
}
