use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use powermated::background::{self, Fork};
use powermated::{EvdevBackend, PowermateDaemon, Settings, ShellRunner};

#[derive(Parser, Debug)]
#[command(name = "powermated")]
#[command(about = "Griffin PowerMate daemon that maps knob gestures to shell commands")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", help = "Path to TOML configuration file")]
    config: Option<PathBuf>,

    /// Run in the background
    #[arg(short, long, help = "Detach from the terminal and run in the background")]
    daemonize: bool,

    /// Enable debug logging (most verbose)
    #[arg(long, help = "Enable debug level logging")]
    debug: bool,

    /// Enable quiet mode (errors only)
    #[arg(short, long, help = "Enable quiet mode - only log errors")]
    quiet: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in TOML format and exit")]
    print_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_config {
        print_default_config();
        return Ok(());
    }

    init_logging(&args);

    info!("Starting powermated v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load(args.config.as_deref())?;

    let mut daemon = PowermateDaemon::new(settings.clone(), EvdevBackend, ShellRunner);

    // Probe before forking so open problems are visible on the terminal.
    daemon.probe();

    if settings.daemonize || args.daemonize {
        match background::daemonize() {
            Ok(Fork::Parent) => {
                info!("Just became a daemon.");
                return Ok(());
            }
            Ok(Fork::Child) => {}
            Err(e) => {
                // Keep running in the foreground rather than dying.
                error!("Failed to become a daemon: {}", e);
            }
        }
    }

    // Returns only when the readiness wait itself fails; everything else is
    // recovered inside the loop.
    daemon.run()?;
    Ok(())
}

fn init_logging(args: &Args) {
    use tracing_subscriber::EnvFilter;

    let level = if args.debug {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("powermated={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}

/// Print default configuration in TOML format
fn print_default_config() {
    let default_config = r#"# powermated configuration file
# Searched at $XDG_CONFIG_HOME/powermate.toml, ~/.config/powermate.toml,
# then /etc/powermate.toml; override with -c. All keys are optional.

# Device node for the PowerMate
dev = "/dev/input/powermate"

# Detach from the terminal after startup
daemonize = false

# Commands are run through `sh -c`. Unset commands do nothing.
# Run on click (press released before the long-press threshold)
# knob_command = "pactl set-sink-mute @DEFAULT_SINK@ toggle"

# Run on long press. Unset: a long press toggles movie mode instead.
# Set to "" to disable long-press detection entirely.
# long_press_command = "systemctl suspend"

# Run on rotation
# clock_wise_command = "pactl set-sink-volume @DEFAULT_SINK@ +2%"
# counter_clock_wise_command = "pactl set-sink-volume @DEFAULT_SINK@ -2%"

# Hold duration in milliseconds before a press counts as a long press
long_press_ms = 1000
"#;

    println!("{}", default_config);
}
