use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use log::{error, info, warn};

use instrument_panel::gauges::{demo_bridge, standard_panel};
use instrument_panel::scheduler::DEFAULT_TICK_RATE;
use instrument_panel::{
    window, ApplicationContext, DemoBridge, DialGauge, FrameScheduler, PanelSettings,
    VariableBridge, WindowOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Built-in flight data that wanders around each gauge's range
    Demo,
    /// No flight data at all, every read fails
    Offline,
}

/// Simulated aircraft instrument panel
#[derive(Parser, Debug)]
#[command(name = "instrument-panel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Where flight data comes from
    #[arg(long, value_enum, default_value_t = Source::Demo)]
    source: Source,

    /// Update rate in ticks per second, clamped to 1..=1000
    #[arg(long, value_name = "RATE", default_value_t = DEFAULT_TICK_RATE)]
    fps: f64,

    /// Open a plain window instead of borderless fullscreen
    #[arg(short = 'w', long)]
    windowed: bool,

    /// Font file for labels and numerals
    #[arg(long, value_name = "PATH")]
    font: Option<PathBuf>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -d
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting instrument-panel v{}", env!("CARGO_PKG_VERSION"));

    let settings_path = cli.settings.or_else(|| match PanelSettings::default_path() {
        Ok(path) => Some(path),
        Err(err) => {
            warn!("Settings will not be saved: {err}");
            None
        }
    });
    let mut settings = settings_path
        .as_deref()
        .map(PanelSettings::load_or_default)
        .unwrap_or_default();

    let panel = standard_panel();
    let bridge: Box<dyn VariableBridge> = match cli.source {
        Source::Demo => Box::new(demo_bridge(&panel)),
        Source::Offline => Box::new(DemoBridge::offline()),
    };

    let mut ctx = ApplicationContext::default();
    settings.apply(&mut ctx);
    let mut scheduler = FrameScheduler::new(ctx, bridge);
    scheduler.simvars_mut().restore_simulated(&settings.simulated);

    for mut config in panel {
        if !settings.is_enabled(&config.name) {
            info!("{} disabled in settings", config.name);
            continue;
        }
        if let Some(placement) = settings.placement(&config.name) {
            config.placement = placement;
        }
        scheduler.add_instrument(Box::new(DialGauge::new(config)));
    }

    let options = WindowOptions::builder()
        .tick_rate(cli.fps)
        .windowed(cli.windowed)
        .maybe_font(cli.font)
        .maybe_restore_origin(settings.display_origin)
        .build();

    if let Err(err) = window::run(&mut scheduler, options) {
        error!("{err}");
        eprintln!("{err}");
        eprintln!("Exiting");
        process::exit(1);
    }

    scheduler.shutdown(&mut settings);
    if let Some(path) = settings_path {
        if let Err(err) = settings.save(&path) {
            error!("Failed to save settings: {err}");
        }
    }
}
