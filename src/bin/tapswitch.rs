use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use tapswitch::actor;
use tapswitch::actor::config_watcher::ConfigWatcher;
use tapswitch::actor::replay::{Record, replay};
use tapswitch::actor::switchboard::{Collaborators, Event, Switchboard};
use tapswitch::common::config::{Config, config_file};
use tapswitch::common::log;
use tapswitch::sys::console::{
    ConsoleActivation, ConsoleProcesses, ConsoleSurface, ConsoleWindows, World,
};
use tapswitch::sys::timer::{SystemClock, TokioTimers};
use tracing::warn;

#[derive(Parser)]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check the configuration file and exit without starting the engine.
    #[arg(long)]
    validate: bool,

    /// Record engine events to the specified file path. Overwrites the file
    /// if it exists.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Replay a recorded event stream against a fresh engine and exit.
    #[arg(long, value_name = "PATH")]
    replay: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    sigpipe::reset();
    let opt = Cli::parse();

    if std::env::var_os("RUST_BACKTRACE").is_none() {
        // SAFETY: We are single threaded at this point.
        unsafe { std::env::set_var("RUST_BACKTRACE", "1") };
    }
    log::init_logging();
    install_panic_hook();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let config = if config_path.exists() {
        match Config::read(&config_path) {
            Ok(config) => config,
            Err(e) => {
                warn!("falling back to default config: {e:?}");
                Config::default()
            }
        }
    } else {
        Config::default()
    };

    if opt.validate {
        let config = Config::read(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let issues = config.validate();
        if issues.is_empty() {
            println!("Config validation passed");
        } else {
            for issue in issues {
                eprintln!("{}", issue);
            }
            process::exit(1);
        }
        return Ok(());
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("building runtime")?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&rt, async move {
        let (events_tx, events_rx) = actor::channel::<Event>();
        let world = World::sample();
        let deps = Collaborators {
            processes: Box::new(ConsoleProcesses::new(world.clone())),
            windows: Box::new(ConsoleWindows::new(world.clone())),
            surface: Box::new(ConsoleSurface::default()),
            activation: Box::new(ConsoleActivation::new(world, events_tx.clone())),
            timers: Box::new(TokioTimers::new(events_tx.clone(), |kind, token| {
                Event::TimerFired { kind, token }
            })),
            clock: Box::new(SystemClock),
        };

        if let Some(path) = &opt.replay {
            replay(path, deps)?;
            return Ok(());
        }

        let record = match &opt.record {
            Some(path) => Record::create(path)?,
            None => Record::disabled(),
        };
        let board = Switchboard::new(config.clone(), deps, record);

        ConfigWatcher::spawn(events_tx.clone(), &config, config_path);

        let signal_tx = events_tx.clone();
        ctrlc::set_handler(move || {
            signal_tx.send(Event::Shutdown);
        })
        .context("setting Ctrl+C handler")?;

        spawn_stdin_reader(events_tx);

        println!(
            "tapswitch console harness. Enter one RON event per line, e.g.\n\
             \x20 HotkeyPressed(app_switch)\n\
             \x20 HotkeyReleased(app_switch)\n\
             \x20 OverlayInput(Char('s'))\n\
             \x20 OverlayInput(Digit('2'))\n\
             EOF or Ctrl+C exits."
        );

        board.run(events_rx).await;
        Ok(())
    })
}

/// Reads RON events from stdin on a blocking thread. EOF shuts the engine
/// down; unparseable lines are reported and skipped.
fn spawn_stdin_reader(events_tx: actor::Sender<Event>) {
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                line.clear();
                match stdin.read_line(&mut line) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match ron::from_str::<Event>(trimmed) {
                    Ok(event) => events_tx.send(event),
                    Err(e) => eprintln!("unrecognized event: {e}"),
                }
            }
            events_tx.send(Event::Shutdown);
        })
        .expect("failed to spawn stdin-reader thread");
}

#[cfg(panic = "unwind")]
fn install_panic_hook() {
    // Abort on panic instead of propagating panics to the main thread.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        original_hook(info);
        std::process::abort();
    }));
}

#[cfg(not(panic = "unwind"))]
fn install_panic_hook() {}
