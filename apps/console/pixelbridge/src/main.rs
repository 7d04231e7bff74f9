use pixelbridge::command::{Command, HELP};
use pixelbridge::error::PixelBridgeError;
use pixelbridge::logger::initialize as LoggerInitialize;

use bridge_core::config::BridgeConfig;
use bridge_core::error::CoreError;
use bridge_core::input::{prepare_outgoing, reset_message, space_message};
use bridge_core::link::{ConnectionMonitor, ReadOutcome, SessionIo};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::io::{BufRead, stdin};
use std::panic::Location;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::runtime::Builder;

const APP_DIR_NAME: &str = "pixelbridge";

/// Receive poller pause while the link is down.
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), PixelBridgeError> {
    let config_dir = resolve_config_dir()?;

    create_dir_all(&config_dir).map_err(|e| PixelBridgeError::PixelBridge {
        message: format!("Failed to create config directory: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    // Logger FIRST so config problems are recorded
    LoggerInitialize(&config_dir)?;

    info!("PixelBridge starting");
    info!("Config directory: {}", config_dir.display());

    let config = BridgeConfig::load_or_create(&config_dir).unwrap_or_else(|e| {
        warn!("Falling back to default config: {e}");
        BridgeConfig::default()
    });

    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("pixelbridge-link")
        .enable_all()
        .build()
        .map_err(|e| PixelBridgeError::PixelBridge {
            message: format!("Failed to build tokio runtime: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let endpoint = config.endpoint().map_err(CoreError::from)?;
    let monitor = ConnectionMonitor::with_runtime(
        endpoint,
        config.monitor_settings(),
        print_state,
        runtime.handle().clone(),
    )
    .map_err(CoreError::from)?;

    println!("PixelBridge -> {}", monitor.endpoint());
    println!("{HELP}");

    monitor.connect();
    monitor.start_monitoring();

    let running = Arc::new(AtomicBool::new(true));
    let receiver = spawn_receiver(monitor.session(), Arc::clone(&running), &config)?;

    let outcome = console_loop(&monitor, &config);

    running.store(false, Ordering::Release);
    monitor.stop_monitoring();
    if receiver.join().is_err() {
        warn!("Receive thread panicked");
    }

    drop(monitor);
    runtime.shutdown_timeout(Duration::from_secs(1));
    info!("PixelBridge stopped");

    outcome
}

/// First CLI argument, else the platform config dir.
fn resolve_config_dir() -> Result<PathBuf, PixelBridgeError> {
    if let Some(dir) = std::env::args_os().nth(1) {
        return Ok(PathBuf::from(dir));
    }

    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| PixelBridgeError::PixelBridge {
            message: "No config directory on this platform, pass one as the first argument"
                .to_string(),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn print_state(connected: bool) {
    if connected {
        println!("✅ Connected");
    } else {
        println!("❎ Disconnected");
    }
}

fn spawn_receiver(
    session: SessionIo,
    running: Arc<AtomicBool>,
    config: &BridgeConfig,
) -> Result<JoinHandle<()>, PixelBridgeError> {
    let read_timeout = Duration::from_millis(config.link.read_timeout_ms);

    thread::Builder::new()
        .name("pixelbridge-receive".to_string())
        .spawn(move || {
            while running.load(Ordering::Acquire) {
                match session.try_receive(read_timeout) {
                    ReadOutcome::Data(data) => println!("<< {}", data.trim_end()),
                    ReadOutcome::Empty => {}
                    ReadOutcome::Closed | ReadOutcome::Failed | ReadOutcome::Unavailable => {
                        thread::sleep(IDLE_POLL);
                    }
                }
            }
            debug!("Receive thread exited");
        })
        .map_err(|e| PixelBridgeError::Console {
            message: format!("Failed to spawn receive thread: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })
}

fn console_loop(
    monitor: &ConnectionMonitor,
    config: &BridgeConfig,
) -> Result<(), PixelBridgeError> {
    for line in stdin().lock().lines() {
        let line = line.map_err(|e| PixelBridgeError::Console {
            message: format!("Failed to read stdin: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        match Command::parse(&line) {
            Command::Send(text) => match prepare_outgoing(&config.input, &text) {
                Ok(Some(message)) => send(monitor, &message),
                Ok(None) => {}
                Err(e) => println!("Not sent: {e}"),
            },
            Command::Reset => match reset_message(&config.input) {
                Some(message) => send(monitor, &message),
                None => println!("Reset is disabled"),
            },
            Command::Space => match space_message(&config.input) {
                Some(message) => send(monitor, &message),
                None => println!("Quick-send is disabled"),
            },
            Command::Pause => {
                monitor.suspend_probing();
                println!("Probing paused");
            }
            Command::Resume => {
                monitor.resume_probing();
                println!("Probing resumed");
            }
            Command::Status => println!("{}: {}", monitor.endpoint(), monitor.state()),
            Command::Quit => break,
            Command::Unknown(word) => println!("Unknown command ':{word}'. {HELP}"),
        }
    }

    Ok(())
}

fn send(monitor: &ConnectionMonitor, message: &str) {
    if monitor.send(message) {
        println!(">> {message}");
    } else {
        println!("Not sent: {} is not connected", monitor.endpoint());
    }
}
