mod cli;
mod console;
mod host;
mod logging;
mod scenario;

use pip_config::PipConfig;
use pip_coordinator::{Coordinator, JsonFileStore, MemoryStore, SessionStore};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use crate::console::Flow;
use crate::host::LocalHost;
use crate::scenario::Scenario;

fn main() {
    let args = cli::parse();

    // Config first: its log level feeds the subscriber.
    let loaded = pip_config::load_config(args.config.as_deref());
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    logging::init(args.log_level.as_deref(), level);

    tracing::info!("pipkeeper v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Some(ref path) = args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        PipConfig::default()
    });

    if args.print_config {
        println!("{}", pip_config::config_to_json(&config));
        return;
    }

    let scenario = match args.scenario.as_deref() {
        Some(path) => match Scenario::load(path) {
            Ok(scenario) => scenario,
            Err(e) => {
                tracing::error!("Scenario {}: {e}", path.display());
                std::process::exit(2);
            }
        },
        None => Scenario::builtin(),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(run(config, scenario, open_store(args.ephemeral)));
    tracing::info!("Shutdown complete");
}

fn open_store(ephemeral: bool) -> Box<dyn SessionStore> {
    if ephemeral {
        return Box::new(MemoryStore::new());
    }
    match JsonFileStore::default_path() {
        Some(path) => {
            tracing::debug!("Session file: {}", path.display());
            Box::new(JsonFileStore::new(path))
        }
        None => {
            tracing::warn!("No cache directory, PiP owner will not survive restarts");
            Box::new(MemoryStore::new())
        }
    }
}

async fn run(config: PipConfig, scenario: Scenario, store: Box<dyn SessionStore>) {
    let (host, mut host_events) = LocalHost::new(scenario, config.clone());
    let coordinator = Coordinator::new(host.clone(), store, &config);
    let mut bus = coordinator.subscribe();

    if let Some(owner) = coordinator.restore().await {
        println!("restored PiP owner {owner}");
    }

    println!("{}", console::HELP);
    print!("{}", console::render_tabs(&host));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    tracing::info!("Entering event loop");
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match console::parse(&line) {
                    Ok(Some(command)) => {
                        if console::execute(command, &host, &coordinator).await == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => println!("{e}"),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("stdin read failed: {e}");
                    break;
                }
            },
            Some(event) = host_events.recv() => {
                coordinator.dispatch(event);
            }
            event = bus.recv() => match event {
                Ok(event) => {
                    if let Some(line) = console::describe_event(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Event display lagged, skipped {skipped} events");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    coordinator.shutdown();
}
