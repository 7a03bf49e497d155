use ble2mqtt::app::{self, RunError, SESSION_TIMEOUT};
use ble2mqtt::config::Config;
use ble2mqtt::publish::MqttPublisher;
use ble2mqtt::registry::SensorRegistry;
use clap::Parser;
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;
use tokio::sync::watch;

#[cfg(not(feature = "bluer"))]
compile_error!("the 'bluer' feature is required to build the ble2mqtt binary");

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

#[derive(Parser, Debug)]
#[command(author, about, version)]
struct Options {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', default_value = "/etc/ble2mqtt.toml")]
    config: PathBuf,

    /// Verbose output, log every decoded advertisement
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Load configuration, connect to the broker, and run the scan loop until a
/// shutdown signal or a fatal fault.
async fn run(options: Options) -> Result<(), RunError> {
    let config = Config::load(&options.config)?;
    log::debug!(
        "configuration loaded: {} sensors, broker {}:{}",
        config.sensors.len(),
        config.mqtt.host,
        config.mqtt.port
    );

    let registry = SensorRegistry::new(&config.sensors);
    let publisher = MqttPublisher::connect(&config.mqtt).await?;
    let transceiver = ble2mqtt::scanner::bluer::BluerTransceiver::new();

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("shutdown signal received, finishing current scan session");
            let _ = cancel_tx.send(true);
        }
    });

    app::run(
        &transceiver,
        &publisher,
        &registry,
        &config.topics,
        SESSION_TIMEOUT,
        cancel_rx,
    )
    .await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();

    let default_level = if options.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(options).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            log::error!("{}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
