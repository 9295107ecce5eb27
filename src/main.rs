mod config;
mod daily;
mod errors;
mod extents;
mod hourly;
mod initialization;
mod intervals;
mod location;
mod manager_gridded;
mod manager_nws;
mod metrics;
mod models;
mod publisher;
mod stop;
mod units;
mod worker;

use std::env;
use std::sync::Arc;
use std::thread;
use anyhow::Context;
use log::info;
use crate::config::load_config;
use crate::initialization::setup_logger;
use crate::stop::StopSignal;

/// Retries a fallible closure up to three times with a growing pause between
/// attempts, returning the last error when all attempts fail. The pause waits
/// on the stop signal, so a shutdown request cuts the backoff short and the
/// last error is returned right away.
#[macro_export]
macro_rules! retry {
    ($stop:expr, $f:expr) => {{
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match $f() {
                Ok(val) => break Ok(val),
                Err(e) if attempt < 3 => {
                    log::warn!("attempt {} failed: {}, retrying", attempt, e);
                    if $stop.wait_for(std::time::Duration::from_secs(5 * attempt)) {
                        break Err(e);
                    }
                }
                Err(e) => break Err(e),
            }
        }
    }};
}

fn main() -> anyhow::Result<()> {
    let config_path = env::args().nth(1).unwrap_or_else(|| "wxpoint.toml".to_string());
    let config = Arc::new(load_config(&config_path)?);

    setup_logger(&config.general)?;
    info!("wxpoint version: {}", env!("CARGO_PKG_VERSION"));

    let stop = Arc::new(StopSignal::new());

    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_stop.signal())
        .context("error installing shutdown handler")?;

    let forecast_config = Arc::clone(&config);
    let forecast_stop = Arc::clone(&stop);
    let forecast = thread::spawn(move || worker::forecast_loop(&forecast_config, &forecast_stop));

    let gridded_config = Arc::clone(&config);
    let gridded_stop = Arc::clone(&stop);
    let gridded = thread::spawn(move || worker::gridded_loop(&gridded_config, &gridded_stop));

    let _ = forecast.join();
    let _ = gridded.join();

    info!("wxpoint stopped");

    Ok(())
}
