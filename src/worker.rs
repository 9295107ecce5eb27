use std::path::Path;
use std::time::Duration;
use log::{error, info};
use crate::config::Config;
use crate::manager_gridded::Gridded;
use crate::manager_nws::NWS;
use crate::publisher;
use crate::stop::StopSignal;

/// Fetches forecasts for all locations on the configured interval and
/// publishes each snapshot, until the stop signal is raised
///
/// # Arguments
///
/// * 'config' - the application configuration
/// * 'stop' - shutdown signal shared with the main thread
pub fn forecast_loop(config: &Config, stop: &StopSignal) {
    let nws = NWS::new();
    let interval = Duration::from_secs(config.forecast.interval_seconds);
    let output_path = Path::new(&config.forecast.output_path);

    loop {
        if stop.is_signalled() {
            break;
        }

        info!("fetching forecasts for {} locations", config.locations.len());
        let snapshot = nws.fetch_all(&config.locations);
        let ok = snapshot.locations.iter().filter(|l| l.error.is_none()).count();

        match publisher::publish(&snapshot, output_path) {
            Ok(()) => info!(
                "published {} of {} locations to {}",
                ok,
                snapshot.locations.len(),
                config.forecast.output_path
            ),
            Err(e) => error!("error publishing snapshot: {}", e),
        }

        if stop.wait_for(interval) {
            break;
        }
    }

    info!("forecast loop stopped");
}

/// Keeps the local gridded model cache in sync on the configured interval,
/// until the stop signal is raised. Does nothing when the cache is disabled.
///
/// # Arguments
///
/// * 'config' - the application configuration
/// * 'stop' - shutdown signal shared with the main thread
pub fn gridded_loop(config: &Config, stop: &StopSignal) {
    if !config.gridded.enabled {
        info!("gridded model cache disabled");
        return;
    }

    let gridded = Gridded::new(&config.gridded.cache_dir, &config.locations);
    let interval = Duration::from_secs(config.gridded.interval_seconds);

    loop {
        if stop.is_signalled() {
            break;
        }

        match gridded.sync(stop) {
            Ok(count) => info!("gridded sync complete, {} files downloaded", count),
            Err(e) => error!("error syncing gridded models: {}", e),
        }

        if stop.wait_for(interval) {
            break;
        }
    }

    info!("gridded loop stopped");
}
