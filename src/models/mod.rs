pub mod nws_forecast;
pub mod snapshot;
