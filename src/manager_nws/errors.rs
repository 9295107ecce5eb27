use thiserror::Error;

/// Error from the NWS manager
#[derive(Error, Debug)]
#[error("error in communication with api.weather.gov: {0}")]
pub struct NWSError(pub String);

impl From<ureq::Error> for NWSError {
    fn from(e: ureq::Error) -> Self {
        NWSError(format!("http request error: {}", e))
    }
}

impl From<serde_json::Error> for NWSError {
    fn from(e: serde_json::Error) -> Self {
        NWSError(format!("json document error: {}", e))
    }
}
