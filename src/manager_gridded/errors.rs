use thiserror::Error;

/// Error from the gridded model cache manager
#[derive(Error, Debug)]
#[error("error in gridded model sync: {0}")]
pub struct GriddedError(pub String);

impl From<ureq::Error> for GriddedError {
    fn from(e: ureq::Error) -> Self {
        GriddedError(format!("http request error: {}", e))
    }
}

impl From<std::io::Error> for GriddedError {
    fn from(e: std::io::Error) -> Self {
        GriddedError(format!("file error: {}", e))
    }
}

impl From<glob::PatternError> for GriddedError {
    fn from(e: glob::PatternError) -> Self {
        GriddedError(format!("cache pattern error: {}", e))
    }
}
