use log::SetLoggerError;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("error in configuration: {0}")]
pub struct ConfigError(pub String);

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError(format!("file error: {}", e))
    }
}
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError(format!("toml error: {}", e))
    }
}
impl From<&str> for ConfigError {
    fn from(e: &str) -> Self {
        ConfigError(e.to_string())
    }
}
impl From<log4rs::config::runtime::ConfigErrors> for ConfigError {
    fn from(e: log4rs::config::runtime::ConfigErrors) -> Self {
        ConfigError(format!("log config error: {}", e))
    }
}
impl From<SetLoggerError> for ConfigError {
    fn from(e: SetLoggerError) -> Self {
        ConfigError(format!("logger error: {}", e))
    }
}

#[derive(Error, Debug)]
#[error("error publishing snapshot: {0}")]
pub struct PublishError(pub String);

impl From<std::io::Error> for PublishError {
    fn from(e: std::io::Error) -> Self {
        PublishError(format!("file error: {}", e))
    }
}
impl From<serde_json::Error> for PublishError {
    fn from(e: serde_json::Error) -> Self {
        PublishError(format!("json error: {}", e))
    }
}
