use thiserror::Error;

pub type Result<T> = std::result::Result<T, MonitoringError>;

#[derive(Debug, Error)]
pub enum MonitoringError {
    #[error("Metrics recorder error: {0}")]
    Recorder(String),
}
