use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Monitor '{0}' not found")]
    NotFound(String),
    #[error("Monitor '{0}' already exists")]
    AlreadyExists(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchdogError {
    #[error("Monitor '{0}' not found. Register it first via POST /monitors.")]
    NotFound(String),
    #[error("Monitor '{0}' already exists. Use a unique device ID.")]
    DuplicateId(String),
    #[error("Timeout must be greater than 0 seconds, got {0}.")]
    InvalidTimeout(i64),
    #[error("Monitor '{0}' is already down. Create a new monitor to restart tracking.")]
    AlreadyDown(String),
    #[error("Monitor '{0}' is already paused.")]
    AlreadyPaused(String),
    #[error("Monitor '{0}' is already down. Cannot pause a down monitor.")]
    CannotPauseDown(String),
}

impl WatchdogError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            WatchdogError::NotFound(_) => "NotFound",
            WatchdogError::DuplicateId(_) => "DuplicateId",
            WatchdogError::InvalidTimeout(_) => "InvalidTimeout",
            WatchdogError::AlreadyDown(_) => "AlreadyDown",
            WatchdogError::AlreadyPaused(_) => "AlreadyPaused",
            WatchdogError::CannotPauseDown(_) => "CannotPauseDown",
        }
    }
}

impl From<StoreError> for WatchdogError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => WatchdogError::NotFound(id),
            StoreError::AlreadyExists(id) => WatchdogError::DuplicateId(id),
        }
    }
}
