//! Extension errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Registration failed: {0}")]
    RegistrationFailed(String),

    #[error("Shutdown failed: {0}")]
    ShutdownFailed(String),
}
