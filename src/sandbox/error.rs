//! Domain-specific error types for sandbox provisioning.
//!
//! Callers receive one of a small, stable set of categories rather than raw
//! Docker error text, so the presentation layer can decide whether a retry
//! makes sense.

use std::time::Duration;

/// Errors that can occur while provisioning or tearing down a sandbox.
#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    /// The requested language has no configured image mapping.
    #[error("Unsupported language: {language}")]
    UnsupportedLanguage { language: String },

    /// The resolved image is not present in the local image store.
    #[error("Image not available locally: {image}")]
    ImageNotAvailable { image: String },

    /// No free host port was found within the allowed probe attempts.
    #[error("No free host port after {attempts} attempts in {range_start}-{range_end}")]
    PortExhausted {
        attempts: u32,
        range_start: u16,
        range_end: u16,
    },

    /// Container creation or start failed.
    #[error("Sandbox failed to start: {message}")]
    SandboxStartFailed { message: String },

    /// The container started but its IDE never accepted connections in time.
    /// The sandbox is left running; it may still warm up.
    #[error("Sandbox {sandbox_id} not ready after {timeout_secs}s at {endpoint}")]
    SandboxNotReady {
        sandbox_id: String,
        endpoint: String,
        timeout_secs: u64,
    },

    /// The container runtime is not running or not accessible.
    #[error("Container runtime unavailable: {message}")]
    RuntimeUnavailable { message: String },

    /// Best-effort teardown did not complete; the container's auto-remove
    /// reclaims it on exit.
    #[error("Termination incomplete for sandbox {sandbox_id}: {message}")]
    TerminationFailed { sandbox_id: String, message: String },
}

impl SandboxError {
    /// Creates an `UnsupportedLanguage` error.
    pub fn unsupported_language(language: impl Into<String>) -> Self {
        Self::UnsupportedLanguage {
            language: language.into(),
        }
    }

    /// Creates an `ImageNotAvailable` error.
    pub fn image_not_available(image: impl Into<String>) -> Self {
        Self::ImageNotAvailable {
            image: image.into(),
        }
    }

    /// Creates a `PortExhausted` error.
    pub fn port_exhausted(attempts: u32, range_start: u16, range_end: u16) -> Self {
        Self::PortExhausted {
            attempts,
            range_start,
            range_end,
        }
    }

    /// Creates a `SandboxStartFailed` error.
    pub fn start_failed(message: impl Into<String>) -> Self {
        Self::SandboxStartFailed {
            message: message.into(),
        }
    }

    /// Creates a `SandboxNotReady` error from the readiness timeout.
    pub fn not_ready(
        sandbox_id: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self::SandboxNotReady {
            sandbox_id: sandbox_id.into(),
            endpoint: endpoint.into(),
            timeout_secs: timeout.as_secs(),
        }
    }

    /// Creates a `RuntimeUnavailable` error.
    pub fn runtime_unavailable(message: impl Into<String>) -> Self {
        Self::RuntimeUnavailable {
            message: message.into(),
        }
    }

    /// Creates a `TerminationFailed` error.
    pub fn termination_failed(sandbox_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TerminationFailed {
            sandbox_id: sandbox_id.into(),
            message: message.into(),
        }
    }

    /// Returns true if the caller's input or the deployment is at fault;
    /// retrying the identical request will not help.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedLanguage { .. } | Self::ImageNotAvailable { .. }
        )
    }

    /// Returns true if the same request is worth retrying.
    ///
    /// `PortExhausted` clears as other sandboxes terminate,
    /// `SandboxStartFailed` may have lost a bind race, and a
    /// `SandboxNotReady` instance may simply still be warming up.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PortExhausted { .. }
                | Self::SandboxStartFailed { .. }
                | Self::SandboxNotReady { .. }
        )
    }

    /// Returns true if this is a readiness timeout.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::SandboxNotReady { .. })
    }
}
