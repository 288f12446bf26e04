//! Error types for the Raylume engine
//!
//! Three failure classes matter to the pipeline:
//! - `ConfigurationError`: detected while assembling or initializing the
//!   pipeline, fatal to startup
//! - `CompileError`: a program failed to build, fatal to the owning stage only
//! - everything else: backend failures that terminate the frame loop
//!
//! A channel or program that is simply not ready yet is not an error at all:
//! stages return `Ok(())` without doing anything for that frame.

use std::fmt;

/// Result type for Raylume engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Raylume engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid pipeline composition or incompatible channel declaration
    ConfigurationError(String),

    /// Execution backend failed to build a program
    CompileError {
        /// Program source reference
        program: String,
        /// Backend diagnostic
        message: String,
    },

    /// Backend-specific error (dispatch, copy, missing binding, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown texture or program handle)
    InvalidResource(String),

    /// Initialization failed
    InitializationFailed(String),
}

impl Error {
    /// True for errors that must abort pipeline startup
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::ConfigurationError(_))
    }

    /// True for errors that only disable the stage that produced them
    pub fn is_compile(&self) -> bool {
        matches!(self, Error::CompileError { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            Error::CompileError { program, message } => {
                write!(f, "Compile error in '{}': {}", program, message)
            }
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an error and build a `BackendError` from the same message
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("raylume::SoftwareDevice", "Unknown texture {:?}", id);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::raylume::Error::BackendError(message)
    }};
}

/// Log an error and return early with a `BackendError`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Log an error and build a `ConfigurationError` from the same message
#[macro_export]
macro_rules! config_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::raylume::Error::ConfigurationError(message)
    }};
}

/// Log an error and return early with a `ConfigurationError`
#[macro_export]
macro_rules! config_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::config_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
