//! Unit tests for error.rs
//!
//! Tests all Error variants, classification helpers and the error macros.

use crate::error::{Error, Result};
use crate::engine::Engine;
use crate::log::{Logger, LogEntry, LogSeverity};
use std::sync::{Arc, Mutex};
use serial_test::serial;

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_configuration_error_display() {
    let err = Error::ConfigurationError("channel 'X' redeclared".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Configuration error"));
    assert!(display.contains("channel 'X' redeclared"));
}

#[test]
fn test_compile_error_display() {
    let err = Error::CompileError {
        program: "raylume/ambient_occlusion.rt".to_string(),
        message: "no kernel registered".to_string(),
    };
    let display = format!("{}", err);
    assert!(display.contains("Compile error"));
    assert!(display.contains("raylume/ambient_occlusion.rt"));
    assert!(display.contains("no kernel registered"));
}

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("dispatch failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("dispatch failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    assert_eq!(format!("{}", err), "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("Texture not found".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("Texture not found"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("no device".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("no device"));
}

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[test]
fn test_error_classification() {
    assert!(Error::ConfigurationError(String::new()).is_configuration());
    assert!(!Error::ConfigurationError(String::new()).is_compile());

    let compile = Error::CompileError { program: "p".into(), message: "m".into() };
    assert!(compile.is_compile());
    assert!(!compile.is_configuration());

    assert!(!Error::BackendError(String::new()).is_compile());
    assert!(!Error::OutOfMemory.is_configuration());
}

// ============================================================================
// ERROR TRAIT IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_error_is_std_error() {
    let err = Error::OutOfMemory;
    let _: &dyn std::error::Error = &err;
}

#[test]
fn test_error_clone_and_eq() {
    let err = Error::BackendError("test".to_string());
    assert_eq!(err.clone(), err);
}

#[test]
fn test_result_type_alias() {
    fn returns_ok() -> Result<i32> {
        Ok(42)
    }
    fn returns_err() -> Result<i32> {
        Err(Error::OutOfMemory)
    }
    assert_eq!(returns_ok().unwrap(), 42);
    assert!(returns_err().is_err());
}

// ============================================================================
// ERROR MACROS
// ============================================================================

struct TestLogger {
    entries: Arc<Mutex<Vec<(LogSeverity, String, bool)>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        if entry.source != "raylume::Test" {
            return;
        }
        self.entries.lock().unwrap().push((
            entry.severity,
            entry.message.clone(),
            entry.file.is_some(),
        ));
    }
}

fn failing_backend_call(code: u32) -> Result<()> {
    crate::engine_bail!("raylume::Test", "backend call failed with code {}", code);
}

fn failing_config_call(name: &str) -> Result<()> {
    crate::config_bail!("raylume::Test", "channel '{}' is incompatible", name);
}

#[test]
#[serial]
fn test_engine_bail_logs_and_returns_backend_error() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });

    let err = failing_backend_call(7).unwrap_err();
    assert_eq!(err, Error::BackendError("backend call failed with code 7".to_string()));

    let logged = entries.lock().unwrap().clone();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].0, LogSeverity::Error);
    assert_eq!(logged[0].1, "backend call failed with code 7");
    assert!(logged[0].2, "error entries carry file:line");

    Engine::reset_logger();
}

#[test]
#[serial]
fn test_config_bail_returns_configuration_error() {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(TestLogger { entries: entries.clone() });

    let err = failing_config_call("Acc").unwrap_err();
    assert!(err.is_configuration());
    assert!(format!("{}", err).contains("'Acc'"));
    assert_eq!(entries.lock().unwrap().len(), 1);

    Engine::reset_logger();
}
