//! Error types for the verification harness

use std::time::Duration;
use thiserror::Error;

/// Failures raised by the browser automation backend.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Timeout after {timeout:?} waiting for: {condition}")]
    Timeout { condition: String, timeout: Duration },

    #[error("Navigation to '{url}' failed: {reason}")]
    NavigationFailed { url: String, reason: String },

    #[error("Browser session lost: {0}")]
    SessionLost(String),

    #[error("WebDriver protocol error: {0}")]
    Protocol(String),

    #[error("Screenshot decode error: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Malformed or incompatible input handed to the image comparator.
///
/// Never conflated with a negative comparison result.
#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error("Cannot decode {which} image: {reason}")]
    Decode { which: &'static str, reason: String },

    #[error("Cannot encode image: {0}")]
    Encode(String),

    #[error("Image has no pixels: {0}")]
    Empty(&'static str),

    #[error("Image dimensions differ: {left:?} vs {right:?}")]
    DimensionMismatch { left: (u32, u32), right: (u32, u32) },

    #[error("Accuracy must be within [0, 1], got {0}")]
    InvalidAccuracy(f64),
}

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Scenario panicked: {0}")]
    ScenarioPanicked(String),

    #[error("Dependency not satisfied: {scenario} requires {dependency}")]
    DependencyNotSatisfied { scenario: String, dependency: String },

    #[error("Image comparison error: {0}")]
    Comparison(#[from] ComparisonError),

    #[error("Illegal transition on {page}: {reason}")]
    IllegalTransition { page: String, reason: String },

    #[error("Stale page object: {page} was superseded by a navigation or page transition")]
    StalePageObject { page: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Dependency cycle involving scenario '{0}'")]
    DependencyCycle(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type HarnessResult<T> = Result<T, HarnessError>;

impl HarnessError {
    /// True for failures of an expectation rather than of the harness itself.
    pub fn is_assertion(&self) -> bool {
        matches!(self, HarnessError::Assertion(_))
    }
}
