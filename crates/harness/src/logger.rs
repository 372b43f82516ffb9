//! Step-level result log
//!
//! An append-only trace of what a scenario checked and what it observed.
//! It never influences the scenario outcome: write failures are reported
//! through `tracing` and otherwise ignored.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Soft observation, recorded only
    Check,
    /// Hard assertion; a false result stops the scenario
    Assertion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub index: usize,
    pub kind: StepKind,
    pub description: String,
    pub expected: String,
    pub actual: String,
    pub result: bool,
    pub timestamp: DateTime<Utc>,
}

pub struct StepLog {
    scenario: String,
    steps: Mutex<Vec<ScenarioStep>>,
    sink: Option<PathBuf>,
}

impl StepLog {
    /// In-memory log only
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            steps: Mutex::new(Vec::new()),
            sink: None,
        }
    }

    /// Log that also appends one JSON line per step to `path`
    pub fn with_sink(scenario: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            sink: Some(path.into()),
            ..Self::new(scenario)
        }
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn sink(&self) -> Option<&Path> {
        self.sink.as_deref()
    }

    /// Records a soft check. `actual` is `expected` when the check held,
    /// `otherwise` when it did not. Returns `result` for chaining.
    pub fn check(&self, description: &str, expected: &str, otherwise: &str, result: bool) -> bool {
        let actual = if result { expected } else { otherwise };
        self.append(StepKind::Check, description, expected, actual, result);
        result
    }

    /// Records an observation that held.
    pub fn pass(&self, description: &str, label: &str) {
        self.append(StepKind::Check, description, label, label, true);
    }

    pub fn record_assertion(&self, description: &str, expected: &str, actual: &str, result: bool) {
        self.append(StepKind::Assertion, description, expected, actual, result);
    }

    /// Hard assertion: recorded, then `Err` when it does not hold.
    pub fn require(&self, description: &str, expected: &str, actual: &str, holds: bool) -> HarnessResult<()> {
        self.record_assertion(description, expected, actual, holds);
        if holds {
            Ok(())
        } else {
            Err(HarnessError::Assertion(format!(
                "{}: expected {}, got {}",
                description, expected, actual
            )))
        }
    }

    pub fn steps(&self) -> Vec<ScenarioStep> {
        self.steps.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.steps.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.lock().is_empty()
    }

    /// Number of failed checks and assertions
    pub fn failures(&self) -> usize {
        self.steps.lock().iter().filter(|s| !s.result).count()
    }

    fn append(&self, kind: StepKind, description: &str, expected: &str, actual: &str, result: bool) {
        let step = {
            let mut steps = self.steps.lock();
            let step = ScenarioStep {
                index: steps.len(),
                kind,
                description: description.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                result,
                timestamp: Utc::now(),
            };
            steps.push(step.clone());
            step
        };

        if result {
            info!("[{}] {} - {}", self.scenario, description, actual);
        } else {
            warn!("[{}] {} - {} (expected: {})", self.scenario, description, actual, expected);
        }

        if let Some(path) = &self.sink {
            if let Err(e) = write_line(path, &step) {
                warn!("Could not write step log {}: {}", path.display(), e);
            }
        }
    }
}

fn write_line(path: &Path, step: &ScenarioStep) -> std::io::Result<()> {
    let line = serde_json::to_string(step)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", line)
}
