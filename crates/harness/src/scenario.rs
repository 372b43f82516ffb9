//! Scenario definitions and the context a scenario body runs in

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifacts::ScenarioArtifacts;
use crate::config::{EmulationProfile, HarnessConfig, ProxyProfile};
use crate::error::HarnessResult;
use crate::logger::{ScenarioStep, StepLog};
use crate::session::Session;
use crate::visual::{CapturedImage, ImageComparator};

/// Per-scenario browser setup, supplied explicitly at invocation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOptions {
    #[serde(default)]
    pub emulation: Option<EmulationProfile>,

    #[serde(default)]
    pub proxy: Option<ProxyProfile>,

    /// Two-letter country the traffic should appear to come from
    #[serde(default)]
    pub country_code: Option<String>,
}

impl ScenarioOptions {
    pub fn emulating(profile: EmulationProfile) -> Self {
        Self {
            emulation: Some(profile),
            ..Default::default()
        }
    }
}

/// The ordered steps of one test case.
#[async_trait]
pub trait ScenarioBody: Send + Sync {
    async fn run(&self, ctx: &ScenarioContext) -> HarnessResult<()>;
}

#[derive(Clone)]
pub struct Scenario {
    pub name: String,
    pub groups: Vec<String>,
    /// Scenario names or group names that must have passed first
    pub depends_on: Vec<String>,
    pub options: ScenarioOptions,
    pub enabled: bool,
    pub body: Arc<dyn ScenarioBody>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, body: impl ScenarioBody + 'static) -> Self {
        Self {
            name: name.into(),
            groups: Vec::new(),
            depends_on: Vec::new(),
            options: ScenarioOptions::default(),
            enabled: true,
            body: Arc::new(body),
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    pub fn depends_on(mut self, dependency: impl Into<String>) -> Self {
        self.depends_on.push(dependency.into());
        self
    }

    pub fn with_options(mut self, options: ScenarioOptions) -> Self {
        self.options = options;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("depends_on", &self.depends_on)
            .field("options", &self.options)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Everything a running scenario may touch. Owns the session for the
/// duration of the run.
pub struct ScenarioContext {
    name: String,
    session: Session,
    log: StepLog,
    artifacts: ScenarioArtifacts,
    config: Arc<HarnessConfig>,
    comparator: ImageComparator,
}

impl ScenarioContext {
    pub fn new(
        name: impl Into<String>,
        session: Session,
        artifacts: ScenarioArtifacts,
        config: Arc<HarnessConfig>,
    ) -> Self {
        let name = name.into();
        Self {
            log: StepLog::with_sink(name.clone(), artifacts.steps_path()),
            comparator: ImageComparator::new(config.channel_tolerance),
            name,
            session,
            artifacts,
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn log(&self) -> &StepLog {
        &self.log
    }

    pub fn artifacts(&self) -> &ScenarioArtifacts {
        &self.artifacts
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Configured similarity threshold
    pub fn accuracy(&self) -> f64 {
        self.config.accuracy
    }

    /// Hard assertion: recorded, and a false condition ends the scenario.
    pub fn assert_true(&self, condition: bool, message: &str) -> HarnessResult<()> {
        self.log.require(message, "true", &condition.to_string(), condition)
    }

    pub fn assert_false(&self, condition: bool, message: &str) -> HarnessResult<()> {
        self.log.require(message, "false", &condition.to_string(), !condition)
    }

    pub fn assert_eq<T>(&self, actual: &T, expected: &T, message: &str) -> HarnessResult<()>
    where
        T: PartialEq + Debug + ?Sized,
    {
        self.log.require(
            message,
            &format!("{:?}", expected),
            &format!("{:?}", actual),
            actual == expected,
        )
    }

    /// Soft check, see [`StepLog::check`].
    pub fn check(&self, description: &str, expected: &str, otherwise: &str, result: bool) -> bool {
        self.log.check(description, expected, otherwise, result)
    }

    /// Capture the viewport and keep it as step evidence.
    pub async fn capture(&self, label: &str) -> HarnessResult<CapturedImage> {
        let image = self.session.driver().capture_screenshot().await?;
        self.artifacts.save_screenshot(label, &image)?;
        Ok(image)
    }

    /// Same within the configured accuracy.
    pub fn images_match(&self, a: &CapturedImage, b: &CapturedImage) -> HarnessResult<bool> {
        self.images_match_at(a, b, self.config.accuracy)
    }

    /// Same within `accuracy`; a mismatch leaves a diff image next to the screenshots.
    pub fn images_match_at(&self, a: &CapturedImage, b: &CapturedImage, accuracy: f64) -> HarnessResult<bool> {
        let diff = self.comparator.diff(a, b, accuracy)?;
        debug!(
            "[{}] similarity {:.4} (accuracy {:.2})",
            self.name, diff.similarity, accuracy
        );
        if !diff.matches {
            self.artifacts.save_diff(&format!("step-{:03}", self.log.len()), &diff)?;
        }
        Ok(diff.matches)
    }

    pub(crate) fn into_parts(self) -> (Session, StepLog, ScenarioArtifacts) {
        (self.session, self.log, self.artifacts)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed { cause: String, evidence: Vec<PathBuf> },
    Skipped { reason: String },
}

impl ScenarioStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, ScenarioStatus::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ScenarioStatus::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ScenarioStatus::Skipped { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub name: String,
    pub groups: Vec<String>,
    pub status: ScenarioStatus,
    pub duration_ms: u64,
    pub steps: Vec<ScenarioStep>,
}
