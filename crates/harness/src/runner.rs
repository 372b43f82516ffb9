//! Suite runner: dependency ordering, session lifecycle, result collection

use std::collections::{BTreeSet, HashMap};
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::artifacts::ArtifactStore;
use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::logger::ScenarioStep;
use crate::scenario::{Scenario, ScenarioContext, ScenarioReport, ScenarioStatus};
use crate::session::SessionFactory;

/// Selects scenarios by name and/or group. Empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFilter {
    pub name: Option<String>,
    pub group: Option<String>,
}

impl ScenarioFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            group: None,
        }
    }

    pub fn by_group(group: impl Into<String>) -> Self {
        Self {
            name: None,
            group: Some(group.into()),
        }
    }

    pub fn matches(&self, scenario: &Scenario) -> bool {
        let name_ok = self.name.as_deref().map_or(true, |n| scenario.name == n);
        let group_ok = self.group.as_deref().map_or(true, |g| scenario.has_group(g));
        name_ok && group_ok
    }
}

/// Result of running a suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    /// 0 when nothing failed, 1 otherwise. Skips alone do not fail a run.
    pub fn exit_code(&self) -> i32 {
        if self.failed == 0 {
            0
        } else {
            1
        }
    }

    pub fn scenario(&self, name: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.name == name)
    }
}

pub struct SuiteRunner {
    config: Arc<HarnessConfig>,
    factory: Arc<dyn SessionFactory>,
    artifacts: ArtifactStore,
}

impl SuiteRunner {
    /// Validates `config` and prepares a clean output directory.
    pub fn new(config: HarnessConfig, factory: Arc<dyn SessionFactory>) -> HarnessResult<Self> {
        config.validate()?;
        let artifacts = ArtifactStore::prepare(&config.output_dir)?;
        Ok(Self {
            config: Arc::new(config),
            factory,
            artifacts,
        })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub async fn run(&self, scenarios: &[Scenario]) -> HarnessResult<SuiteReport> {
        self.run_filtered(scenarios, &ScenarioFilter::default()).await
    }

    /// Runs the scenarios matching `filter` together with everything they
    /// depend on, in dependency order.
    pub async fn run_filtered(
        &self,
        scenarios: &[Scenario],
        filter: &ScenarioFilter,
    ) -> HarnessResult<SuiteReport> {
        let plan = plan(scenarios, filter)?;
        let start = Instant::now();

        info!("Running {} scenario(s)...", plan.order.len());

        let mut passed: Vec<bool> = vec![false; scenarios.len()];
        let mut reports = Vec::with_capacity(plan.order.len());

        for &idx in &plan.order {
            let scenario = &scenarios[idx];
            let report = match self.precondition(scenario, &plan.dependencies[idx], &passed) {
                Some(reason) => {
                    warn!("- {} skipped: {}", scenario.name, reason);
                    ScenarioReport {
                        name: scenario.name.clone(),
                        groups: scenario.groups.clone(),
                        status: ScenarioStatus::Skipped { reason },
                        duration_ms: 0,
                        steps: Vec::new(),
                    }
                }
                None => self.run_scenario(scenario).await,
            };

            match &report.status {
                ScenarioStatus::Passed => {
                    passed[idx] = true;
                    info!("✓ {} ({} ms)", report.name, report.duration_ms);
                }
                ScenarioStatus::Failed { cause, .. } => {
                    error!("✗ {} - {}", report.name, cause);
                }
                ScenarioStatus::Skipped { .. } => {}
            }
            reports.push(report);
        }

        let count = |f: fn(&ScenarioStatus) -> bool| reports.iter().filter(|r| f(&r.status)).count();
        let report = SuiteReport {
            total: reports.len(),
            passed: count(ScenarioStatus::is_passed),
            failed: count(ScenarioStatus::is_failed),
            skipped: count(ScenarioStatus::is_skipped),
            duration_ms: start.elapsed().as_millis() as u64,
            scenarios: reports,
        };

        info!(
            "Results: {} passed, {} failed, {} skipped ({} ms)",
            report.passed, report.failed, report.skipped, report.duration_ms
        );
        Ok(report)
    }

    /// Writes the suite report as JSON into the output directory.
    pub fn write_results(&self, report: &SuiteReport) -> HarnessResult<PathBuf> {
        let path = self.artifacts.results_path();
        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)?;
        info!("Results written to: {}", path.display());
        Ok(path)
    }

    /// Reason to skip, if any. Never opens a session.
    fn precondition(
        &self,
        scenario: &Scenario,
        dependencies: &[Dependency],
        passed: &[bool],
    ) -> Option<String> {
        if !scenario.enabled {
            return Some("disabled".to_string());
        }
        dependencies
            .iter()
            .find(|dep| !dep.members.iter().all(|&m| passed[m]))
            .map(|dep| {
                HarnessError::DependencyNotSatisfied {
                    scenario: scenario.name.clone(),
                    dependency: dep.name.clone(),
                }
                .to_string()
            })
    }

    async fn run_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        let start = Instant::now();
        debug!("Running scenario: {}", scenario.name);

        let (status, steps) = self.execute(scenario).await;

        ScenarioReport {
            name: scenario.name.clone(),
            groups: scenario.groups.clone(),
            status,
            duration_ms: start.elapsed().as_millis() as u64,
            steps,
        }
    }

    async fn execute(&self, scenario: &Scenario) -> (ScenarioStatus, Vec<ScenarioStep>) {
        let failed = |cause: String| ScenarioStatus::Failed {
            cause,
            evidence: Vec::new(),
        };

        let artifacts = match self.artifacts.scenario(&scenario.name) {
            Ok(artifacts) => artifacts,
            Err(e) => return (failed(e.to_string()), Vec::new()),
        };
        let session = match self.factory.open(&scenario.options).await {
            Ok(session) => session,
            Err(e) => return (failed(format!("Could not open session: {}", e)), Vec::new()),
        };

        let ctx = ScenarioContext::new(&scenario.name, session, artifacts, self.config.clone());

        let outcome = match AssertUnwindSafe(scenario.body.run(&ctx)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => Err(HarnessError::ScenarioPanicked(panic_message(panic.as_ref()))),
        };

        let status = match outcome {
            Ok(()) => ScenarioStatus::Passed,
            Err(e) => ScenarioStatus::Failed {
                cause: e.to_string(),
                evidence: collect_evidence(&ctx).await,
            },
        };

        let (session, log, _) = ctx.into_parts();
        if let Err(e) = session.close().await {
            warn!("Failed to close session for {}: {}", scenario.name, e);
        }

        (status, log.steps())
    }
}

/// Final screenshot plus the step log, whichever are available.
async fn collect_evidence(ctx: &ScenarioContext) -> Vec<PathBuf> {
    let mut evidence = Vec::new();
    match ctx.session().driver().capture_screenshot().await {
        Ok(image) => match ctx.artifacts().save_screenshot("failure", &image) {
            Ok(path) => evidence.push(path),
            Err(e) => warn!("Could not save failure screenshot: {}", e),
        },
        Err(e) => warn!("Could not capture failure screenshot: {}", e),
    }
    let steps = ctx.artifacts().steps_path();
    if steps.exists() {
        evidence.push(steps);
    }
    evidence
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// A declared dependency resolved to scenario indices.
#[derive(Debug, Clone)]
struct Dependency {
    name: String,
    members: Vec<usize>,
}

#[derive(Debug)]
struct Plan {
    order: Vec<usize>,
    dependencies: Vec<Vec<Dependency>>,
}

fn plan(scenarios: &[Scenario], filter: &ScenarioFilter) -> HarnessResult<Plan> {
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    for (idx, scenario) in scenarios.iter().enumerate() {
        if by_name.insert(scenario.name.as_str(), idx).is_some() {
            return Err(HarnessError::Config(format!(
                "duplicate scenario name '{}'",
                scenario.name
            )));
        }
    }

    let mut dependencies = Vec::with_capacity(scenarios.len());
    for (idx, scenario) in scenarios.iter().enumerate() {
        let mut resolved = Vec::new();
        for dep in &scenario.depends_on {
            let members: Vec<usize> = match by_name.get(dep.as_str()) {
                Some(&m) => vec![m],
                None => scenarios
                    .iter()
                    .enumerate()
                    .filter(|(m, s)| *m != idx && s.has_group(dep))
                    .map(|(m, _)| m)
                    .collect(),
            };
            if members.is_empty() {
                return Err(HarnessError::Config(format!(
                    "scenario '{}' depends on unknown scenario or group '{}'",
                    scenario.name, dep
                )));
            }
            if members.contains(&idx) {
                return Err(HarnessError::DependencyCycle(scenario.name.clone()));
            }
            resolved.push(Dependency {
                name: dep.clone(),
                members,
            });
        }
        dependencies.push(resolved);
    }

    // Selected scenarios plus their transitive dependencies
    let mut selected: BTreeSet<usize> = BTreeSet::new();
    let mut pending: Vec<usize> = (0..scenarios.len())
        .filter(|&i| filter.matches(&scenarios[i]))
        .collect();
    if pending.is_empty() && (filter.name.is_some() || filter.group.is_some()) {
        return Err(HarnessError::Config(format!("no scenario matches {:?}", filter)));
    }
    while let Some(idx) = pending.pop() {
        if selected.insert(idx) {
            for dep in &dependencies[idx] {
                pending.extend(dep.members.iter().copied());
            }
        }
    }

    // Kahn's algorithm, always taking the earliest declared ready scenario
    let mut order = Vec::with_capacity(selected.len());
    let mut done = vec![false; scenarios.len()];
    while order.len() < selected.len() {
        let ready = selected.iter().copied().find(|&idx| {
            !done[idx]
                && dependencies[idx]
                    .iter()
                    .all(|d| d.members.iter().all(|&m| done[m]))
        });
        match ready {
            Some(idx) => {
                done[idx] = true;
                order.push(idx);
            }
            None => {
                let stuck = selected
                    .iter()
                    .copied()
                    .find(|&idx| !done[idx])
                    .map(|idx| scenarios[idx].name.clone())
                    .unwrap_or_default();
                return Err(HarnessError::DependencyCycle(stuck));
            }
        }
    }

    Ok(Plan {
        order,
        dependencies,
    })
}
