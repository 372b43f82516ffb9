//! WikiQA CLI - Main Entry Point
//!
//! Runs the wiki verification scenarios against a WebDriver endpoint and
//! lists what is registered.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use wikiqa_harness::{
    Browser, HarnessConfig, Scenario, ScenarioFilter, ScenarioStatus, SuiteReport, SuiteRunner, WebDriverFactory,
};

/// Exit code for configuration and infrastructure failures
const EXIT_HARNESS_ERROR: i32 = 2;

/// WikiQA - page-object UI verification for the wiki
#[derive(Parser)]
#[command(name = "wikiqa")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = "wikiqa.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run scenarios
    Run(RunArgs),

    /// List registered scenarios
    List,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Only scenarios in this group (and what they depend on)
    #[arg(long)]
    group: Option<String>,

    /// Only the scenario with this name (and what it depends on)
    #[arg(long)]
    name: Option<String>,

    /// Wiki under test
    #[arg(long, env = "WIKIQA_BASE_URL")]
    base_url: Option<String>,

    /// WebDriver endpoint
    #[arg(long, env = "WIKIQA_WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    #[arg(long)]
    browser: Option<BrowserArg>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Screenshot similarity threshold in [0, 1]
    #[arg(long)]
    accuracy: Option<f64>,

    /// Where logs, screenshots and results.json go
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BrowserArg {
    Chrome,
    Firefox,
}

impl From<BrowserArg> for Browser {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chrome => Browser::Chrome,
            BrowserArg::Firefox => Browser::Firefox,
        }
    }
}

impl RunArgs {
    fn apply(&self, config: &mut HarnessConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(url) = &self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if let Some(browser) = self.browser {
            config.browser = browser.into();
        }
        if self.headed {
            config.headless = false;
        }
        if let Some(accuracy) = self.accuracy {
            config.accuracy = accuracy;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
    }

    fn filter(&self) -> ScenarioFilter {
        ScenarioFilter {
            name: self.name.clone(),
            group: self.group.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let scenarios = wikiqa_suite::all_scenarios();

    let code = match cli.command {
        Commands::List => {
            print_scenarios(&scenarios);
            0
        }
        Commands::Run(args) => match run(&cli.config, &args, &scenarios).await {
            Ok(report) => {
                print_report(&report);
                report.exit_code()
            }
            Err(e) => {
                eprintln!("{} {:#}", "❌".red(), e);
                EXIT_HARNESS_ERROR
            }
        },
    };

    std::process::exit(code);
}

async fn run(config_path: &Path, args: &RunArgs, scenarios: &[Scenario]) -> anyhow::Result<SuiteReport> {
    let mut config = HarnessConfig::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    args.apply(&mut config);

    let factory = WebDriverFactory::new(config.clone());
    factory
        .wait_until_ready()
        .await
        .context("WebDriver endpoint is not available")?;

    let runner = SuiteRunner::new(config, Arc::new(factory))?;
    let report = runner.run_filtered(scenarios, &args.filter()).await?;
    runner.write_results(&report)?;
    Ok(report)
}

fn print_scenarios(scenarios: &[Scenario]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["NAME", "GROUPS", "DEPENDS ON", "DEVICE", "ENABLED"]);

    for scenario in scenarios {
        table.add_row(vec![
            scenario.name.clone(),
            scenario.groups.join(", "),
            scenario.depends_on.join(", "),
            scenario
                .options
                .emulation
                .map(|e| e.device_name().to_string())
                .unwrap_or_else(|| "-".to_string()),
            if scenario.enabled { "yes" } else { "no" }.to_string(),
        ]);
    }

    println!("{table}");
}

fn print_report(report: &SuiteReport) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["SCENARIO", "STATUS", "DURATION", "DETAIL"]);

    for scenario in &report.scenarios {
        let (status, detail) = match &scenario.status {
            ScenarioStatus::Passed => ("passed".green().to_string(), String::new()),
            ScenarioStatus::Failed { cause, .. } => ("failed".red().to_string(), cause.clone()),
            ScenarioStatus::Skipped { reason } => ("skipped".yellow().to_string(), reason.clone()),
        };
        table.add_row(vec![
            scenario.name.clone(),
            status,
            format!("{} ms", scenario.duration_ms),
            detail,
        ]);
    }

    println!("{table}");

    let summary = format!(
        "{} passed, {} failed, {} skipped ({} ms)",
        report.passed, report.failed, report.skipped, report.duration_ms
    );
    if report.failed == 0 {
        println!("✅ {}", summary.green());
    } else {
        println!("❌ {}", summary.red());
    }
}
