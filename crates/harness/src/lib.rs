//! WikiQA verification harness
//!
//! This crate provides the core of a page-object driven UI test harness:
//! - A capability driver facade over browser automation (WebDriver adapter built on thirtyfour)
//! - Exclusively owned browser sessions with guaranteed teardown
//! - Page and component object building blocks with bounded waits
//! - Pixel-level image comparison for visual regression checks
//! - A scenario runner with dependency-aware skipping and per-step diagnostics
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Scenario Runner (SuiteRunner)              │
//! │    ├── order(scenarios)        -> dependency-sorted plan    │
//! │    ├── open session            -> SessionFactory            │
//! │    ├── body.run(ctx)           -> page / component objects  │
//! │    └── report                  -> SuiteReport + artifacts   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ScenarioContext                                            │
//! │    ├── session()   -> &Session (borrowed by page objects)   │
//! │    ├── log()       -> StepLog (append-only diagnostics)     │
//! │    ├── capture()   -> CapturedImage + screenshot artifact   │
//! │    └── assert_*()  -> hard assertions                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  PageContext / ComponentContext                             │
//! │    └── CapabilityDriver (navigate, find, click, gesture...) │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod artifacts;
pub mod config;
pub mod driver;
pub mod error;
pub mod logger;
pub mod page;
pub mod runner;
pub mod scenario;
pub mod session;
pub mod visual;
pub mod wait;
pub mod webdriver;

#[cfg(test)]
pub(crate) mod stub;

pub use config::{Browser, EmulationProfile, HarnessConfig, ProxyProfile, Viewport, WaitSettings};
pub use driver::{BrowserCommand, CapabilityDriver, ElementHandle, Gesture, Point};
pub use error::{ComparisonError, DriverError, DriverResult, HarnessError, HarnessResult};
pub use logger::{ScenarioStep, StepKind, StepLog};
pub use page::{ComponentContext, PageContext, PageObject};
pub use runner::{ScenarioFilter, SuiteReport, SuiteRunner};
pub use scenario::{Scenario, ScenarioBody, ScenarioContext, ScenarioOptions, ScenarioReport, ScenarioStatus};
pub use session::{Session, SessionFactory, SessionProfile};
pub use visual::{CapturedImage, ImageComparator, VisualDiff, DEFAULT_ACCURACY};
pub use wait::WaitConfig;
pub use webdriver::{WebDriverClient, WebDriverFactory};
