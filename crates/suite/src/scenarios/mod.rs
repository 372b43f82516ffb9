//! Scenario registry

pub mod lightbox;
pub mod ve_category;

use wikiqa_harness::Scenario;

/// Every scenario the suite knows about, Visual Editor first.
pub fn all() -> Vec<Scenario> {
    let mut scenarios = ve_category::scenarios();
    scenarios.extend(lightbox::scenarios());
    scenarios
}
