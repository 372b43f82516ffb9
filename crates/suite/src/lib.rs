//! WikiQA suite
//!
//! Page objects for the wiki under test, touch gesture helpers, and the
//! Visual Editor category and Mercury lightbox scenarios that run on top of
//! [`wikiqa_harness`].

pub mod gestures;
pub mod pages;
pub mod scenarios;
pub mod wikitext;

pub use scenarios::all as all_scenarios;
