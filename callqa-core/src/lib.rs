//! CallQA Core - Entity Types
//!
//! Pure data structures shared by every CallQA crate: the rubric model,
//! evaluation results returned by the analyzer backend, rollup and coaching
//! shapes, configuration and the error hierarchy.
//! This crate contains ONLY data types - no scoring or editing logic.

pub mod config;
pub mod enums;
pub mod error;
pub mod evaluation;
pub mod identity;
pub mod insight;
pub mod rubric;
pub mod section_map;
pub mod serde_helpers;

pub use config::*;
pub use enums::*;
pub use error::*;
pub use evaluation::*;
pub use identity::*;
pub use insight::*;
pub use rubric::*;
pub use section_map::SectionMap;
