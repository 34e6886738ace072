//! CallQA Insights - Rollups and Coaching Selection
//!
//! Aggregates evaluation results into the supervisor dashboard rollup and
//! picks out the calls that need coaching. Both are pure functions over
//! already-fetched results.

pub mod coaching;
pub mod rollup;

pub use coaching::{categorize, label_listing, qualifies, select};
pub use rollup::{
    average_score, common_failures, filter_region, recent_calls, rollup, score_band,
    sop_pass_rate,
};
