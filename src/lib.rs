//! This crate computes the exact number of steps that Busy Beaver champion machines run for.
//! Rather than simulating a machine, it sums the closed-form step counts of its repeating
//! glider loop and sweeps. It includes modules for parsing champion descriptors, validating
//! their constants, running the accumulation with arbitrary-precision integers, and rendering
//! the (often enormous) result.

pub mod accumulator;
pub mod analyzer;
pub mod champions;
pub mod loader;
pub mod notation;
pub mod parser;
pub mod report;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `StepAccumulator` struct from the accumulator module.
pub use accumulator::StepAccumulator;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports `ChampionInfo`, `ChampionRegistry`, and `CHAMPIONS` from the champions module.
pub use champions::{ChampionInfo, ChampionRegistry, CHAMPIONS};
/// Re-exports the `ChampionLoader` struct from the loader module.
pub use loader::ChampionLoader;
/// Re-exports the number renderings from the notation module.
pub use notation::{wrap_digits, Scientific};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the output renderers from the report module.
pub use report::{render_json, render_json_all, render_text, Report, ReportOptions};
/// Re-exports the descriptor and result types from the types module.
pub use types::{
    Champion, Recurrence, Step, StepError, Summary, SweepRecord, DEFAULT_DIAGNOSTIC_SWEEPS,
    DEFAULT_LINE_WIDTH, SCIENTIFIC_PRECISION,
};
