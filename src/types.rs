//! This module defines the core data structures and types used throughout the step calculator,
//! including the per-champion recurrence constants, accumulator outcomes, and error types.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rule;

/// Number of exact digits printed per line.
pub const DEFAULT_LINE_WIDTH: usize = 70;
/// Number of digits after the decimal point in the scientific rendering.
pub const SCIENTIFIC_PRECISION: usize = 3;
/// Diagnostic sweep bound used when diagnostics are forced on.
pub const DEFAULT_DIAGNOSTIC_SWEEPS: usize = 10;
/// File extension of champion descriptor files.
pub const DESCRIPTOR_EXTENSION: &str = "bb";
/// The maximum allowed size for a descriptor file in bytes.
pub const MAX_DESCRIPTOR_SIZE: usize = 16384; // 16KB

/// A Busy Beaver champion together with the recurrence describing its run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Champion {
    /// Display name of the champion.
    pub name: String,
    /// The machine's program code, if known.
    pub program: Option<String>,
    /// The closed-form constants of its glider loop and sweeps.
    pub recurrence: Recurrence,
    /// Sweeps shorter than this are reported as diagnostics (0 disables them).
    pub diagnostics: usize,
}

/// The constants of one machine's glider-loop/sweep recurrence.
///
/// Every step count of a run is derived from these values; nothing else
/// feeds into the accumulation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recurrence {
    /// Steps taken until the first glider loop is entered.
    pub bootstrap: u64,
    /// Initial glider loop counter.
    pub counter: u64,
    /// Factor the glider counter grows by on every pass.
    pub multiplier: u64,
    pub glider: GliderCost,
    pub sweep: SweepCost,
    pub exit_rule: ExitRule,
    pub final_sweep: FinalSweepCost,
}

/// Steps of one glider loop pass: `per_counter * counter - offset`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GliderCost {
    pub per_counter: u64,
    /// Subtracted on the very first pass.
    pub first_offset: u64,
    /// Subtracted on every later pass.
    pub offset: u64,
}

impl GliderCost {
    /// Returns the step count of a glider pass consuming `counter` gliders.
    pub fn cost(&self, counter: &BigUint, first: bool) -> BigUint {
        let offset = if first { self.first_offset } else { self.offset };
        counter * self.per_counter - offset
    }
}

/// Steps of one sweep: `per_sweep * len + base`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepCost {
    pub per_sweep: u64,
    /// Added for the sweep of length 1.
    pub first_base: u64,
    /// Added for every longer sweep.
    pub base: u64,
}

impl SweepCost {
    pub fn cost(&self, sweep_len: u64) -> BigUint {
        let base = if sweep_len == 1 {
            self.first_base
        } else {
            self.base
        };
        BigUint::from(sweep_len) * self.per_sweep + base
    }
}

/// Detects the sweep after which the glider loop runs dry.
///
/// The sweep value is `factor * counter - 1`, taken from the counter before it
/// is multiplied. Once it is divisible by `divisor` (skipping the first sweep),
/// `value / divisor - drop` more passes remain.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExitRule {
    pub factor: u64,
    pub divisor: u64,
    pub drop: u64,
}

impl ExitRule {
    pub fn sweep_value(&self, counter: &BigUint) -> BigUint {
        counter * self.factor - 1u32
    }
}

/// Steps of the closing sweep: `entry + per_sweep * (len - exit + offset) + exit`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinalSweepCost {
    pub entry: u64,
    pub per_sweep: u64,
    pub offset: u64,
    pub exit: u64,
}

impl FinalSweepCost {
    /// `sweep_len` is never below `sweep_exit` once the countdown has finished.
    pub fn cost(&self, sweep_len: u64, sweep_exit: u64) -> BigUint {
        let span = BigUint::from(sweep_len - sweep_exit) + self.offset;
        span * self.per_sweep + self.entry + self.exit
    }
}

/// The exit detection state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// The divisibility condition has not fired yet.
    Searching,
    /// The exit sweep is known and `pending` passes remain.
    Countdown { sweep_exit: u64, pending: BigUint },
}

/// What one iteration of the accumulator observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepRecord {
    pub sweep_len: u64,
    pub sweep_val: BigUint,
    /// Remaining passes after this iteration, once the exit is known.
    pub pending: Option<BigUint>,
}

/// Represents the outcome of a single accumulator iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A glider pass and a sweep were added; more follow.
    Continue(SweepRecord),
    /// The countdown reached zero and the final sweep was added.
    Halt,
}

/// The result of running a champion's recurrence to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub name: String,
    /// Total number of steps the machine runs for.
    pub steps: BigUint,
    pub sweep_exit: u64,
    /// Sweep length at loop exit.
    pub sweep_len: u64,
    pub iterations: u64,
    /// `(sweep_len, sweep_val)` pairs of the leading sweeps.
    pub diagnostics: Vec<(u64, BigUint)>,
}

/// Represents various errors that can occur while loading or running a champion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepError {
    /// Indicates an error during the parsing of a champion descriptor.
    #[error("Descriptor parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a descriptor whose constants cannot describe a terminating run.
    #[error("Descriptor validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to reading descriptor files.
    #[error("File error: {0}")]
    FileError(String),
    /// The exit condition left no passes to count down.
    #[error("Exit detected at sweep {sweep_len} with nothing left to count down")]
    EmptyCountdown { sweep_len: u64 },
    /// The caller's sweep limit was reached before the loop exited.
    #[error("Sweep limit of {0} exceeded")]
    SweepLimit(u64),
}
