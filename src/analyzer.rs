//! This module provides functions for analyzing champion descriptors before their recurrence
//! is run. The checks reject constants under which the accumulation could underflow, never
//! grow, divide by nothing, or never leave the glider loop.

use crate::types::{Champion, StepError};
use std::collections::HashSet;

/// Represents the problems that can be found in a champion's recurrence.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The champion has an empty name.
    MissingName,
    /// The glider counter would not grow between passes.
    StagnantCounter(u64),
    /// The initial glider counter is zero.
    EmptyCounter,
    /// The exit divisor is 0 or 1, so every sweep value would qualify.
    InvalidDivisor(u64),
    /// The sweep value factor is zero, so the sweep value would underflow.
    InvalidFactor,
    /// A glider pass would cost a negative number of steps.
    NegativeGliderCost { offset: u64, minimum: u128 },
    /// No sweep value after the first is ever divisible by the exit divisor.
    UnreachableExit { divisor: u64 },
}

impl From<AnalysisError> for StepError {
    /// Converts an `AnalysisError` into a `StepError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::MissingName => {
                StepError::ValidationError("Champion name is empty".to_string())
            }
            AnalysisError::StagnantCounter(multiplier) => StepError::ValidationError(format!(
                "Multiplier must be at least 2, got {}",
                multiplier
            )),
            AnalysisError::EmptyCounter => {
                StepError::ValidationError("Initial glider counter must be positive".to_string())
            }
            AnalysisError::InvalidDivisor(divisor) => StepError::ValidationError(format!(
                "Exit divisor must be at least 2, got {}",
                divisor
            )),
            AnalysisError::InvalidFactor => {
                StepError::ValidationError("Exit factor must be positive".to_string())
            }
            AnalysisError::NegativeGliderCost { offset, minimum } => {
                StepError::ValidationError(format!(
                    "Glider offset {} exceeds the smallest glider pass of {} steps",
                    offset, minimum
                ))
            }
            AnalysisError::UnreachableExit { divisor } => StepError::ValidationError(format!(
                "No sweep value is ever divisible by {}, so the glider loop never exits",
                divisor
            )),
        }
    }
}

/// Analyzes a `Champion` for constants that cannot produce a valid run.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(StepError::ValidationError)` describing the first problem otherwise.
pub fn analyze(champion: &Champion) -> Result<(), StepError> {
    let errors = [
        check_name,
        check_counter,
        check_exit_rule,
        check_exit_reachable,
        check_glider_cost,
    ]
    .iter()
    .filter_map(|f| f(champion).err())
    .collect::<Vec<_>>();

    match errors.into_iter().next() {
        Some(first_error) => Err(first_error.into()),
        None => Ok(()),
    }
}

fn check_name(champion: &Champion) -> Result<(), AnalysisError> {
    if champion.name.trim().is_empty() {
        return Err(AnalysisError::MissingName);
    }
    Ok(())
}

/// Checks that the glider counter starts positive and grows on every pass.
fn check_counter(champion: &Champion) -> Result<(), AnalysisError> {
    let recurrence = &champion.recurrence;

    if recurrence.counter == 0 {
        return Err(AnalysisError::EmptyCounter);
    }

    if recurrence.multiplier < 2 {
        return Err(AnalysisError::StagnantCounter(recurrence.multiplier));
    }

    Ok(())
}

fn check_exit_rule(champion: &Champion) -> Result<(), AnalysisError> {
    let rule = &champion.recurrence.exit_rule;

    if rule.factor == 0 {
        return Err(AnalysisError::InvalidFactor);
    }

    if rule.divisor < 2 {
        return Err(AnalysisError::InvalidDivisor(rule.divisor));
    }

    Ok(())
}

/// Checks that the exit rule fires on some sweep after the first.
///
/// Only the counter modulo the divisor decides whether a sweep value is
/// divisible, and that residue is multiplied by the same factor every pass,
/// so it cycles within `divisor` passes.
fn check_exit_reachable(champion: &Champion) -> Result<(), AnalysisError> {
    let recurrence = &champion.recurrence;
    let rule = &recurrence.exit_rule;
    if rule.divisor < 2 {
        return Ok(());
    }

    let divisor = u128::from(rule.divisor);
    let factor = u128::from(rule.factor) % divisor;
    let multiplier = u128::from(recurrence.multiplier) % divisor;

    // Counter residue at the second sweep, the first one the rule applies to.
    let mut residue = u128::from(recurrence.counter) % divisor * multiplier % divisor;
    let mut seen = HashSet::new();

    while seen.insert(residue) {
        if factor * residue % divisor == 1 {
            return Ok(());
        }
        residue = residue * multiplier % divisor;
    }

    Err(AnalysisError::UnreachableExit {
        divisor: rule.divisor,
    })
}

/// Checks that no glider pass subtracts more than it adds.
///
/// The counter only grows, so the first pass is the cheapest one.
fn check_glider_cost(champion: &Champion) -> Result<(), AnalysisError> {
    let recurrence = &champion.recurrence;
    let glider = &recurrence.glider;
    let minimum = u128::from(glider.per_counter) * u128::from(recurrence.counter);

    let offset = glider.first_offset.max(glider.offset);
    if u128::from(offset) > minimum {
        return Err(AnalysisError::NegativeGliderCost { offset, minimum });
    }

    Ok(())
}
