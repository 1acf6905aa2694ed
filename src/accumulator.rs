//! This module defines the `StepAccumulator`, which sums the closed-form step counts of a
//! champion's glider loop passes and sweeps until the glider loop runs dry, then adds the
//! closing sweep.

use crate::types::{Champion, Phase, Recurrence, Step, StepError, Summary, SweepRecord};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Zero;
use tracing::{debug, info, trace};

/// Accumulates the step count of one champion's run.
///
/// Each iteration adds one glider loop pass and one sweep. The glider counter
/// grows by the recurrence's multiplier, the sweep length by one, until the
/// exit rule fires and the remaining passes have been counted down.
pub struct StepAccumulator {
    recurrence: Recurrence,
    steps: BigUint,
    glider_count: BigUint,
    sweep_len: u64,
    phase: Phase,
    iterations: u64,
    sweep_limit: Option<u64>,
    halted: bool,
}

impl StepAccumulator {
    /// Creates a new accumulator at the entry of the first glider loop.
    pub fn new(recurrence: &Recurrence) -> Self {
        Self {
            recurrence: *recurrence,
            steps: BigUint::from(recurrence.bootstrap),
            glider_count: BigUint::from(recurrence.counter),
            sweep_len: 1,
            phase: Phase::Searching,
            iterations: 0,
            sweep_limit: None,
            halted: false,
        }
    }

    /// Fails the run with `StepError::SweepLimit` when it would need more than
    /// `limit` sweeps. The closing sweep is not counted.
    pub fn with_sweep_limit(mut self, limit: u64) -> Self {
        self.sweep_limit = Some(limit);
        self
    }

    /// Executes a single iteration: one glider pass followed by one sweep.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue(_))` with what the iteration observed.
    /// * `Ok(Step::Halt)` once the countdown reached zero; the final sweep has
    ///   been added and further calls keep returning `Step::Halt`.
    /// * `Err(StepError::EmptyCountdown)` if the exit rule left no passes.
    /// * `Err(StepError::SweepLimit)` if the iteration needed a sweep past the limit.
    pub fn step(&mut self) -> Result<Step, StepError> {
        if self.halted {
            return Ok(Step::Halt);
        }

        let first = self.iterations == 0;
        self.iterations += 1;

        self.steps += self.recurrence.glider.cost(&self.glider_count, first);
        let sweep_val = self.recurrence.exit_rule.sweep_value(&self.glider_count);
        self.glider_count *= self.recurrence.multiplier;

        match &mut self.phase {
            Phase::Countdown {
                sweep_exit,
                pending,
            } => {
                *pending -= 1u32;
                if pending.is_zero() {
                    let sweep_exit = *sweep_exit;
                    self.finish(sweep_exit);
                    return Ok(Step::Halt);
                }
            }
            Phase::Searching => {
                if let Some(pending) = self.detect_exit(&sweep_val)? {
                    debug!(
                        sweep_len = self.sweep_len,
                        %pending,
                        "glider loop exit detected"
                    );
                    self.phase = Phase::Countdown {
                        sweep_exit: self.sweep_len + 1,
                        pending,
                    };
                }
            }
        }

        if let Some(limit) = self.sweep_limit {
            if self.sweep_len > limit {
                return Err(StepError::SweepLimit(limit));
            }
        }

        self.steps += self.recurrence.sweep.cost(self.sweep_len);
        trace!(sweep_len = self.sweep_len, "sweep added");

        let record = SweepRecord {
            sweep_len: self.sweep_len,
            sweep_val,
            pending: self.pending().cloned(),
        };
        self.sweep_len += 1;

        Ok(Step::Continue(record))
    }

    /// Runs the accumulator until the glider loop has run dry.
    ///
    /// The `(sweep_len, sweep_val)` pairs of the first `champion.diagnostics`
    /// sweeps are kept in the returned `Summary`.
    pub fn run(champion: &Champion) -> Result<Summary, StepError> {
        Self::new(&champion.recurrence).run_with(champion)
    }

    /// Like [`StepAccumulator::run`], but bounded by `sweep_limit` when given.
    pub fn run_bounded(
        champion: &Champion,
        sweep_limit: Option<u64>,
    ) -> Result<Summary, StepError> {
        let accumulator = Self::new(&champion.recurrence);
        match sweep_limit {
            Some(limit) => accumulator.with_sweep_limit(limit).run_with(champion),
            None => accumulator.run_with(champion),
        }
    }

    fn run_with(mut self, champion: &Champion) -> Result<Summary, StepError> {
        let mut diagnostics = Vec::new();

        while let Step::Continue(record) = self.step()? {
            if (record.sweep_len as usize) < champion.diagnostics {
                diagnostics.push((record.sweep_len, record.sweep_val));
            }
        }

        let sweep_exit = self.sweep_exit().unwrap_or(self.sweep_len);
        info!(
            champion = %champion.name,
            iterations = self.iterations,
            sweep_len = self.sweep_len,
            "step count computed"
        );

        Ok(Summary {
            name: champion.name.clone(),
            steps: self.steps,
            sweep_exit,
            sweep_len: self.sweep_len,
            iterations: self.iterations,
            diagnostics,
        })
    }

    /// Checks the exit rule against this iteration's sweep value, returning the
    /// number of passes still to come when it fires.
    fn detect_exit(&self, sweep_val: &BigUint) -> Result<Option<BigUint>, StepError> {
        if self.sweep_len <= 1 {
            return Ok(None);
        }

        let rule = &self.recurrence.exit_rule;
        let (quotient, remainder) = sweep_val.div_rem(&BigUint::from(rule.divisor));
        if !remainder.is_zero() {
            return Ok(None);
        }

        if quotient <= BigUint::from(rule.drop) {
            return Err(StepError::EmptyCountdown {
                sweep_len: self.sweep_len,
            });
        }

        Ok(Some(quotient - rule.drop))
    }

    fn finish(&mut self, sweep_exit: u64) {
        self.steps += self
            .recurrence
            .final_sweep
            .cost(self.sweep_len, sweep_exit);
        self.halted = true;
    }

    /// Returns the steps accumulated so far.
    pub fn steps(&self) -> &BigUint {
        &self.steps
    }

    /// Returns the number of gliders the next pass consumes.
    pub fn glider_count(&self) -> &BigUint {
        &self.glider_count
    }

    /// Returns the length of the next sweep.
    pub fn sweep_len(&self) -> u64 {
        self.sweep_len
    }

    /// Returns the sweep length at which the loop exit was detected, if it was.
    pub fn sweep_exit(&self) -> Option<u64> {
        match &self.phase {
            Phase::Countdown { sweep_exit, .. } => Some(*sweep_exit),
            Phase::Searching => None,
        }
    }

    /// Returns the remaining glider passes, once the loop exit is known.
    pub fn pending(&self) -> Option<&BigUint> {
        match &self.phase {
            Phase::Countdown { pending, .. } => Some(pending),
            Phase::Searching => None,
        }
    }

    /// Returns the number of iterations performed.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Checks if the final sweep has been added.
    pub fn is_halted(&self) -> bool {
        self.halted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExitRule, FinalSweepCost, GliderCost, SweepCost};
    use crate::ChampionRegistry;

    fn tiny_recurrence() -> Recurrence {
        Recurrence {
            bootstrap: 13,
            counter: 5,
            multiplier: 3,
            glider: GliderCost {
                per_counter: 42,
                first_offset: 11,
                offset: 15,
            },
            sweep: SweepCost {
                per_sweep: 20,
                first_base: 37,
                base: 37,
            },
            exit_rule: ExitRule {
                factor: 3,
                divisor: 7,
                drop: 1,
            },
            final_sweep: FinalSweepCost {
                entry: 23,
                per_sweep: 16,
                offset: 1,
                exit: 9,
            },
        }
    }

    #[test]
    fn test_first_iteration() {
        let mut accumulator = StepAccumulator::new(&tiny_recurrence());

        let step = accumulator.step().unwrap();

        // 13 + (42 * 5 - 11) + (20 + 37)
        assert_eq!(accumulator.steps(), &BigUint::from(269u32));
        assert_eq!(accumulator.glider_count(), &BigUint::from(15u32));
        assert_eq!(accumulator.sweep_len(), 2);
        assert_eq!(
            step,
            Step::Continue(SweepRecord {
                sweep_len: 1,
                sweep_val: BigUint::from(14u32),
                pending: None,
            })
        );
    }

    #[test]
    fn test_first_sweep_never_exits() {
        // 3 * 5 - 1 = 14 is divisible by 7, but the first sweep is skipped.
        let mut accumulator = StepAccumulator::new(&tiny_recurrence());
        accumulator.step().unwrap();

        assert_eq!(accumulator.sweep_exit(), None);
        assert_eq!(accumulator.pending(), None);
    }

    #[test]
    fn test_exit_detected_at_seventh_sweep() {
        let mut accumulator = StepAccumulator::new(&tiny_recurrence());

        for _ in 0..6 {
            accumulator.step().unwrap();
            assert_eq!(accumulator.sweep_exit(), None);
        }

        // 3 * 5 * 3^6 - 1 = 10934 = 7 * 1562
        let step = accumulator.step().unwrap();
        assert_eq!(accumulator.sweep_exit(), Some(8));
        assert_eq!(accumulator.pending(), Some(&BigUint::from(1561u32)));
        match step {
            Step::Continue(record) => {
                assert_eq!(record.sweep_len, 7);
                assert_eq!(record.sweep_val, BigUint::from(10934u32));
            }
            Step::Halt => panic!("accumulator halted early"),
        }
    }

    #[test]
    fn test_invariants_hold_for_every_champion() {
        for champion in ChampionRegistry::champions() {
            let divisor = BigUint::from(champion.recurrence.exit_rule.divisor);
            let mut accumulator = StepAccumulator::new(&champion.recurrence);
            let mut last_len = 0;
            let mut last_pending: Option<BigUint> = None;
            let mut exit = None;

            while let Step::Continue(record) = accumulator.step().unwrap() {
                assert!(record.sweep_len > last_len, "{}", champion.name);
                last_len = record.sweep_len;

                match (&last_pending, &record.pending) {
                    (None, Some(pending)) => {
                        // The countdown starts from an exact quotient.
                        assert!((&record.sweep_val % &divisor).is_zero());
                        assert!(!pending.is_zero());
                        exit = accumulator.sweep_exit();
                    }
                    (Some(previous), Some(pending)) => {
                        assert_eq!(pending + 1u32, *previous);
                        assert!(!pending.is_zero());
                        assert_eq!(accumulator.sweep_exit(), exit);
                    }
                    (None, None) => assert_eq!(accumulator.sweep_exit(), None),
                    (Some(_), None) => panic!("countdown was reset"),
                }
                last_pending = record.pending;
            }

            // The final iteration takes the countdown from one to zero.
            assert_eq!(last_pending, Some(BigUint::from(1u32)));
            assert!(accumulator.is_halted());
            assert_eq!(accumulator.pending(), Some(&BigUint::zero()));
        }
    }

    #[test]
    fn test_step_after_halt() {
        let champion = ChampionRegistry::by_index(0).unwrap();
        let mut accumulator = StepAccumulator::new(&champion.recurrence);
        while accumulator.step().unwrap() != Step::Halt {}

        let steps = accumulator.steps().clone();
        assert_eq!(accumulator.step().unwrap(), Step::Halt);
        assert_eq!(accumulator.steps(), &steps);
    }

    #[test]
    fn test_run_matches_stepping() {
        let champion = ChampionRegistry::by_index(1).unwrap();
        let mut accumulator = StepAccumulator::new(&champion.recurrence);
        while accumulator.step().unwrap() != Step::Halt {}

        let summary = StepAccumulator::run(&champion).unwrap();
        assert_eq!(&summary.steps, accumulator.steps());
        assert_eq!(summary.sweep_len, accumulator.sweep_len());
        assert_eq!(summary.iterations, accumulator.iterations());
        assert_eq!(Some(summary.sweep_exit), accumulator.sweep_exit());
    }

    #[test]
    fn test_run_is_deterministic() {
        let champion = ChampionRegistry::by_index(0).unwrap();

        let first = StepAccumulator::run(&champion).unwrap();
        let second = StepAccumulator::run(&champion).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_countdown() {
        // Sweep 2 sees 3 * 2 - 1 = 5, whose quotient 1 is used up by the drop.
        let mut recurrence = tiny_recurrence();
        recurrence.counter = 1;
        recurrence.multiplier = 2;
        recurrence.glider.first_offset = 0;
        recurrence.glider.offset = 0;
        recurrence.exit_rule.divisor = 5;

        let mut accumulator = StepAccumulator::new(&recurrence);
        accumulator.step().unwrap();
        let result = accumulator.step();

        assert_eq!(result, Err(StepError::EmptyCountdown { sweep_len: 2 }));
    }

    #[test]
    fn test_sweep_limit() {
        let mut recurrence = tiny_recurrence();
        // 3 * 5 * 2^k - 1 is never divisible by 2.
        recurrence.multiplier = 2;
        recurrence.exit_rule.divisor = 2;

        let champion = Champion {
            name: "Never exits".to_string(),
            program: None,
            recurrence,
            diagnostics: 0,
        };

        let result = StepAccumulator::run_bounded(&champion, Some(50));
        assert_eq!(result, Err(StepError::SweepLimit(50)));
    }

    #[test]
    fn test_sweep_limit_allows_exact_sweep_count() {
        let champion = ChampionRegistry::by_index(0).unwrap();

        // BB(12,14) halts after 1567 sweeps, on a pass that adds no sweep.
        let summary = StepAccumulator::run_bounded(&champion, Some(1567)).unwrap();
        assert_eq!(summary.sweep_len, 1568);

        let result = StepAccumulator::run_bounded(&champion, Some(1566));
        assert_eq!(result, Err(StepError::SweepLimit(1566)));
    }

    #[test]
    fn test_diagnostics_recorded() {
        let champion = ChampionRegistry::by_name("BB(13,13) champion").unwrap();
        let champion = Champion {
            diagnostics: 4,
            ..champion
        };

        let summary = StepAccumulator::run(&champion).unwrap();

        assert_eq!(
            summary.diagnostics,
            vec![
                (1, BigUint::from(14u32)),
                (2, BigUint::from(44u32)),
                (3, BigUint::from(134u32)),
            ]
        );
    }
}
