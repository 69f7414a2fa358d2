//! Hill-climbing execution loop.
//!
//! # Algorithm
//!
//! 1. Start from a valid seed allocation and score it (`Seeded`).
//! 2. At each iteration (`Searching`):
//!    a. Apply a random Swap or Add move
//!    b. If any cache exceeds its capacity, undo
//!    c. Otherwise score; keep the move only if the score strictly improves,
//!       else undo
//! 3. Stop when the iteration budget is spent (`Done`).
//!
//! Only strict improvements are kept, so the live allocation is always the
//! best one seen and no separate snapshot is needed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::chains::run_chains;
use super::config::SearchConfig;
use super::progress::{ProgressObserver, Silent};
use crate::allocation::{Allocation, InitialAllocator};
use crate::error::SearchError;
use crate::model::Instance;
use crate::mutation::{Mutation, MutationEngine};
use crate::ranking::ImportanceTable;
use crate::score::score;

/// Lifecycle of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchPhase {
    /// Seed allocation scored, no iteration run yet.
    Seeded,
    /// Iterations in progress.
    Searching,
    /// Iteration budget exhausted (or run stopped).
    Done,
}

/// What happened in one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The move improved the score and was kept.
    Accepted { score: u64 },
    /// The move was valid but did not improve the score; undone.
    Rejected { score: u64 },
    /// The move broke a capacity constraint; undone.
    Invalid,
    /// No move of the drawn kind was possible.
    Noop,
}

/// Result of a local search run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchResult {
    /// The final (and best) allocation.
    pub allocation: Allocation,

    /// Score of `allocation`.
    pub score: u64,

    /// Score of the seed allocation.
    pub initial_score: u64,

    /// Iterations executed.
    pub iterations: usize,

    /// Moves kept.
    pub accepted_moves: usize,

    /// Moves undone for breaking capacity.
    pub invalid_moves: usize,

    /// Valid moves undone for not improving.
    pub rejected_moves: usize,

    /// Iterations where no move was possible.
    pub noop_moves: usize,

    /// Seed of the random stream that produced this result.
    pub seed: u64,

    /// Index of the chain this result came from.
    pub chain: usize,

    /// Whether cancelled externally.
    pub cancelled: bool,

    /// Score sampled every `history_interval` iterations, starting with
    /// the seed score.
    pub score_history: Vec<u64>,
}

/// A single hill-climbing chain, advanced one iteration at a time.
///
/// Owns the live allocation and its random stream. Use
/// [`LocalSearchRunner`] to drive it to completion.
#[derive(Debug)]
pub struct LocalSearch<'a> {
    instance: &'a Instance,
    engine: MutationEngine,
    allocation: Allocation,
    rng: ChaCha8Rng,
    seed: u64,
    phase: SearchPhase,
    score: u64,
    initial_score: u64,
    iteration: usize,
    max_iterations: usize,
    history_interval: usize,
    accepted_moves: usize,
    invalid_moves: usize,
    rejected_moves: usize,
    noop_moves: usize,
    score_history: Vec<u64>,
}

impl<'a> LocalSearch<'a> {
    /// Scores `allocation` and prepares a chain in the `Seeded` phase.
    ///
    /// # Errors
    ///
    /// Fails if `config` is invalid, if `allocation` violates capacity,
    /// or if the instance cannot be scored (no requests).
    pub fn new(
        instance: &'a Instance,
        allocation: Allocation,
        config: &SearchConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        allocation.check_capacity(instance)?;
        let initial_score = score(instance, &allocation)?;
        let seed = config.seed.unwrap_or_else(rand::random);

        Ok(Self {
            instance,
            engine: MutationEngine::new(config.add_policy),
            allocation,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            phase: SearchPhase::Seeded,
            score: initial_score,
            initial_score,
            iteration: 0,
            max_iterations: config.max_iterations,
            history_interval: config.history_interval,
            accepted_moves: 0,
            invalid_moves: 0,
            rejected_moves: 0,
            noop_moves: 0,
            score_history: vec![initial_score],
        })
    }

    #[inline]
    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    /// Current (best) score.
    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// The live allocation.
    #[inline]
    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    /// Iterations executed so far.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iteration
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Runs one iteration. Returns `None` once the budget is spent.
    ///
    /// # Errors
    ///
    /// A scoring failure aborts the run; the proposed move is undone
    /// first so the allocation stays valid.
    pub fn step(&mut self) -> Result<Option<StepOutcome>, SearchError> {
        if self.iteration >= self.max_iterations {
            self.phase = SearchPhase::Done;
            return Ok(None);
        }
        self.phase = SearchPhase::Searching;

        let mutation = self
            .engine
            .mutate(self.instance, &mut self.allocation, &mut self.rng);
        let outcome = self.judge(mutation)?;

        match outcome {
            StepOutcome::Accepted { score } => {
                self.accepted_moves += 1;
                tracing::debug!(
                    iteration = self.iteration + 1,
                    kind = ?mutation.kind(),
                    score,
                    "improvement accepted"
                );
            }
            StepOutcome::Rejected { .. } => self.rejected_moves += 1,
            StepOutcome::Invalid => self.invalid_moves += 1,
            StepOutcome::Noop => self.noop_moves += 1,
        }

        self.iteration += 1;
        if self.iteration.is_multiple_of(self.history_interval) {
            self.score_history.push(self.score);
        }
        if self.iteration >= self.max_iterations {
            self.phase = SearchPhase::Done;
        }
        Ok(Some(outcome))
    }

    /// Validates, scores and keeps or undoes an applied mutation.
    fn judge(&mut self, mutation: Mutation) -> Result<StepOutcome, SearchError> {
        if mutation.is_noop() {
            return Ok(StepOutcome::Noop);
        }

        if !self.allocation.is_within_capacity(self.instance) {
            mutation.undo(&mut self.allocation, self.instance);
            tracing::trace!(?mutation, "move breaks capacity, undone");
            return Ok(StepOutcome::Invalid);
        }

        let candidate = match score(self.instance, &self.allocation) {
            Ok(s) => s,
            Err(e) => {
                mutation.undo(&mut self.allocation, self.instance);
                return Err(e.into());
            }
        };

        if candidate > self.score {
            self.score = candidate;
            Ok(StepOutcome::Accepted { score: candidate })
        } else {
            mutation.undo(&mut self.allocation, self.instance);
            tracing::trace!(candidate, current = self.score, "no improvement, undone");
            Ok(StepOutcome::Rejected { score: candidate })
        }
    }

    /// Ends the chain and returns its result.
    pub fn finish(mut self) -> SearchResult {
        self.phase = SearchPhase::Done;
        if self.score_history.last() != Some(&self.score) {
            self.score_history.push(self.score);
        }
        SearchResult {
            allocation: self.allocation,
            score: self.score,
            initial_score: self.initial_score,
            iterations: self.iteration,
            accepted_moves: self.accepted_moves,
            invalid_moves: self.invalid_moves,
            rejected_moves: self.rejected_moves,
            noop_moves: self.noop_moves,
            seed: self.seed,
            chain: 0,
            cancelled: false,
            score_history: self.score_history,
        }
    }
}

/// Executes the local search.
pub struct LocalSearchRunner;

impl LocalSearchRunner {
    /// Runs one chain from `allocation` to the end of its budget.
    pub fn run<O: ProgressObserver>(
        instance: &Instance,
        allocation: Allocation,
        config: &SearchConfig,
        observer: &mut O,
    ) -> Result<SearchResult, SearchError> {
        Self::run_with_cancel(instance, allocation, config, observer, None)
    }

    /// Runs one chain with an optional cancellation token.
    ///
    /// If `cancel` is set, the loop stops before the next iteration and
    /// returns the current allocation.
    pub fn run_with_cancel<O: ProgressObserver>(
        instance: &Instance,
        allocation: Allocation,
        config: &SearchConfig,
        observer: &mut O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SearchResult, SearchError> {
        let mut search = LocalSearch::new(instance, allocation, config)?;
        tracing::debug!(
            seed = search.seed(),
            score = search.score(),
            iterations = config.max_iterations,
            "search started"
        );

        let mut cancelled = false;
        loop {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if search.step()?.is_none() {
                break;
            }
            observer.on_iteration(search.iterations(), search.score());
        }
        observer.on_finish();

        let mut result = search.finish();
        result.cancelled = cancelled;
        tracing::debug!(
            score = result.score,
            accepted = result.accepted_moves,
            invalid = result.invalid_moves,
            rejected = result.rejected_moves,
            noop = result.noop_moves,
            cancelled,
            "search finished"
        );
        Ok(result)
    }

    /// Ranks, seeds and searches `instance` end to end.
    ///
    /// With `config.chains > 1` the search runs as independent chains
    /// (see [`run_chains`]) and `observer` is not notified per iteration.
    pub fn solve<O: ProgressObserver>(
        instance: &Instance,
        config: &SearchConfig,
        observer: &mut O,
    ) -> Result<SearchResult, SearchError> {
        config.validate()?;

        let table = ImportanceTable::compute(instance);
        let seed = InitialAllocator::build(&table, instance);
        tracing::info!(
            placements = seed.total_placements(),
            caches_used = seed.non_empty_caches().count(),
            "seed allocation ready"
        );

        let result = if config.chains > 1 {
            let result = run_chains(instance, &seed, config)?;
            observer.on_finish();
            result
        } else {
            Self::run(instance, seed, config, observer)?
        };

        tracing::info!(
            initial = result.initial_score,
            score = result.score,
            accepted = result.accepted_moves,
            seed = result.seed,
            chain = result.chain,
            "local search done"
        );
        Ok(result)
    }
}

/// Convenience: [`LocalSearchRunner::solve`] without progress output.
pub fn solve(instance: &Instance, config: &SearchConfig) -> Result<SearchResult, SearchError> {
    LocalSearchRunner::solve(instance, config, &mut Silent)
}
