//! Generational evolutionary loop.

use std::convert::Infallible;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::schema::{ConfigError, EvolutionConfig, EvolutionHistory, EvolutionStats, StopReason};

use super::callback::Callback;
use super::gene::{Crossover, Gene, GeneError};
use super::population::{BestTracker, Population};
use super::rng::EvolutionRng;
use super::selection::Selection;

/// Boxed error returned by a fallible fitness function.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum EvolutionError {
    #[error("Initial population is empty")]
    EmptyPopulation,
    #[error(transparent)]
    Gene(#[from] GeneError),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Fitness evaluation failed: {0}")]
    Evaluation(#[source] BoxError),
}

/// Final result of an evolution run.
#[derive(Debug, Clone)]
pub struct EvolutionResult<G> {
    /// Best gene found across all generations.
    pub best: G,
    /// Its score.
    pub best_score: f64,
    /// Statistics from the run.
    pub stats: EvolutionStats,
    /// Per-generation history.
    pub history: EvolutionHistory,
}

/// A child awaiting its place in the next generation. `score` is known when
/// an unchanged parent passed through.
struct Offspring<G> {
    gene: G,
    score: Option<f64>,
}

/// Evolution engine that runs the search.
///
/// The engine holds configuration only; every call to [`run`](Self::run)
/// owns its population, RNG, and best tracker.
#[derive(Debug, Clone)]
pub struct EvolutionEngine<S> {
    config: EvolutionConfig,
    selection: S,
}

impl<S: Selection> EvolutionEngine<S> {
    /// Create a new evolution engine.
    pub fn new(config: EvolutionConfig, selection: S) -> Self {
        Self { config, selection }
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn selection(&self) -> &S {
        &self.selection
    }

    /// Run evolution with an infallible fitness function.
    pub fn run<G, F>(
        &self,
        fitness: F,
        initial_population: Vec<G>,
        callbacks: &mut [&mut dyn Callback<G>],
    ) -> Result<EvolutionResult<G>, EvolutionError>
    where
        G: Gene,
        F: Fn(&G) -> f64 + Sync,
    {
        self.try_run(
            |gene: &G| Ok::<_, Infallible>(fitness(gene)),
            initial_population,
            callbacks,
        )
    }

    /// Run evolution with a fallible fitness function.
    ///
    /// The first fitness error aborts the run and is returned as
    /// [`EvolutionError::Evaluation`]; `on_end` is not called in that case.
    pub fn try_run<G, F, E>(
        &self,
        fitness: F,
        initial_population: Vec<G>,
        callbacks: &mut [&mut dyn Callback<G>],
    ) -> Result<EvolutionResult<G>, EvolutionError>
    where
        G: Gene,
        F: Fn(&G) -> Result<f64, E> + Sync,
        E: Into<BoxError>,
    {
        let start_time = Instant::now();
        self.config.validate()?;
        let locus_count = check_population(&initial_population)?;

        let seed = self.config.random_seed.unwrap_or_else(rand::random);
        let mut rng = EvolutionRng::new(seed);
        let p_locus = self.config.locus_mutation_probability(locus_count);
        let size = initial_population.len();

        info!(
            "Starting evolution: {} genes x {} loci, up to {} epochs, seed {}",
            size, locus_count, self.config.max_epochs, seed
        );
        if size % 2 == 1 {
            warn!(
                "Odd population size {}; one bred child is dropped every generation",
                size
            );
        }

        // Evaluate initial population
        let pending: Vec<Offspring<G>> = initial_population
            .into_iter()
            .map(|gene| Offspring { gene, score: None })
            .collect();
        let (scores, mut total_evaluations) = self.evaluate(&pending, &fitness)?;
        let mut population =
            Population::new(pending.into_iter().map(|o| o.gene).collect(), scores);
        let mut best =
            BestTracker::from_population(&population).ok_or(EvolutionError::EmptyPopulation)?;
        let mut history = EvolutionHistory::default();

        for callback in callbacks.iter_mut() {
            callback.on_begin();
        }

        // Evolution loop
        let mut epochs = 0;
        let mut stop_reason = StopReason::MaxEpochs;
        for epoch in 0..self.config.max_epochs {
            let offspring = self.breed(&population, p_locus, &mut rng)?;
            let (scores, evaluations) = self.evaluate(&offspring, &fitness)?;
            total_evaluations += evaluations;

            let genes: Vec<G> = offspring.into_iter().map(|o| o.gene).collect();
            // Child-index order keeps first-max tie-breaking deterministic.
            for (gene, &score) in genes.iter().zip(&scores) {
                best.offer(gene, score);
            }
            population = Population::new(genes, scores);
            epochs = epoch + 1;

            history.record(best.score(), population.scores());
            debug!(
                "Epoch {}: best score = {}, mean score = {}, evaluations = {}",
                epoch,
                best.score(),
                population.mean_score(),
                evaluations
            );

            for callback in callbacks.iter_mut() {
                callback.on_population(&population, epoch);
            }
            let mut stop = false;
            for callback in callbacks.iter_mut() {
                stop |= callback
                    .on_epoch_end(best.gene(), best.score(), epoch)
                    .is_stop();
            }
            if stop {
                stop_reason = StopReason::CallbackRequested;
                break;
            }
        }

        for callback in callbacks.iter_mut() {
            callback.on_end();
        }

        let elapsed = start_time.elapsed().as_secs_f64();
        let (best, best_score) = best.into_inner();
        info!(
            "Evolution finished after {} epochs ({:?}): best score = {}, {} evaluations in {:.2}s",
            epochs, stop_reason, best_score, total_evaluations, elapsed
        );

        Ok(EvolutionResult {
            best,
            best_score,
            stats: EvolutionStats {
                epochs,
                total_evaluations,
                best_score,
                final_mean_score: population.mean_score(),
                elapsed_seconds: elapsed,
                evaluations_per_second: if elapsed > 0.0 {
                    total_evaluations as f64 / elapsed
                } else {
                    0.0
                },
                stop_reason,
                seed,
            },
            history,
        })
    }

    /// Build the next generation's children, same size as `population`.
    ///
    /// All random draws for a generation happen here, in order, before any
    /// evaluation.
    fn breed<G: Gene>(
        &self,
        population: &Population<G>,
        p_locus: f64,
        rng: &mut EvolutionRng,
    ) -> Result<Vec<Offspring<G>>, GeneError> {
        let size = population.len();
        let mut next = Vec::with_capacity(size);

        while next.len() < size {
            let (parent_1, score_1) =
                self.selection
                    .select(population.genes(), population.scores(), rng);
            let (parent_2, score_2) =
                self.selection
                    .select(population.genes(), population.scores(), rng);

            let children = match parent_1.crossover(parent_2, self.config.p_crossover, rng)? {
                Crossover::Recombined(a, b) => [(a, None), (b, None)],
                Crossover::PassedThrough(a, b) => [(a, Some(score_1)), (b, Some(score_2))],
            };

            for (child, score) in children {
                // Odd sizes: the last pair's second child does not fit.
                if next.len() == size {
                    break;
                }

                let (gene, score) = if rng.chance(self.config.p_mutation) {
                    (child.mutate(p_locus, rng), None)
                } else {
                    (child, score)
                };
                let score = score.filter(|_| !self.config.reevaluate_carried_scores);
                next.push(Offspring { gene, score });
            }
        }

        Ok(next)
    }

    /// Score every child, calling `fitness` only for unknown scores.
    /// Returns scores in child order and the number of fitness calls.
    fn evaluate<G, F, E>(
        &self,
        offspring: &[Offspring<G>],
        fitness: &F,
    ) -> Result<(Vec<f64>, u64), EvolutionError>
    where
        G: Gene,
        F: Fn(&G) -> Result<f64, E> + Sync,
        E: Into<BoxError>,
    {
        let score_one = |o: &Offspring<G>| match o.score {
            Some(score) => Ok(score),
            None => fitness(&o.gene).map_err(|e| EvolutionError::Evaluation(e.into())),
        };

        let scores = if self.config.parallel_evaluation {
            offspring
                .par_iter()
                .map(score_one)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            offspring
                .iter()
                .map(score_one)
                .collect::<Result<Vec<_>, _>>()?
        };
        let evaluations = offspring.iter().filter(|o| o.score.is_none()).count() as u64;

        Ok((scores, evaluations))
    }
}

/// Check the population is non-empty and uniform; returns its locus count.
fn check_population<G: Gene>(population: &[G]) -> Result<usize, EvolutionError> {
    let first = population.first().ok_or(EvolutionError::EmptyPopulation)?;
    let locus_count = first.locus_count();

    if let Some(odd) = population.iter().find(|g| g.locus_count() != locus_count) {
        return Err(GeneError::StructuralMismatch {
            left: locus_count,
            right: odd.locus_count(),
        }
        .into());
    }
    Ok(locus_count)
}
