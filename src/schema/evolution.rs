//! Evolution configuration and run statistics types.
//!
//! Everything here is plain data: serializable, validated up front, and
//! consumed by [`crate::evolution::EvolutionEngine`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Operator and loop settings for one evolutionary run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Probability that a selected pair is recombined (0.0-1.0).
    #[serde(default = "default_p_crossover")]
    pub p_crossover: f64,
    /// Probability that a child is mutated at all (0.0-1.0).
    #[serde(default = "default_p_mutation")]
    pub p_mutation: f64,
    /// Number of generations to run unless a callback stops earlier.
    #[serde(default = "default_max_epochs")]
    pub max_epochs: usize,
    /// Per-locus redraw probability once a child is mutated.
    /// Defaults to `1 / gene length` when absent.
    #[serde(default)]
    pub p_locus_mutation: Option<f64>,
    /// Evaluate pending children on the rayon thread pool.
    #[serde(default)]
    pub parallel_evaluation: bool,
    /// Re-score every child, even unchanged parents whose score is known.
    /// Only needed when fitness is not a pure function of the gene.
    #[serde(default)]
    pub reevaluate_carried_scores: bool,
    /// Random seed for reproducibility.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            p_crossover: default_p_crossover(),
            p_mutation: default_p_mutation(),
            max_epochs: default_max_epochs(),
            p_locus_mutation: None,
            parallel_evaluation: false,
            reevaluate_carried_scores: false,
            random_seed: None,
        }
    }
}

fn default_p_crossover() -> f64 {
    0.8
}
fn default_p_mutation() -> f64 {
    0.3
}
fn default_max_epochs() -> usize {
    1000
}

impl EvolutionConfig {
    /// Per-locus mutation probability for genes of `locus_count` loci.
    pub fn locus_mutation_probability(&self, locus_count: usize) -> f64 {
        match self.p_locus_mutation {
            Some(p) => p,
            None if locus_count == 0 => 0.0,
            None => 1.0 / locus_count as f64,
        }
    }

    /// Validate evolution configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("p_crossover", self.p_crossover)?;
        check_probability("p_mutation", self.p_mutation)?;
        if let Some(p) = self.p_locus_mutation {
            check_probability("p_locus_mutation", p)?;
        }
        Ok(())
    }

    /// Read, parse, and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::InvalidProbability { name, value });
    }
    Ok(())
}

/// Selection method for choosing parents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method")]
pub enum SelectionMethod {
    /// Tournament selection with configurable size.
    Tournament {
        #[serde(default = "default_tournament_size")]
        size: usize,
    },
    /// Rank-based selection.
    RankBased,
    /// Roulette wheel (fitness-proportionate) selection.
    RouletteWheel,
}

impl Default for SelectionMethod {
    fn default() -> Self {
        Self::Tournament {
            size: default_tournament_size(),
        }
    }
}

fn default_tournament_size() -> usize {
    5
}

impl SelectionMethod {
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Tournament { size: 0 } => Err(ConfigError::InvalidTournamentSize),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Statistics from an evolution run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionStats {
    /// Generations completed.
    pub epochs: usize,
    /// Fitness function calls, including the initial population.
    pub total_evaluations: u64,
    /// Best score found.
    pub best_score: f64,
    /// Mean score of the final population.
    pub final_mean_score: f64,
    /// Time taken (in seconds).
    pub elapsed_seconds: f64,
    /// Evaluations per second.
    pub evaluations_per_second: f64,
    /// Reason for stopping.
    pub stop_reason: StopReason,
    /// Seed that drove the run.
    pub seed: u64,
}

/// Per-generation score history for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EvolutionHistory {
    /// Best-ever score after each generation.
    pub best_score: Vec<f64>,
    /// Mean score of each generation.
    pub mean_score: Vec<f64>,
    /// Standard deviation of each generation's scores.
    pub score_std: Vec<f64>,
}

impl EvolutionHistory {
    /// Record one generation's scores.
    pub fn record(&mut self, best_score: f64, scores: &[f64]) {
        let (mean, std) = mean_and_std(scores);
        self.best_score.push(best_score);
        self.mean_score.push(mean);
        self.score_std.push(std);
    }

    pub fn len(&self) -> usize {
        self.best_score.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best_score.is_empty()
    }
}

/// Mean and population standard deviation; zeros for an empty slice.
pub(crate) fn mean_and_std(scores: &[f64]) -> (f64, f64) {
    if scores.is_empty() {
        return (0.0, 0.0);
    }
    let n = scores.len() as f64;
    let mean = scores.iter().sum::<f64>() / n;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Reason evolution stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Ran all configured generations.
    MaxEpochs,
    /// A callback asked to stop.
    CallbackRequested,
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Probability {name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },
    #[error("Tournament size must be at least 1")]
    InvalidTournamentSize,
    #[error("Population size must be at least 1")]
    PopulationTooSmall,
    #[error("Early stopping patience must be at least 1")]
    InvalidPatience,
    #[error("Alphabet must contain at least one symbol")]
    EmptyAlphabet,
    #[error("Target sequence must not be empty")]
    EmptyTarget,
    #[error("Target symbol {0:?} is not in the alphabet")]
    UnknownSymbol(String),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
