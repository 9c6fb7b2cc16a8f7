//! Search task document consumed by the command-line runner.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{ConfigError, EvolutionConfig, SelectionMethod};

/// A sequence search: evolve genes over `alphabet` toward `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTask {
    /// Symbols a locus may take.
    pub alphabet: Vec<String>,
    /// Sequence the fitness function rewards matching, locus by locus.
    pub target: Vec<String>,
    /// Number of genes per generation. Even sizes avoid a wasted child.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default)]
    pub selection: SelectionMethod,
    #[serde(default)]
    pub evolution: EvolutionConfig,
    /// Stop after this many generations without improvement.
    #[serde(default)]
    pub patience: Option<usize>,
    /// Stop once this score is reached.
    #[serde(default)]
    pub target_score: Option<f64>,
    /// Log progress every N generations (0 disables).
    #[serde(default = "default_log_interval")]
    pub log_interval: usize,
}

impl Default for SearchTask {
    fn default() -> Self {
        fn symbols(s: &[&str]) -> Vec<String> {
            s.iter().map(|s| s.to_string()).collect()
        }

        Self {
            alphabet: symbols(&["F", "Gm", "Am", "Bb", "C", "Dm", "Edim"]),
            target: symbols(&["F", "C", "C", "F", "Dm", "Bb", "C", "F"]),
            population_size: default_population_size(),
            selection: SelectionMethod::default(),
            evolution: EvolutionConfig::default(),
            patience: Some(50),
            target_score: Some(1.0),
            log_interval: default_log_interval(),
        }
    }
}

fn default_population_size() -> usize {
    80
}
fn default_log_interval() -> usize {
    100
}

impl SearchTask {
    /// Fraction of loci equal to the target, in `[0, 1]`.
    pub fn match_fraction(&self, loci: &[String]) -> f64 {
        if self.target.is_empty() {
            return 0.0;
        }
        let matched = loci
            .iter()
            .zip(&self.target)
            .filter(|(symbol, want)| symbol == want)
            .count();
        matched as f64 / self.target.len() as f64
    }

    /// Validate the task and its nested configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.alphabet.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        if self.target.is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        if let Some(unknown) = self.target.iter().find(|s| !self.alphabet.contains(s)) {
            return Err(ConfigError::UnknownSymbol(unknown.clone()));
        }
        if self.population_size == 0 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if self.patience == Some(0) {
            return Err(ConfigError::InvalidPatience);
        }
        self.selection.validate()?;
        self.evolution.validate()
    }

    /// Read, parse, and validate a JSON task file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let task: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        task.validate()?;
        Ok(task)
    }
}
