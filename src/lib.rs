//! Harmony Evolution - Generic genetic algorithm engine.
//!
//! This crate evolves a population of candidate solutions ("genes") toward
//! higher fitness using selection, crossover, and mutation. The engine knows
//! nothing about the problem domain: fitness is any function of a gene, and
//! any representation implementing [`evolution::Gene`] plugs in.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Configuration, task, and run statistics types
//! - `evolution`: Genes, selection, callbacks, and the evolutionary loop
//!
//! # Example
//!
//! ```rust,no_run
//! use harmony_evolution::{
//!     evolution::{EvolutionEngine, EvolutionRng, SequenceGene},
//!     schema::{EvolutionConfig, SelectionMethod},
//! };
//!
//! let alphabet = vec!["F", "Gm", "Am", "Bb", "C", "Dm", "Edim"];
//! let target = ["F", "C", "C", "F"];
//!
//! let mut rng = EvolutionRng::new(42);
//! let population = SequenceGene::initialize_population(40, 4, alphabet, &mut rng).unwrap();
//!
//! let engine = EvolutionEngine::new(EvolutionConfig::default(), SelectionMethod::default());
//! let result = engine
//!     .run(
//!         |gene: &SequenceGene<&str>| {
//!             gene.iter().zip(&target).filter(|(a, b)| a == b).count() as f64
//!         },
//!         population,
//!         &mut [],
//!     )
//!     .unwrap();
//!
//! println!("Best: {} (score {})", result.best, result.best_score);
//! ```

pub mod evolution;
pub mod schema;

// Re-export commonly used types
pub use evolution::{EvolutionEngine, EvolutionError, EvolutionResult, Gene, SequenceGene};
pub use schema::{EvolutionConfig, SearchTask, SelectionMethod};
