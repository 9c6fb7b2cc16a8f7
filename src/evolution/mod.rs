//! Evolutionary search module.
//!
//! # Overview
//!
//! The evolutionary search system consists of:
//!
//! - **Genes** (`gene`): the `Gene` trait plus sequence and real-vector representations
//! - **Selection** (`selection`): tournament, rank-based, and roulette wheel policies
//! - **Callbacks** (`callback`): lifecycle observers and early stopping
//! - **Engine** (`engine`): the generational loop and best-ever tracking
//!
//! # Example
//!
//! ```rust
//! use harmony_evolution::evolution::{
//!     EarlyStopping, EvolutionEngine, EvolutionRng, SequenceGene, TournamentSelection,
//! };
//! use harmony_evolution::schema::EvolutionConfig;
//!
//! let mut rng = EvolutionRng::new(7);
//! let population = SequenceGene::initialize_population(20, 8, vec![0u8, 1], &mut rng)?;
//!
//! let config = EvolutionConfig {
//!     max_epochs: 50,
//!     random_seed: Some(7),
//!     ..Default::default()
//! };
//! let engine = EvolutionEngine::new(config, TournamentSelection::new(3));
//!
//! let mut early_stopping = EarlyStopping::new(10);
//! let result = engine.run(
//!     |gene: &SequenceGene<u8>| gene.iter().map(|&b| f64::from(b)).sum(),
//!     population,
//!     &mut [&mut early_stopping],
//! )?;
//!
//! println!("Best: {} (score {})", result.best.len(), result.best_score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod callback;
mod engine;
mod gene;
mod population;
mod rng;
mod selection;

pub use callback::{Callback, Control, EarlyStopping, LogProgress, TargetScore};
pub use engine::{BoxError, EvolutionEngine, EvolutionError, EvolutionResult};
pub use gene::{Crossover, Gene, GeneError, RealGene, SequenceGene, ensure_same_structure};
pub use population::{BestTracker, Population};
pub use rng::EvolutionRng;
pub use selection::{RankSelection, RouletteSelection, Selection, TournamentSelection};
