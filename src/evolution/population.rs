//! Scored populations and best-ever tracking.

use crate::schema::mean_and_std;

use super::selection::first_max_index;

/// Genes and their index-aligned fitness scores for one generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Population<G> {
    genes: Vec<G>,
    scores: Vec<f64>,
}

impl<G> Population<G> {
    /// Pair genes with scores. Callers guarantee equal lengths.
    pub(crate) fn new(genes: Vec<G>, scores: Vec<f64>) -> Self {
        debug_assert_eq!(genes.len(), scores.len());
        Self { genes, scores }
    }

    pub fn genes(&self) -> &[G] {
        &self.genes
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// First highest-scoring member, if any.
    pub fn best(&self) -> Option<(&G, f64)> {
        if self.genes.is_empty() {
            return None;
        }
        let idx = first_max_index(&self.scores);
        Some((&self.genes[idx], self.scores[idx]))
    }

    pub fn mean_score(&self) -> f64 {
        mean_and_std(&self.scores).0
    }
}

/// Best (gene, score) pair seen during a run.
///
/// Only a strictly greater score replaces the incumbent, so ties and NaN
/// never dislodge it and the tracked score never decreases.
#[derive(Debug, Clone, PartialEq)]
pub struct BestTracker<G> {
    gene: G,
    score: f64,
}

impl<G: Clone> BestTracker<G> {
    pub fn new(gene: G, score: f64) -> Self {
        Self { gene, score }
    }

    /// Start from the first highest-scoring member of `population`.
    pub fn from_population(population: &Population<G>) -> Option<Self> {
        population
            .best()
            .map(|(gene, score)| Self::new(gene.clone(), score))
    }

    /// Replace the incumbent if `score` strictly beats it. Returns whether
    /// it did.
    pub fn offer(&mut self, gene: &G, score: f64) -> bool {
        if score > self.score {
            self.gene = gene.clone();
            self.score = score;
            true
        } else {
            false
        }
    }
}

impl<G> BestTracker<G> {
    pub fn gene(&self) -> &G {
        &self.gene
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn into_inner(self) -> (G, f64) {
        (self.gene, self.score)
    }
}
