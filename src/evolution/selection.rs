//! Parent selection strategies.

use rand::Rng;

use crate::schema::SelectionMethod;

/// Policy for picking one parent from a scored population.
///
/// Implementations read `scores` only; population and scores are
/// index-aligned and never modified.
pub trait Selection: Send + Sync {
    /// Index of the chosen parent.
    ///
    /// # Panics
    ///
    /// May panic if `scores` is empty.
    fn select_index<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> usize;

    /// The chosen parent together with its score.
    fn select<'a, G, R: Rng + ?Sized>(
        &self,
        population: &'a [G],
        scores: &[f64],
        rng: &mut R,
    ) -> (&'a G, f64) {
        debug_assert_eq!(population.len(), scores.len());
        let idx = self.select_index(scores, rng);
        (&population[idx], scores[idx])
    }
}

/// Index of the first maximum under strict `>`.
pub(crate) fn first_max_index(scores: &[f64]) -> usize {
    let mut best_idx = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best_idx] {
            best_idx = i;
        }
    }
    best_idx
}

/// Tournament selection: best of `k` uniform draws with replacement.
///
/// `k = 1` is uniform random selection. Once `k` reaches the population
/// size the tournament covers everyone and returns the first maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentSelection {
    k: usize,
}

impl TournamentSelection {
    /// Create a tournament of size `k` (0 is treated as 1).
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }

    pub fn size(&self) -> usize {
        self.k
    }
}

impl Selection for TournamentSelection {
    fn select_index<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> usize {
        let n = scores.len();
        if self.k >= n {
            return first_max_index(scores);
        }

        let mut best_idx = rng.gen_range(0..n);
        for _ in 1..self.k {
            let idx = rng.gen_range(0..n);
            if scores[idx] > scores[best_idx] {
                best_idx = idx;
            }
        }
        best_idx
    }
}

/// Rank-based selection: probability proportional to rank, worst = 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankSelection;

impl Selection for RankSelection {
    fn select_index<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> usize {
        let n = scores.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

        let total_rank = n * (n + 1) / 2;
        let mut target = rng.gen_range(0..total_rank);
        for (i, &idx) in order.iter().enumerate() {
            let rank = i + 1;
            if target < rank {
                return idx;
            }
            target -= rank;
        }
        order[n - 1]
    }
}

/// Roulette wheel (fitness-proportionate) selection.
///
/// Negative scores count as zero weight. If no individual has positive
/// weight, falls back to a uniform draw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouletteSelection;

impl Selection for RouletteSelection {
    fn select_index<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> usize {
        let weight = |s: f64| if s > 0.0 { s } else { 0.0 };
        let total: f64 = scores.iter().map(|&s| weight(s)).sum();
        if !(total > 0.0 && total.is_finite()) {
            return rng.gen_range(0..scores.len());
        }

        let target = rng.r#gen::<f64>() * total;
        let mut cumulative = 0.0;
        let mut last_positive = 0;
        for (i, &score) in scores.iter().enumerate() {
            let w = weight(score);
            if w > 0.0 {
                cumulative += w;
                last_positive = i;
                if cumulative > target {
                    return i;
                }
            }
        }
        last_positive
    }
}

impl Selection for SelectionMethod {
    fn select_index<R: Rng + ?Sized>(&self, scores: &[f64], rng: &mut R) -> usize {
        match self {
            SelectionMethod::Tournament { size } => {
                TournamentSelection::new(*size).select_index(scores, rng)
            }
            SelectionMethod::RankBased => RankSelection.select_index(scores, rng),
            SelectionMethod::RouletteWheel => RouletteSelection.select_index(scores, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::EvolutionRng;

    #[test]
    fn test_tournament_full_size_returns_max() {
        let mut rng = EvolutionRng::new(42);
        let scores = [0.5, 2.0, -1.0, 1.5, 2.0, 0.0];
        let population: Vec<char> = "abcdef".chars().collect();

        for k in [scores.len(), scores.len() + 3] {
            let tournament = TournamentSelection::new(k);
            for _ in 0..100 {
                let (gene, score) = tournament.select(&population, &scores, &mut rng);
                assert_eq!(score, 2.0);
                // First maximum wins ties.
                assert_eq!(*gene, 'b');
            }
        }
    }

    #[test]
    fn test_tournament_size_one_reaches_everyone() {
        let mut rng = EvolutionRng::new(7);
        let scores = [1.0, 2.0, 3.0, 4.0];
        let tournament = TournamentSelection::new(1);

        let mut seen = [false; 4];
        for _ in 0..500 {
            seen[tournament.select_index(&scores, &mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_tournament_pressure() {
        let mut rng = EvolutionRng::new(7);
        let scores: Vec<f64> = (0..20).map(f64::from).collect();
        let tournament = TournamentSelection::new(5);

        let mean: f64 = (0..2000)
            .map(|_| scores[tournament.select_index(&scores, &mut rng)])
            .sum::<f64>()
            / 2000.0;
        // Uniform selection would average 9.5.
        assert!(mean > 13.0, "mean = {mean}");
    }

    #[test]
    fn test_zero_size_tournament_is_uniform() {
        assert_eq!(TournamentSelection::new(0).size(), 1);
    }

    #[test]
    fn test_rank_selection_prefers_better() {
        let mut rng = EvolutionRng::new(3);
        let scores = [10.0, -5.0, 3.0];

        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            counts[RankSelection.select_index(&scores, &mut rng)] += 1;
        }
        // Ranks: index 1 -> 1, index 2 -> 2, index 0 -> 3.
        assert!(counts[0] > counts[2]);
        assert!(counts[2] > counts[1]);
    }

    #[test]
    fn test_roulette_ignores_non_positive() {
        let mut rng = EvolutionRng::new(3);
        let scores = [-1.0, 0.0, 4.0, 1.0];

        for _ in 0..500 {
            let idx = RouletteSelection.select_index(&scores, &mut rng);
            assert!(idx == 2 || idx == 3);
        }
    }

    #[test]
    fn test_roulette_all_zero_falls_back_to_uniform() {
        let mut rng = EvolutionRng::new(3);
        let scores = [0.0, -2.0, 0.0];

        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[RouletteSelection.select_index(&scores, &mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_selection_method_dispatch() {
        let mut rng = EvolutionRng::new(1);
        let scores = [1.0, 9.0, 3.0];

        let method = SelectionMethod::Tournament { size: 3 };
        assert_eq!(method.select_index(&scores, &mut rng), 1);

        for method in [SelectionMethod::RankBased, SelectionMethod::RouletteWheel] {
            let idx = method.select_index(&scores, &mut rng);
            assert!(idx < scores.len());
        }
    }
}
