//! Gene abstraction and concrete representations.
//!
//! The engine only ever talks to [`Gene`]; any representation that can
//! mutate itself and recombine with a peer of the same shape plugs in.

use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use rand::Rng;
use rand_distr::StandardNormal;

/// Errors raised by gene construction and recombination.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneError {
    #[error("Structural mismatch: gene with {left} loci combined with gene with {right} loci")]
    StructuralMismatch { left: usize, right: usize },
    #[error("Alphabet must contain at least one symbol")]
    EmptyAlphabet,
    #[error("Invalid bounds: min ({0}) must not exceed max ({1}) and the width must be finite")]
    InvalidBounds(f64, f64),
    #[error("Invalid mutation strength: {0} must be finite")]
    InvalidStrength(f64),
}

/// Outcome of a crossover attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Crossover<G> {
    /// Two new children built from both parents.
    Recombined(G, G),
    /// The coin-flip declined recombination; these are copies of the parents.
    PassedThrough(G, G),
}

impl<G> Crossover<G> {
    /// Whether the children carry new genetic material.
    pub fn is_recombined(&self) -> bool {
        matches!(self, Crossover::Recombined(..))
    }

    /// Unwrap into the child pair.
    pub fn into_pair(self) -> (G, G) {
        match self {
            Crossover::Recombined(a, b) | Crossover::PassedThrough(a, b) => (a, b),
        }
    }
}

/// A candidate solution the engine can evolve.
///
/// Operators are pure: they never modify the receiver, so a parent can be
/// selected into several pairs within one generation.
pub trait Gene: Clone + Send + Sync {
    /// Structural length. Must be equal across a whole population.
    fn locus_count(&self) -> usize;

    /// Return a copy where each locus is independently redrawn with
    /// probability `probability`.
    fn mutate<R: Rng + ?Sized>(&self, probability: f64, rng: &mut R) -> Self;

    /// Unconditionally combine material from `self` and `other` into two
    /// children.
    fn recombine<R: Rng + ?Sized>(&self, other: &Self, rng: &mut R)
    -> Result<(Self, Self), GeneError>;

    /// Recombine with probability `probability`, otherwise pass copies of the
    /// parents through unchanged.
    ///
    /// Fails with [`GeneError::StructuralMismatch`] whenever the operands
    /// differ in length, even if recombination would not have happened.
    fn crossover<R: Rng + ?Sized>(
        &self,
        other: &Self,
        probability: f64,
        rng: &mut R,
    ) -> Result<Crossover<Self>, GeneError> {
        ensure_same_structure(self, other)?;

        if rng.r#gen::<f64>() < probability {
            let (a, b) = self.recombine(other, rng)?;
            Ok(Crossover::Recombined(a, b))
        } else {
            Ok(Crossover::PassedThrough(self.clone(), other.clone()))
        }
    }
}

/// Fail with [`GeneError::StructuralMismatch`] unless both genes have the
/// same number of loci.
pub fn ensure_same_structure<G: Gene>(left: &G, right: &G) -> Result<(), GeneError> {
    let (l, r) = (left.locus_count(), right.locus_count());
    if l != r {
        return Err(GeneError::StructuralMismatch { left: l, right: r });
    }
    Ok(())
}

// ============================================================================
// Sequence gene
// ============================================================================

/// Fixed-length sequence of symbols drawn from a finite alphabet.
///
/// Crossover is single-point; mutation redraws loci uniformly from the
/// alphabet. The alphabet is shared between clones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceGene<T> {
    loci: Vec<T>,
    alphabet: Arc<[T]>,
}

impl<T: Clone> SequenceGene<T> {
    /// Build a gene from explicit loci.
    pub fn new(loci: Vec<T>, alphabet: impl Into<Arc<[T]>>) -> Result<Self, GeneError> {
        let alphabet = alphabet.into();
        if alphabet.is_empty() {
            return Err(GeneError::EmptyAlphabet);
        }
        Ok(Self { loci, alphabet })
    }

    /// Draw `count` genes, each made of `length` independent uniform draws
    /// from `alphabet`.
    pub fn initialize_population<R: Rng + ?Sized>(
        count: usize,
        length: usize,
        alphabet: impl Into<Arc<[T]>>,
        rng: &mut R,
    ) -> Result<Vec<Self>, GeneError> {
        let alphabet: Arc<[T]> = alphabet.into();
        if alphabet.is_empty() {
            return Err(GeneError::EmptyAlphabet);
        }

        let mut population = Vec::with_capacity(count);
        for _ in 0..count {
            let mut loci = Vec::with_capacity(length);
            for _ in 0..length {
                loci.push(draw_symbol(&alphabet, rng));
            }
            population.push(Self {
                loci,
                alphabet: Arc::clone(&alphabet),
            });
        }
        Ok(population)
    }

    /// Single-point crossover at a fixed cut.
    ///
    /// Child A is `self[..cut] + other[cut..]`, child B the complement. `cut`
    /// is clamped to the gene length.
    pub fn cross_at(&self, other: &Self, cut: usize) -> Result<(Self, Self), GeneError> {
        if self.loci.len() != other.loci.len() {
            return Err(GeneError::StructuralMismatch {
                left: self.loci.len(),
                right: other.loci.len(),
            });
        }
        let cut = cut.min(self.loci.len());

        let child_a = self.loci[..cut]
            .iter()
            .chain(&other.loci[cut..])
            .cloned()
            .collect();
        let child_b = other.loci[..cut]
            .iter()
            .chain(&self.loci[cut..])
            .cloned()
            .collect();

        Ok((
            Self {
                loci: child_a,
                alphabet: Arc::clone(&self.alphabet),
            },
            Self {
                loci: child_b,
                alphabet: Arc::clone(&self.alphabet),
            },
        ))
    }
}

impl<T> SequenceGene<T> {
    /// The symbols, in order.
    pub fn loci(&self) -> &[T] {
        &self.loci
    }

    /// The alphabet mutation draws from.
    pub fn alphabet(&self) -> &[T] {
        &self.alphabet
    }

    pub fn len(&self) -> usize {
        self.loci.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loci.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.loci.iter()
    }
}

fn draw_symbol<T: Clone, R: Rng + ?Sized>(alphabet: &[T], rng: &mut R) -> T {
    alphabet[rng.gen_range(0..alphabet.len())].clone()
}

impl<T> Gene for SequenceGene<T>
where
    T: Clone + Send + Sync,
{
    fn locus_count(&self) -> usize {
        self.loci.len()
    }

    fn mutate<R: Rng + ?Sized>(&self, probability: f64, rng: &mut R) -> Self {
        let loci = self
            .loci
            .iter()
            .map(|symbol| {
                if rng.r#gen::<f64>() < probability {
                    draw_symbol(&self.alphabet, rng)
                } else {
                    symbol.clone()
                }
            })
            .collect();

        Self {
            loci,
            alphabet: Arc::clone(&self.alphabet),
        }
    }

    fn recombine<R: Rng + ?Sized>(
        &self,
        other: &Self,
        rng: &mut R,
    ) -> Result<(Self, Self), GeneError> {
        ensure_same_structure(self, other)?;

        // No interior cut point exists below two loci.
        if self.loci.len() < 2 {
            return Ok((self.clone(), other.clone()));
        }

        let cut = rng.gen_range(1..self.loci.len());
        self.cross_at(other, cut)
    }
}

impl<T> Index<usize> for SequenceGene<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.loci[index]
    }
}

impl<'a, T> IntoIterator for &'a SequenceGene<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.loci.iter()
    }
}

impl<T: fmt::Display> fmt::Display for SequenceGene<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SequenceGene(")?;
        for (i, symbol) in self.loci.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", symbol)?;
        }
        write!(f, ")")
    }
}

// ============================================================================
// Real-valued gene
// ============================================================================

/// Fixed-length vector of bounded reals.
///
/// Crossover blends both parents with a random weight; mutation adds
/// Gaussian noise scaled by `strength` times the bound width, then clamps.
#[derive(Debug, Clone, PartialEq)]
pub struct RealGene {
    values: Vec<f64>,
    bounds: (f64, f64),
    strength: f64,
}

impl RealGene {
    /// Build a gene, clamping `values` into `bounds`.
    pub fn new(values: Vec<f64>, bounds: (f64, f64), strength: f64) -> Result<Self, GeneError> {
        check_parameters(bounds, strength)?;
        let values = values
            .into_iter()
            .map(|v| v.clamp(bounds.0, bounds.1))
            .collect();
        Ok(Self {
            values,
            bounds,
            strength: strength.abs(),
        })
    }

    /// Draw `count` genes of `length` values uniform in `bounds`.
    pub fn random_population<R: Rng + ?Sized>(
        count: usize,
        length: usize,
        bounds: (f64, f64),
        strength: f64,
        rng: &mut R,
    ) -> Result<Vec<Self>, GeneError> {
        check_parameters(bounds, strength)?;
        Ok((0..count)
            .map(|_| Self {
                values: (0..length)
                    .map(|_| rng.gen_range(bounds.0..=bounds.1))
                    .collect(),
                bounds,
                strength: strength.abs(),
            })
            .collect())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    /// Gaussian mutation: add noise to a value.
    fn gaussian_mutate<R: Rng + ?Sized>(&self, value: f64, rng: &mut R) -> f64 {
        let noise: f64 = rng.sample(StandardNormal);
        let mutated = value + noise * self.strength * (self.bounds.1 - self.bounds.0);
        mutated.clamp(self.bounds.0, self.bounds.1)
    }
}

/// Mutation scales noise by the bound width, so the width itself must be
/// finite as well as both ends.
fn check_parameters(bounds: (f64, f64), strength: f64) -> Result<(), GeneError> {
    let (min, max) = bounds;
    if !min.is_finite() || !max.is_finite() || min > max || !(max - min).is_finite() {
        return Err(GeneError::InvalidBounds(min, max));
    }
    if !strength.is_finite() {
        return Err(GeneError::InvalidStrength(strength));
    }
    Ok(())
}

/// Linear blend between two values.
fn blend(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

impl Gene for RealGene {
    fn locus_count(&self) -> usize {
        self.values.len()
    }

    fn mutate<R: Rng + ?Sized>(&self, probability: f64, rng: &mut R) -> Self {
        let values = self
            .values
            .iter()
            .map(|&v| {
                if rng.r#gen::<f64>() < probability {
                    self.gaussian_mutate(v, rng)
                } else {
                    v
                }
            })
            .collect();

        Self {
            values,
            bounds: self.bounds,
            strength: self.strength,
        }
    }

    fn recombine<R: Rng + ?Sized>(
        &self,
        other: &Self,
        rng: &mut R,
    ) -> Result<(Self, Self), GeneError> {
        ensure_same_structure(self, other)?;

        let t = rng.r#gen::<f64>();
        let (a, b): (Vec<f64>, Vec<f64>) = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(&x, &y)| (blend(x, y, t), blend(y, x, t)))
            .unzip();

        Ok((
            Self {
                values: a,
                bounds: self.bounds,
                strength: self.strength,
            },
            Self {
                values: b,
                bounds: self.bounds,
                strength: self.strength,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evolution::EvolutionRng;

    fn seq(s: &str) -> SequenceGene<char> {
        SequenceGene::new(s.chars().collect(), vec!['A', 'B']).unwrap()
    }

    fn text(gene: &SequenceGene<char>) -> String {
        gene.iter().collect()
    }

    #[test]
    fn test_cross_at_fixed_cut() {
        let a = seq("AAAAA");
        let b = seq("BBBBB");

        let (x, y) = a.cross_at(&b, 2).unwrap();
        assert_eq!(text(&x), "AABBB");
        assert_eq!(text(&y), "BBAAA");
    }

    #[test]
    fn test_cross_at_with_thread_local_symbols() {
        use std::rc::Rc;

        let x: Rc<str> = Rc::from("X");
        let y: Rc<str> = Rc::from("Y");
        let alphabet = vec![Rc::clone(&x), Rc::clone(&y)];
        let a = SequenceGene::new(vec![Rc::clone(&x); 3], alphabet.clone()).unwrap();
        let b = SequenceGene::new(vec![Rc::clone(&y); 3], alphabet.clone()).unwrap();

        let (left, right) = a.cross_at(&b, 1).unwrap();
        assert_eq!(left.loci(), &[Rc::clone(&x), Rc::clone(&y), Rc::clone(&y)]);
        assert_eq!(right.loci(), &[Rc::clone(&y), Rc::clone(&x), Rc::clone(&x)]);

        let short = SequenceGene::new(vec![Rc::clone(&x); 2], alphabet).unwrap();
        assert_eq!(
            a.cross_at(&short, 1).unwrap_err(),
            GeneError::StructuralMismatch { left: 3, right: 2 }
        );
    }

    #[test]
    fn test_single_point_structure() {
        let mut rng = EvolutionRng::new(42);
        let a = seq("AAAAA");
        let b = seq("BBBBB");

        for _ in 0..200 {
            let (x, y) = a.recombine(&b, &mut rng).unwrap();
            let (x, y) = (text(&x), text(&y));
            let cut = x.find('B').expect("cut must leave a suffix of B");
            assert!((1..=4).contains(&cut));
            assert_eq!(x, format!("{}{}", "A".repeat(cut), "B".repeat(5 - cut)));
            assert_eq!(y, format!("{}{}", "B".repeat(cut), "A".repeat(5 - cut)));
        }
    }

    #[test]
    fn test_crossover_does_not_touch_parents() {
        let mut rng = EvolutionRng::new(1);
        let a = seq("AABAB");
        let b = seq("BBABA");
        let (a0, b0) = (a.clone(), b.clone());

        let result = a.crossover(&b, 1.0, &mut rng).unwrap();
        assert!(result.is_recombined());
        assert_eq!(a, a0);
        assert_eq!(b, b0);
    }

    #[test]
    fn test_crossover_zero_passes_through() {
        let mut rng = EvolutionRng::new(1);
        let a = seq("AAAAA");
        let b = seq("BBBBB");

        for _ in 0..50 {
            let result = a.crossover(&b, 0.0, &mut rng).unwrap();
            assert!(!result.is_recombined());
            assert_eq!(result.into_pair(), (a.clone(), b.clone()));
        }
    }

    #[test]
    fn test_crossover_length_mismatch() {
        let mut rng = EvolutionRng::new(1);
        let a = seq("AAAA");
        let b = seq("BBBBB");

        // Rejected even when recombination would be skipped.
        for p in [0.0, 1.0] {
            let err = a.crossover(&b, p, &mut rng).unwrap_err();
            assert_eq!(err, GeneError::StructuralMismatch { left: 4, right: 5 });
        }
        assert!(a.cross_at(&b, 2).is_err());
    }

    #[test]
    fn test_single_locus_recombine_is_identity() {
        let mut rng = EvolutionRng::new(5);
        let a = seq("A");
        let b = seq("B");
        assert_eq!(a.recombine(&b, &mut rng).unwrap(), (a.clone(), b.clone()));
    }

    #[test]
    fn test_mutate_probability_zero_is_identity() {
        let mut rng = EvolutionRng::new(9);
        let gene = seq("ABABABAB");
        assert_eq!(gene.mutate(0.0, &mut rng), gene);
    }

    #[test]
    fn test_mutate_stays_in_alphabet() {
        let mut rng = EvolutionRng::new(9);
        let alphabet = vec!["F", "Gm", "Am", "Bb", "C", "Dm", "Edim"];
        let gene = SequenceGene::new(vec!["F"; 32], alphabet.clone()).unwrap();

        let mutated = gene.mutate(1.0, &mut rng);
        assert_eq!(mutated.len(), gene.len());
        assert!(mutated.iter().all(|s| alphabet.contains(s)));
        // 32 uniform redraws over 7 symbols will not all land on "F".
        assert_ne!(mutated, gene);
        // The receiver is untouched.
        assert!(gene.iter().all(|&s| s == "F"));
    }

    #[test]
    fn test_initialize_population() {
        let mut rng = EvolutionRng::new(11);
        let population =
            SequenceGene::initialize_population(12, 6, vec!["X", "Y"], &mut rng).unwrap();

        assert_eq!(population.len(), 12);
        for gene in &population {
            assert_eq!(gene.locus_count(), 6);
            assert!(gene.iter().all(|s| *s == "X" || *s == "Y"));
        }
    }

    #[test]
    fn test_empty_alphabet_rejected() {
        let mut rng = EvolutionRng::new(11);
        let empty: Vec<&str> = Vec::new();
        assert_eq!(
            SequenceGene::initialize_population(4, 3, empty.clone(), &mut rng).unwrap_err(),
            GeneError::EmptyAlphabet
        );
        assert_eq!(
            SequenceGene::new(vec!["X"], empty).unwrap_err(),
            GeneError::EmptyAlphabet
        );
    }

    #[test]
    fn test_display() {
        let gene = SequenceGene::new(vec!["F", "C", "C", "F"], vec!["F", "C"]).unwrap();
        assert_eq!(gene.to_string(), "SequenceGene(F C C F)");
        assert_eq!(gene[1], "C");
    }

    #[test]
    fn test_real_gene_mutation_in_bounds() {
        let mut rng = EvolutionRng::new(42);
        let population = RealGene::random_population(4, 8, (-1.0, 1.0), 0.5, &mut rng).unwrap();

        for gene in &population {
            let mutated = gene.mutate(1.0, &mut rng);
            assert_eq!(mutated.locus_count(), 8);
            assert!(mutated.values().iter().all(|v| (-1.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_real_gene_blend_crossover() {
        let mut rng = EvolutionRng::new(42);
        let a = RealGene::new(vec![0.0; 4], (0.0, 1.0), 0.1).unwrap();
        let b = RealGene::new(vec![1.0; 4], (0.0, 1.0), 0.1).unwrap();

        let (x, y) = a.recombine(&b, &mut rng).unwrap();
        for (u, v) in x.values().iter().zip(y.values()) {
            assert!((u + v - 1.0).abs() < 1e-12);
            assert!((0.0..=1.0).contains(u));
        }
    }

    #[test]
    fn test_real_gene_invalid_bounds() {
        assert_eq!(
            RealGene::new(vec![0.0], (1.0, 0.0), 0.1).unwrap_err(),
            GeneError::InvalidBounds(1.0, 0.0)
        );
        assert!(RealGene::new(vec![0.0], (f64::NAN, 0.0), 0.1).is_err());
    }

    #[test]
    fn test_real_gene_rejects_overflowing_width() {
        let bounds = (-f64::MAX, f64::MAX);
        assert_eq!(
            RealGene::new(vec![0.0], bounds, 0.1).unwrap_err(),
            GeneError::InvalidBounds(-f64::MAX, f64::MAX)
        );

        let mut rng = EvolutionRng::new(0);
        assert_eq!(
            RealGene::random_population(2, 3, bounds, 0.1, &mut rng).unwrap_err(),
            GeneError::InvalidBounds(-f64::MAX, f64::MAX)
        );
    }

    #[test]
    fn test_real_gene_rejects_non_finite_strength() {
        assert!(matches!(
            RealGene::new(vec![0.5; 4], (0.0, 1.0), f64::NAN),
            Err(GeneError::InvalidStrength(s)) if s.is_nan()
        ));
        assert_eq!(
            RealGene::new(vec![0.5; 4], (0.0, 1.0), f64::INFINITY).unwrap_err(),
            GeneError::InvalidStrength(f64::INFINITY)
        );

        let mut rng = EvolutionRng::new(0);
        assert!(matches!(
            RealGene::random_population(2, 3, (0.0, 1.0), f64::NAN, &mut rng),
            Err(GeneError::InvalidStrength(_))
        ));

        let gene = RealGene::new(vec![0.5; 4], (0.0, 1.0), 2.0).unwrap();
        let mutated = gene.mutate(1.0, &mut rng);
        assert!(mutated.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
