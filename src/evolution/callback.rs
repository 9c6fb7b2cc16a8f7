//! Lifecycle observers for the evolutionary loop.
//!
//! Callbacks see the run at fixed points and may ask it to stop. A stop
//! request takes effect at the next generation boundary; the loop never
//! halts mid-generation.

use log::info;

use super::population::Population;

/// A callback's verdict after a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Control {
    #[default]
    Continue,
    Stop,
}

impl Control {
    pub fn is_stop(self) -> bool {
        self == Control::Stop
    }
}

/// Observer hooked into an evolution run.
///
/// Every method has a no-op default. Callbacks never see each other's state;
/// the run stops as soon as any of them returns [`Control::Stop`].
pub trait Callback<G> {
    /// Called once before the first generation. Reset per-run state here.
    fn on_begin(&mut self) {}

    /// Called with each newly built generation, before `on_epoch_end`.
    fn on_population(&mut self, _population: &Population<G>, _epoch: usize) {}

    /// Called after each generation with the best-ever pair.
    fn on_epoch_end(&mut self, _best_gene: &G, _best_score: f64, _epoch: usize) -> Control {
        Control::Continue
    }

    /// Called once when the run finishes, whether or not it stopped early.
    fn on_end(&mut self) {}
}

/// Stop once the best score has not improved for `patience` consecutive
/// generations.
///
/// The first observed generation sets the baseline and counts as
/// non-improving, so a run whose best score never moves stops after exactly
/// `patience` generations.
#[derive(Debug, Clone, PartialEq)]
pub struct EarlyStopping {
    patience: usize,
    best_score_seen: Option<f64>,
    epochs_without_improvement: usize,
}

impl EarlyStopping {
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            best_score_seen: None,
            epochs_without_improvement: 0,
        }
    }

    pub fn patience(&self) -> usize {
        self.patience
    }

    pub fn best_score_seen(&self) -> Option<f64> {
        self.best_score_seen
    }

    pub fn epochs_without_improvement(&self) -> usize {
        self.epochs_without_improvement
    }
}

impl<G> Callback<G> for EarlyStopping {
    fn on_begin(&mut self) {
        self.best_score_seen = None;
        self.epochs_without_improvement = 0;
    }

    fn on_epoch_end(&mut self, _best_gene: &G, best_score: f64, epoch: usize) -> Control {
        let baseline = *self.best_score_seen.get_or_insert(best_score);

        if best_score > baseline {
            self.epochs_without_improvement = 0;
            self.best_score_seen = Some(best_score);
            return Control::Continue;
        }

        self.epochs_without_improvement += 1;
        if self.epochs_without_improvement >= self.patience {
            info!(
                "Best score has not improved for {} epochs. Stopping at epoch {}",
                self.patience, epoch
            );
            return Control::Stop;
        }
        Control::Continue
    }
}

/// Stop as soon as the best score reaches `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetScore {
    target: f64,
}

impl TargetScore {
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl<G> Callback<G> for TargetScore {
    fn on_epoch_end(&mut self, _best_gene: &G, best_score: f64, epoch: usize) -> Control {
        if best_score >= self.target {
            info!(
                "Target score {} reached ({}) at epoch {}",
                self.target, best_score, epoch
            );
            Control::Stop
        } else {
            Control::Continue
        }
    }
}

/// Log best and mean scores every `interval` generations.
#[derive(Debug, Clone, PartialEq)]
pub struct LogProgress {
    interval: usize,
    last_mean: f64,
    epochs_seen: usize,
}

impl LogProgress {
    /// `interval = 0` logs only at the start and end of the run.
    pub fn new(interval: usize) -> Self {
        Self {
            interval,
            last_mean: 0.0,
            epochs_seen: 0,
        }
    }

    pub fn epochs_seen(&self) -> usize {
        self.epochs_seen
    }
}

impl<G> Callback<G> for LogProgress {
    fn on_begin(&mut self) {
        self.epochs_seen = 0;
        info!("Evolution started");
    }

    fn on_population(&mut self, population: &Population<G>, _epoch: usize) {
        self.last_mean = population.mean_score();
    }

    fn on_epoch_end(&mut self, _best_gene: &G, best_score: f64, epoch: usize) -> Control {
        self.epochs_seen += 1;
        if self.interval > 0 && (epoch + 1) % self.interval == 0 {
            info!(
                "Epoch {}: best score = {:.4}, mean score = {:.4}",
                epoch + 1,
                best_score,
                self.last_mean
            );
        }
        Control::Continue
    }

    fn on_end(&mut self) {
        info!("Evolution finished after {} epochs", self.epochs_seen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch_end(cb: &mut dyn Callback<()>, score: f64, epoch: usize) -> Control {
        cb.on_epoch_end(&(), score, epoch)
    }

    #[test]
    fn test_early_stopping_constant_score() {
        let mut cb = EarlyStopping::new(2);
        Callback::<()>::on_begin(&mut cb);

        assert_eq!(epoch_end(&mut cb, 1.0, 0), Control::Continue);
        assert_eq!(epoch_end(&mut cb, 1.0, 1), Control::Stop);
    }

    #[test]
    fn test_early_stopping_improvement_resets() {
        let mut cb = EarlyStopping::new(3);
        Callback::<()>::on_begin(&mut cb);

        assert_eq!(epoch_end(&mut cb, 1.0, 0), Control::Continue);
        assert_eq!(epoch_end(&mut cb, 1.0, 1), Control::Continue);
        assert_eq!(cb.epochs_without_improvement(), 2);

        assert_eq!(epoch_end(&mut cb, 2.0, 2), Control::Continue);
        assert_eq!(cb.epochs_without_improvement(), 0);
        assert_eq!(cb.best_score_seen(), Some(2.0));

        assert_eq!(epoch_end(&mut cb, 2.0, 3), Control::Continue);
        assert_eq!(epoch_end(&mut cb, 1.5, 4), Control::Continue);
        assert_eq!(epoch_end(&mut cb, 2.0, 5), Control::Stop);
    }

    #[test]
    fn test_early_stopping_on_begin_resets() {
        let mut cb = EarlyStopping::new(5);
        Callback::<()>::on_begin(&mut cb);
        epoch_end(&mut cb, 4.0, 0);
        epoch_end(&mut cb, 4.0, 1);

        Callback::<()>::on_begin(&mut cb);
        assert_eq!(cb.best_score_seen(), None);
        assert_eq!(cb.epochs_without_improvement(), 0);
    }

    #[test]
    fn test_target_score() {
        let mut cb = TargetScore::new(1.0);
        assert_eq!(epoch_end(&mut cb, 0.99, 0), Control::Continue);
        assert!(epoch_end(&mut cb, 1.0, 1).is_stop());
    }

    #[test]
    fn test_log_progress_never_stops() {
        let mut cb = LogProgress::new(2);
        Callback::<()>::on_begin(&mut cb);
        for epoch in 0..5 {
            assert_eq!(epoch_end(&mut cb, epoch as f64, epoch), Control::Continue);
        }
        Callback::<()>::on_end(&mut cb);
        assert_eq!(cb.epochs_seen(), 5);
    }
}
