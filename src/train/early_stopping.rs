//! Early stopping on a monitored metric
//!
//! The training loop feeds the validation loss in once per epoch;
//! improvement means strictly better than the best value seen so far by
//! more than `min_delta`. Once `patience` consecutive epochs pass without
//! improvement the stopper latches and the loop ends at that epoch
//! boundary.

/// Halts training when the monitored metric plateaus.
///
/// # Example
///
/// ```
/// use nublar::train::EarlyStopping;
///
/// // Stop after 2 epochs without improvement
/// let mut stopper = EarlyStopping::new(2, 1e-9);
/// assert!(stopper.update(1.0)); // first value always improves on +inf
/// assert!(stopper.update(0.9));
/// assert!(!stopper.update(0.91));
/// assert!(!stopper.update(0.92));
/// assert!(stopper.should_stop());
/// ```
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Epochs to wait for improvement before stopping
    patience: usize,
    /// Minimum decrease that counts as improvement
    min_delta: f32,
    /// Best metric seen so far
    best_metric: f32,
    /// Consecutive epochs without improvement
    wait: usize,
    /// Latched once `wait` reaches `patience`
    stopped: bool,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f32) -> Self {
        Self {
            patience,
            min_delta,
            best_metric: f32::INFINITY,
            wait: 0,
            stopped: false,
        }
    }

    /// Record one epoch's metric. Returns `true` when it improved on the
    /// best value, which resets the wait counter.
    pub fn update(&mut self, metric: f32) -> bool {
        if metric < self.best_metric - self.min_delta {
            self.best_metric = metric;
            self.wait = 0;
            true
        } else {
            self.wait += 1;
            if self.wait >= self.patience {
                self.stopped = true;
            }
            false
        }
    }

    /// Whether the stop condition has fired. Latches: later improvements
    /// do not clear it.
    pub fn should_stop(&self) -> bool {
        self.stopped
    }

    /// Best metric recorded so far (`+inf` before the first update).
    pub fn best_metric(&self) -> f32 {
        self.best_metric
    }

    /// Consecutive non-improving epochs.
    pub fn wait(&self) -> usize {
        self.wait
    }

    /// Clear all state for a fresh run.
    pub fn reset(&mut self) {
        self.best_metric = f32::INFINITY;
        self.wait = 0;
        self.stopped = false;
    }
}
