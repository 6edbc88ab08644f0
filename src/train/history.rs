//! Per-epoch metric history

/// Append-only record of epoch aggregates.
///
/// All four lists grow in lockstep, one entry per completed epoch, so an
/// index addresses the same epoch in each of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingHistory {
    pub train_loss: Vec<f32>,
    pub train_accuracy: Vec<f32>,
    pub val_loss: Vec<f32>,
    pub val_accuracy: Vec<f32>,
}

impl TrainingHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one completed epoch's aggregates.
    pub fn push_epoch(
        &mut self,
        train_loss: f32,
        train_accuracy: f32,
        val_loss: f32,
        val_accuracy: f32,
    ) {
        self.train_loss.push(train_loss);
        self.train_accuracy.push(train_accuracy);
        self.val_loss.push(val_loss);
        self.val_accuracy.push(val_accuracy);
    }

    /// Number of completed epochs.
    pub fn len(&self) -> usize {
        self.train_loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train_loss.is_empty()
    }
}

/// Arithmetic mean. NaN on an empty slice, which callers reject through
/// their finiteness checks.
pub(crate) fn mean(values: &[f32]) -> f32 {
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_is_exact_for_small_integers() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(mean(&[0.25]), 0.25);
    }

    #[test]
    fn test_mean_empty_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_push_epoch_keeps_lists_aligned() {
        let mut history = TrainingHistory::new();
        assert!(history.is_empty());

        history.push_epoch(0.7, 0.5, 0.8, 0.4);
        history.push_epoch(0.6, 0.6, 0.7, 0.5);

        assert_eq!(history.len(), 2);
        assert_eq!(history.train_loss, vec![0.7, 0.6]);
        assert_eq!(history.train_accuracy, vec![0.5, 0.6]);
        assert_eq!(history.val_loss, vec![0.8, 0.7]);
        assert_eq!(history.val_accuracy, vec![0.4, 0.5]);
    }
}
