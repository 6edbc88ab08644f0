//! Cosine annealing learning rate schedule
//!
//! Decreases the learning rate following a cosine curve from lr_max to
//! lr_min over a fixed number of update steps:
//!
//! lr_t = lr_min + 0.5 * (lr_max - lr_min) * (1 + cos(pi * t / T))
//!
//! Past step T the schedule holds at lr_min. The step counter is part of
//! the serialized state so a reloaded checkpoint resumes at the same
//! position on the curve.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Cosine decay from `lr_max` to `lr_min` over `t_max` steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CosineSchedule {
    lr_max: f32,
    lr_min: f32,
    t_max: usize,
    current_step: usize,
}

impl CosineSchedule {
    /// Create a schedule spanning `t_max` update steps.
    pub fn new(lr_max: f32, t_max: usize, lr_min: f32) -> Self {
        Self {
            lr_max,
            lr_min,
            t_max,
            current_step: 0,
        }
    }

    /// Learning rate at the current step.
    pub fn get_lr(&self) -> f32 {
        if self.current_step >= self.t_max {
            return self.lr_min;
        }

        let progress = self.current_step as f32 / self.t_max as f32;
        let cosine_decay = 0.5 * (1.0 + (PI * progress).cos());
        self.lr_min + (self.lr_max - self.lr_min) * cosine_decay
    }

    /// Advance one update step.
    pub fn step(&mut self) {
        self.current_step += 1;
    }

    /// Steps taken so far.
    pub fn current_step(&self) -> usize {
        self.current_step
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_at_lr_max() {
        let sched = CosineSchedule::new(0.1, 100, 0.001);
        assert_relative_eq!(sched.get_lr(), 0.1, epsilon = 1e-7);
    }

    #[test]
    fn test_midpoint_is_mean_of_extremes() {
        let mut sched = CosineSchedule::new(0.1, 100, 0.0);
        for _ in 0..50 {
            sched.step();
        }
        assert_relative_eq!(sched.get_lr(), 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_holds_at_lr_min_past_horizon() {
        let mut sched = CosineSchedule::new(0.1, 10, 0.001);
        for _ in 0..25 {
            sched.step();
        }
        assert_relative_eq!(sched.get_lr(), 0.001, epsilon = 1e-9);
    }

    #[test]
    fn test_monotone_non_increasing() {
        let mut sched = CosineSchedule::new(0.1, 64, 1e-6);
        let mut prev = sched.get_lr();
        for _ in 0..80 {
            sched.step();
            let lr = sched.get_lr();
            assert!(lr <= prev + 1e-9, "lr rose from {prev} to {lr}");
            prev = lr;
        }
    }

    #[test]
    fn test_zero_horizon_degenerates_to_lr_min() {
        let sched = CosineSchedule::new(0.1, 0, 0.001);
        assert_relative_eq!(sched.get_lr(), 0.001, epsilon = 1e-9);
    }

    #[test]
    fn test_serde_round_trip_resumes_position() {
        let mut sched = CosineSchedule::new(0.1, 100, 0.001);
        for _ in 0..37 {
            sched.step();
        }
        let json = serde_json::to_string(&sched).unwrap();
        let restored: CosineSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, sched);
        assert_eq!(restored.current_step(), 37);
        assert_relative_eq!(restored.get_lr(), sched.get_lr(), epsilon = 1e-9);
    }
}
