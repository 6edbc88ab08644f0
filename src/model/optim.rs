//! Optimizer state
//!
//! Both supported optimizers keep their buffers in an [`OptimState`] enum
//! so a model can carry either without generics and checkpoints can
//! round-trip the buffers verbatim.
//!
//! SGD with momentum: v_t = μ * v_{t-1} - lr * g;  θ_t = θ_{t-1} + v_t
//! Adam:              θ_t = θ_{t-1} - lr_t * m_t / (√v_t + ε)
//! with the bias correction folded into the step size,
//! lr_t = lr * √(1 - β2^t) / (1 - β1^t).

use ndarray::Array1;
use serde::{Deserialize, Serialize};

const ADAM_BETA1: f32 = 0.9;
const ADAM_BETA2: f32 = 0.999;
const ADAM_EPSILON: f32 = 1e-8;

/// Optimizer family selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    /// Stochastic gradient descent with classical momentum
    #[default]
    Sgd,
    /// Adam with bias-corrected first and second moments
    Adam,
}

impl OptimizerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OptimizerKind::Sgd => "sgd",
            OptimizerKind::Adam => "adam",
        }
    }
}

/// Optimizer buffers for one weight vector plus bias.
#[derive(Debug, Clone, PartialEq)]
pub enum OptimState {
    Sgd {
        vel_w: Array1<f32>,
        vel_b: f32,
    },
    Adam {
        m_w: Array1<f32>,
        v_w: Array1<f32>,
        m_b: f32,
        v_b: f32,
        t: u64,
    },
}

impl OptimState {
    /// Zero-initialized buffers sized for `features` weights.
    pub fn new(kind: OptimizerKind, features: usize) -> Self {
        match kind {
            OptimizerKind::Sgd => OptimState::Sgd {
                vel_w: Array1::zeros(features),
                vel_b: 0.0,
            },
            OptimizerKind::Adam => OptimState::Adam {
                m_w: Array1::zeros(features),
                v_w: Array1::zeros(features),
                m_b: 0.0,
                v_b: 0.0,
                t: 0,
            },
        }
    }

    pub fn kind(&self) -> OptimizerKind {
        match self {
            OptimState::Sgd { .. } => OptimizerKind::Sgd,
            OptimState::Adam { .. } => OptimizerKind::Adam,
        }
    }

    /// Apply one update step in place.
    ///
    /// `momentum` only affects the SGD variant; Adam's betas are fixed at
    /// the standard 0.9 / 0.999.
    pub fn apply(
        &mut self,
        weights: &mut Array1<f32>,
        bias: &mut f32,
        grad_w: &Array1<f32>,
        grad_b: f32,
        lr: f32,
        momentum: f32,
    ) {
        match self {
            OptimState::Sgd { vel_w, vel_b } => {
                // v_t = μ * v_{t-1} - lr * g (reduces to plain SGD at μ = 0)
                *vel_w = &*vel_w * momentum - grad_w * lr;
                *vel_b = momentum * *vel_b - lr * grad_b;
                *weights += &*vel_w;
                *bias += *vel_b;
            }
            OptimState::Adam { m_w, v_w, m_b, v_b, t } => {
                *t += 1;
                let lr_t = lr
                    * ((1.0 - ADAM_BETA2.powi(*t as i32)).sqrt()
                        / (1.0 - ADAM_BETA1.powi(*t as i32)));

                *m_w = &*m_w * ADAM_BETA1 + grad_w * (1.0 - ADAM_BETA1);
                *v_w = &*v_w * ADAM_BETA2 + &(grad_w * grad_w) * (1.0 - ADAM_BETA2);
                *m_b = ADAM_BETA1 * *m_b + (1.0 - ADAM_BETA1) * grad_b;
                *v_b = ADAM_BETA2 * *v_b + (1.0 - ADAM_BETA2) * grad_b * grad_b;

                let update = &*m_w / &(v_w.mapv(f32::sqrt) + ADAM_EPSILON) * lr_t;
                *weights -= &update;
                *bias -= lr_t * *m_b / (v_b.sqrt() + ADAM_EPSILON);
            }
        }
    }
}
